//! OPC server entity model
//!
//! An OPC UA endpoint registered by an organization. Sensors hang off a
//! server and are removed with it.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Value as SqlValue;

use super::enums::{AuthMethod, SecurityPolicy};
use crate::repositories::RecordDescriptor;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "opc_servers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning organization
    pub organization_id: Uuid,

    /// Server name; unique globally and within the organization
    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Endpoint URL, e.g. `opc.tcp://plant-a:4840`
    pub url: String,

    pub security_policy: SecurityPolicy,

    pub authentication_method: AuthMethod,

    /// Only meaningful for username authentication
    pub username: Option<String>,

    pub encrypted_password: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_delete = "Cascade"
    )]
    Organization,
    #[sea_orm(has_many = "super::sensor::Entity")]
    Sensor,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::sensor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sensor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn no_security() -> SqlValue {
    SecurityPolicy::NoSecurity.into()
}

fn anonymous() -> SqlValue {
    AuthMethod::Anonymous.into()
}

pub fn descriptor() -> RecordDescriptor<Entity> {
    RecordDescriptor::new("OpcServer")
        .unique_key(&[Column::Name])
        .unique_key(&[Column::OrganizationId, Column::Name])
        .default_value(Column::Id, super::new_id)
        .default_value(Column::SecurityPolicy, no_security)
        .default_value(Column::AuthenticationMethod, anonymous)
        .default_value(Column::CreatedAt, super::now)
        .default_value(Column::IsDeleted, super::not_deleted)
}
