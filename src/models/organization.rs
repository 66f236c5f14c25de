//! Organization entity model
//!
//! Organizations own OPC servers and group users through the
//! `user_organization_association` table.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::repositories::RecordDescriptor;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Globally unique display name
    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    /// Soft-delete marker
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::opc_server::Entity")]
    OpcServer,
    #[sea_orm(has_many = "super::user_organization::Entity")]
    UserOrganization,
}

impl Related<super::opc_server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OpcServer.def()
    }
}

impl Related<super::user_organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserOrganization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn descriptor() -> RecordDescriptor<Entity> {
    RecordDescriptor::new("Organization")
        .unique_key(&[Column::Name])
        .default_value(Column::Id, super::new_id)
        .default_value(Column::CreatedAt, super::now)
        .default_value(Column::IsDeleted, super::not_deleted)
}
