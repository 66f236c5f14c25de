//! Sensor entity model
//!
//! A single OPC UA node sampled on a server. Names are unique per server.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::repositories::RecordDescriptor;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sensors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub opc_server_id: Uuid,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// OPC UA node identifier, e.g. `ns=2;s=Boiler.Temp`
    pub node_id: String,

    /// Engineering units of the sampled value
    pub units: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::opc_server::Entity",
        from = "Column::OpcServerId",
        to = "super::opc_server::Column::Id",
        on_delete = "Cascade"
    )]
    OpcServer,
    #[sea_orm(has_many = "super::reading::Entity")]
    Reading,
    #[sea_orm(has_many = "super::alert::Entity")]
    Alert,
}

impl Related<super::opc_server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OpcServer.def()
    }
}

impl Related<super::reading::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reading.def()
    }
}

impl Related<super::alert::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alert.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn descriptor() -> RecordDescriptor<Entity> {
    RecordDescriptor::new("Sensor")
        .unique_key(&[Column::OpcServerId, Column::Name])
        .default_value(Column::Id, super::new_id)
        .default_value(Column::CreatedAt, super::now)
        .default_value(Column::IsDeleted, super::not_deleted)
}
