//! Alert entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::repositories::RecordDescriptor;

/// Raised when a sensor value crosses a threshold
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub sensor_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// The reading value that triggered the alert
    pub triggered_value: f64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sensor::Entity",
        from = "Column::SensorId",
        to = "super::sensor::Column::Id",
        on_delete = "Cascade"
    )]
    Sensor,
}

impl Related<super::sensor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sensor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn descriptor() -> RecordDescriptor<Entity> {
    RecordDescriptor::new("Alert")
        .default_value(Column::Id, super::new_id)
        .default_value(Column::CreatedAt, super::now)
}
