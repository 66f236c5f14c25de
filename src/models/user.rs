//! User entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Value as SqlValue;

use crate::repositories::RecordDescriptor;

/// Account that can belong to several organizations
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,

    pub hashed_password: String,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_organization::Entity")]
    UserOrganization,
}

impl Related<super::user_organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserOrganization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn active() -> SqlValue {
    true.into()
}

pub fn descriptor() -> RecordDescriptor<Entity> {
    RecordDescriptor::new("User")
        .unique_key(&[Column::Email])
        .default_value(Column::Id, super::new_id)
        .default_value(Column::IsActive, active)
        .default_value(Column::CreatedAt, super::now)
        .default_value(Column::UpdatedAt, super::now)
}
