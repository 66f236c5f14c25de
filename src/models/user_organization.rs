//! Membership of a user in an organization

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Value as SqlValue;

use super::enums::UserRole;
use crate::repositories::RecordDescriptor;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_organization_association")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    pub organization_id: Uuid,

    pub role: UserRole,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id",
        on_delete = "Cascade"
    )]
    Organization,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

fn member() -> SqlValue {
    UserRole::Member.into()
}

/// Memberships are unique per (user, organization) pair.
pub fn descriptor() -> RecordDescriptor<Entity> {
    RecordDescriptor::new("UserOrganization")
        .unique_key(&[Column::UserId, Column::OrganizationId])
        .default_value(Column::Id, super::new_id)
        .default_value(Column::Role, member)
}
