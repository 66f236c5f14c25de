//! Initial schema: organizations, users and their memberships, OPC servers,
//! sensors, readings and alerts.
//!
//! Child rows are removed with their parent through `ON DELETE CASCADE`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organizations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Organizations::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Organizations::Description).text().null())
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Organizations::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Users::HashedPassword).string_len(255).not_null())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OpcServers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OpcServers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(OpcServers::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(OpcServers::Name).string_len(255).not_null())
                    .col(ColumnDef::new(OpcServers::Description).text().null())
                    .col(ColumnDef::new(OpcServers::Url).string_len(512).not_null())
                    .col(
                        ColumnDef::new(OpcServers::SecurityPolicy)
                            .string_len(32)
                            .not_null()
                            .default("None"),
                    )
                    .col(
                        ColumnDef::new(OpcServers::AuthenticationMethod)
                            .string_len(16)
                            .not_null()
                            .default("anonymous"),
                    )
                    .col(ColumnDef::new(OpcServers::Username).string_len(255).null())
                    .col(ColumnDef::new(OpcServers::EncryptedPassword).string_len(255).null())
                    .col(
                        ColumnDef::new(OpcServers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OpcServers::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opc_servers_organization_id")
                            .from(OpcServers::Table, OpcServers::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserOrganizationAssociation::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserOrganizationAssociation::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserOrganizationAssociation::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserOrganizationAssociation::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserOrganizationAssociation::Role)
                            .string_len(16)
                            .not_null()
                            .default("member"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_organization_association_user_id")
                            .from(
                                UserOrganizationAssociation::Table,
                                UserOrganizationAssociation::UserId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_organization_association_organization_id")
                            .from(
                                UserOrganizationAssociation::Table,
                                UserOrganizationAssociation::OrganizationId,
                            )
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sensors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sensors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sensors::OpcServerId).uuid().not_null())
                    .col(ColumnDef::new(Sensors::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Sensors::Description).text().null())
                    .col(ColumnDef::new(Sensors::NodeId).string_len(255).not_null())
                    .col(ColumnDef::new(Sensors::Units).string_len(50).null())
                    .col(
                        ColumnDef::new(Sensors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Sensors::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensors_opc_server_id")
                            .from(Sensors::Table, Sensors::OpcServerId)
                            .to(OpcServers::Table, OpcServers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Readings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Readings::Time)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Readings::SensorId).uuid().not_null())
                    .col(ColumnDef::new(Readings::Value).double().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_readings")
                            .col(Readings::Time)
                            .col(Readings::SensorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_readings_sensor_id")
                            .from(Readings::Table, Readings::SensorId)
                            .to(Sensors::Table, Sensors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Alerts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Alerts::SensorId).uuid().not_null())
                    .col(ColumnDef::new(Alerts::Message).text().not_null())
                    .col(ColumnDef::new(Alerts::TriggeredValue).double().not_null())
                    .col(
                        ColumnDef::new(Alerts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_sensor_id")
                            .from(Alerts::Table, Alerts::SensorId)
                            .to(Sensors::Table, Sensors::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Uniqueness constraints double as upsert conflict targets.
        for index in [
            Index::create()
                .name("uq_organizations_name")
                .table(Organizations::Table)
                .col(Organizations::Name)
                .unique()
                .to_owned(),
            Index::create()
                .name("uq_users_email")
                .table(Users::Table)
                .col(Users::Email)
                .unique()
                .to_owned(),
            Index::create()
                .name("uq_opc_servers_name")
                .table(OpcServers::Table)
                .col(OpcServers::Name)
                .unique()
                .to_owned(),
            Index::create()
                .name("uq_opc_server_organization_name")
                .table(OpcServers::Table)
                .col(OpcServers::OrganizationId)
                .col(OpcServers::Name)
                .unique()
                .to_owned(),
            Index::create()
                .name("uq_user_organization_association")
                .table(UserOrganizationAssociation::Table)
                .col(UserOrganizationAssociation::UserId)
                .col(UserOrganizationAssociation::OrganizationId)
                .unique()
                .to_owned(),
            Index::create()
                .name("uq_sensor_opc_server_name")
                .table(Sensors::Table)
                .col(Sensors::OpcServerId)
                .col(Sensors::Name)
                .unique()
                .to_owned(),
        ] {
            manager.create_index(index).await?;
        }

        for index in [
            Index::create()
                .name("idx_organizations_created_at")
                .table(Organizations::Table)
                .col(Organizations::CreatedAt)
                .to_owned(),
            Index::create()
                .name("idx_organizations_is_deleted")
                .table(Organizations::Table)
                .col(Organizations::IsDeleted)
                .to_owned(),
            Index::create()
                .name("idx_users_created_at")
                .table(Users::Table)
                .col(Users::CreatedAt)
                .to_owned(),
            Index::create()
                .name("idx_opc_servers_created_at")
                .table(OpcServers::Table)
                .col(OpcServers::CreatedAt)
                .to_owned(),
            Index::create()
                .name("idx_opc_servers_is_deleted")
                .table(OpcServers::Table)
                .col(OpcServers::IsDeleted)
                .to_owned(),
            Index::create()
                .name("idx_sensors_created_at")
                .table(Sensors::Table)
                .col(Sensors::CreatedAt)
                .to_owned(),
            Index::create()
                .name("idx_sensors_is_deleted")
                .table(Sensors::Table)
                .col(Sensors::IsDeleted)
                .to_owned(),
            Index::create()
                .name("idx_alerts_created_at")
                .table(Alerts::Table)
                .col(Alerts::CreatedAt)
                .to_owned(),
        ] {
            manager.create_index(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Indexes go with their tables.
        manager
            .drop_table(Table::drop().table(Readings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alerts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sensors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserOrganizationAssociation::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OpcServers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    HashedPassword,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserOrganizationAssociation {
    Table,
    Id,
    UserId,
    OrganizationId,
    Role,
}

#[derive(DeriveIden)]
enum OpcServers {
    Table,
    Id,
    OrganizationId,
    Name,
    Description,
    Url,
    SecurityPolicy,
    AuthenticationMethod,
    Username,
    EncryptedPassword,
    CreatedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Sensors {
    Table,
    Id,
    OpcServerId,
    Name,
    Description,
    NodeId,
    Units,
    CreatedAt,
    IsDeleted,
}

#[derive(DeriveIden)]
enum Readings {
    Table,
    Time,
    SensorId,
    Value,
}

#[derive(DeriveIden)]
enum Alerts {
    Table,
    Id,
    SensorId,
    Message,
    TriggeredValue,
    CreatedAt,
}
