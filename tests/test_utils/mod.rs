//! Test utilities for database testing.
//!
//! Sets up in-memory SQLite databases with the schema migrated and seeds
//! the parent rows most tests need.

#![allow(dead_code)]

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use sensorhub::models::{opc_server, organization, sensor};
use sensorhub::repositories::{self, FieldValues};
use uuid::Uuid;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// Foreign keys are enforced so cascading deletes behave as on Postgres.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Creates an organization with the given name.
pub async fn create_organization(
    db: &DatabaseConnection,
    name: &str,
) -> Result<organization::Model> {
    let organization = repositories::organizations(db)
        .create(FieldValues::new().set("name", name))
        .await?;
    Ok(organization)
}

/// Creates an OPC server owned by `organization_id`.
pub async fn create_opc_server(
    db: &DatabaseConnection,
    organization_id: Uuid,
    name: &str,
) -> Result<opc_server::Model> {
    let server = repositories::opc_servers(db)
        .create(
            FieldValues::new()
                .set("organization_id", organization_id)
                .set("name", name)
                .set("url", format!("opc.tcp://{name}:4840")),
        )
        .await?;
    Ok(server)
}

/// Creates an organization and one OPC server under it.
pub async fn seed_server(db: &DatabaseConnection) -> Result<opc_server::Model> {
    let organization = create_organization(db, "acme").await?;
    create_opc_server(db, organization.id, "plant-a").await
}

/// Creates a sensor on `server_id`.
pub async fn create_sensor(
    db: &DatabaseConnection,
    server_id: Uuid,
    name: &str,
    node_id: &str,
) -> Result<sensor::Model> {
    let sensor = repositories::sensors(db)
        .create(
            FieldValues::new()
                .set("opc_server_id", server_id)
                .set("name", name)
                .set("node_id", node_id),
        )
        .await?;
    Ok(sensor)
}
