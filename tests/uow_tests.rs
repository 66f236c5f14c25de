//! Integration tests for transactional grouping.

mod test_utils;

use anyhow::Result;
use sensorhub::repositories::{self, FieldValues, Filters};
use sensorhub::{RepositoryError, UnitOfWork};
use test_utils::{seed_server, setup_test_db};

fn sensor(server_id: uuid::Uuid, name: &str) -> FieldValues {
    FieldValues::new()
        .set("opc_server_id", server_id)
        .set("name", name)
        .set("node_id", format!("ns=2;s={name}"))
}

#[tokio::test]
async fn run_commits_on_success() -> Result<()> {
    let db = setup_test_db().await?;
    let server = seed_server(&db).await?;
    let uow = UnitOfWork::new(db.clone());
    let server_id = server.id;

    let created = uow
        .run(move |txn| {
            Box::pin(async move {
                let sensors = repositories::sensors(txn);
                let first = sensors.create(sensor(server_id, "temp1")).await?;
                sensors.create(sensor(server_id, "temp2")).await?;
                Ok::<_, RepositoryError>(first)
            })
        })
        .await?;

    assert_eq!(created.name, "temp1");
    assert_eq!(repositories::sensors(&db).count(&Filters::new()).await?, 2);

    Ok(())
}

#[tokio::test]
async fn run_rolls_back_and_returns_the_original_error() -> Result<()> {
    let db = setup_test_db().await?;
    let server = seed_server(&db).await?;
    let uow = UnitOfWork::new(db.clone());
    let server_id = server.id;

    let error = uow
        .run(move |txn| {
            Box::pin(async move {
                let sensors = repositories::sensors(txn);
                sensors.create(sensor(server_id, "temp1")).await?;
                sensors.create(sensor(server_id, "temp1")).await?;
                Ok::<_, RepositoryError>(())
            })
        })
        .await
        .unwrap_err();

    assert!(matches!(error, RepositoryError::AlreadyExists { .. }));
    assert_eq!(repositories::sensors(&db).count(&Filters::new()).await?, 0);

    Ok(())
}

#[tokio::test]
async fn scope_commit_persists_writes() -> Result<()> {
    let db = setup_test_db().await?;
    let server = seed_server(&db).await?;
    let uow = UnitOfWork::new(db.clone());

    let scope = uow.begin().await?;
    repositories::sensors(&*scope)
        .create(sensor(server.id, "temp1"))
        .await?;
    scope.commit().await?;

    assert_eq!(repositories::sensors(&db).count(&Filters::new()).await?, 1);

    Ok(())
}

#[tokio::test]
async fn scope_rollback_discards_writes() -> Result<()> {
    let db = setup_test_db().await?;
    let server = seed_server(&db).await?;
    let uow = UnitOfWork::new(db.clone());

    let scope = uow.begin().await?;
    let sensors = repositories::sensors(&*scope);
    sensors.create(sensor(server.id, "temp1")).await?;
    assert_eq!(sensors.count(&Filters::new()).await?, 1);
    drop(sensors);
    scope.rollback().await?;

    assert_eq!(repositories::sensors(&db).count(&Filters::new()).await?, 0);

    Ok(())
}

#[tokio::test]
async fn dropped_scope_rolls_back() -> Result<()> {
    let db = setup_test_db().await?;
    let server = seed_server(&db).await?;
    let uow = UnitOfWork::new(db.clone());

    {
        let scope = uow.begin().await?;
        repositories::sensors(&*scope)
            .create(sensor(server.id, "temp1"))
            .await?;
    }

    assert_eq!(repositories::sensors(&db).count(&Filters::new()).await?, 0);

    Ok(())
}
