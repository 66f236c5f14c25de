//! # Sensor Hub Data Access Library
//!
//! Persistence layer for an industrial sensor-monitoring system: domain
//! models for organizations, users, OPC servers, sensors, readings and
//! alerts, a generic filtered repository over them, and a unit of work for
//! transactional grouping.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod telemetry;
pub mod uow;

pub use error::RepositoryError;
pub use migration;
pub use uow::{UnitOfWork, UnitOfWorkScope};
