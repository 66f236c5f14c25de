//! # Repository Layer
//!
//! A single generic [`Repository`] serves every record type. Each record
//! type contributes a [`RecordDescriptor`]; the constructors below pair a
//! borrowed connection with the right descriptor.
//!
//! ```ignore
//! let page = repositories::sensors(&db)
//!     .get_multi(0, 20, Some("-created_at"), &Filters::new().with("units", "C"))
//!     .await?;
//! ```

use sea_orm::ConnectionTrait;

use crate::models::{
    alert, opc_server, organization, reading, sensor, user, user_organization,
};

pub mod base;
pub mod descriptor;
pub mod filter;
pub mod values;

pub use base::{Page, Repository};
pub use descriptor::{DefaultFn, RecordDescriptor};
pub use filter::{Clause, FilterValue, Filters, Operator};
pub use values::FieldValues;

pub type OrganizationRepository<'a, C> = Repository<'a, organization::Entity, C>;
pub type UserRepository<'a, C> = Repository<'a, user::Entity, C>;
pub type MembershipRepository<'a, C> = Repository<'a, user_organization::Entity, C>;
pub type OpcServerRepository<'a, C> = Repository<'a, opc_server::Entity, C>;
pub type SensorRepository<'a, C> = Repository<'a, sensor::Entity, C>;
pub type ReadingRepository<'a, C> = Repository<'a, reading::Entity, C>;
pub type AlertRepository<'a, C> = Repository<'a, alert::Entity, C>;

pub fn organizations<C: ConnectionTrait>(conn: &C) -> OrganizationRepository<'_, C> {
    Repository::new(conn, organization::descriptor())
}

pub fn users<C: ConnectionTrait>(conn: &C) -> UserRepository<'_, C> {
    Repository::new(conn, user::descriptor())
}

pub fn memberships<C: ConnectionTrait>(conn: &C) -> MembershipRepository<'_, C> {
    Repository::new(conn, user_organization::descriptor())
}

pub fn opc_servers<C: ConnectionTrait>(conn: &C) -> OpcServerRepository<'_, C> {
    Repository::new(conn, opc_server::descriptor())
}

pub fn sensors<C: ConnectionTrait>(conn: &C) -> SensorRepository<'_, C> {
    Repository::new(conn, sensor::descriptor())
}

pub fn readings<C: ConnectionTrait>(conn: &C) -> ReadingRepository<'_, C> {
    Repository::new(conn, reading::descriptor())
}

pub fn alerts<C: ConnectionTrait>(conn: &C) -> AlertRepository<'_, C> {
    Repository::new(conn, alert::descriptor())
}
