//! # Data Models
//!
//! SeaORM entities for the sensor-monitoring domain together with the
//! record descriptors the generic repository uses to address them.

use chrono::Utc;
use sea_orm::sea_query::Value;
use uuid::Uuid;

pub mod alert;
pub mod enums;
pub mod opc_server;
pub mod organization;
pub mod reading;
pub mod sensor;
pub mod user;
pub mod user_organization;

pub use alert::Entity as Alert;
pub use enums::{AuthMethod, SecurityPolicy, UserRole};
pub use opc_server::Entity as OpcServer;
pub use organization::Entity as Organization;
pub use reading::Entity as Reading;
pub use sensor::Entity as Sensor;
pub use user::Entity as User;
pub use user_organization::Entity as UserOrganization;

/// Fresh random identifier for new rows.
pub(crate) fn new_id() -> Value {
    Uuid::new_v4().into()
}

/// Current time as a timezone-aware timestamp.
pub(crate) fn now() -> Value {
    Utc::now().fixed_offset().into()
}

pub(crate) fn not_deleted() -> Value {
    false.into()
}
