//! Entity re-exports.

pub use super::uploads::Entity as Uploads;
