pub mod calendar;
pub(crate) mod common;
pub mod expiring;
pub mod expiry;
