//! HTTP handlers for records and health checks.

pub mod health;
pub mod records;
