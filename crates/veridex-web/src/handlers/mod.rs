//! HTTP handlers for all web routes.

pub mod analyze;
pub mod health;
