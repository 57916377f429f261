//! HTTP handlers for all API routes.

pub mod assistant;
pub mod protein;
pub mod system;
