//! HTTP inbound adapter exposing REST endpoints.

pub mod alerts;
pub mod error;
pub mod executions;
pub mod health;
pub mod monitoring;
pub mod schedules;
pub mod schemas;
pub mod state;
pub mod validation;

pub use error::ApiResult;
