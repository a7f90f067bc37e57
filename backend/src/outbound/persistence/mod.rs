//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! The persistence layer follows these principles:
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Race-safe mutations**: Slot insertion, execution transitions, and
//!   alert resolution are single guarded statements, so concurrent writers
//!   settle on the database rather than in application code.
//! - **Strongly typed errors**: All database errors are mapped to the
//!   repository port error types.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, PoolConfig, DieselExecutionRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/patrol");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselExecutionRepository::new(pool);
//! ```

mod diesel_alert_repository;
mod diesel_checkpoint_repository;
mod diesel_error_mapping;
mod diesel_execution_repository;
mod diesel_incident_repository;
mod diesel_mark_repository;
mod diesel_monitoring_repository;
mod diesel_schedule_repository;
mod diesel_template_repository;
mod models;
mod pool;
mod row_conversions;
mod schema;

pub use diesel_alert_repository::DieselAlertRepository;
pub use diesel_checkpoint_repository::DieselCheckpointRepository;
pub use diesel_execution_repository::DieselExecutionRepository;
pub use diesel_incident_repository::DieselIncidentRepository;
pub use diesel_mark_repository::DieselMarkRepository;
pub use diesel_monitoring_repository::DieselMonitoringRepository;
pub use diesel_schedule_repository::DieselRoundScheduleRepository;
pub use diesel_template_repository::DieselRoundTemplateRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
