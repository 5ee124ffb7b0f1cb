//! # DaQSS Database Crate
//!
//! This crate is the data-access façade over the PostgreSQL database that holds
//! the data quality metadata of DaQSS: data elements, DQ dimensions,
//! aggregation constraints, functions and processes, DQ metrics and DQ results.
//!
//! ## Architectural Principles
//!
//! - **Thin Adapter:** Every operation is one or a few parameterized statements.
//!   There is no caching and no state besides the connection factory.
//! - **One Connection per Call:** Each operation acquires a connection, commits
//!   and releases it. Multi-statement stores share a transaction; batch stores
//!   commit per entry, so a batch is not atomic.
//! - **Warnings, not Errors:** Integrity violations on insert are logged with
//!   `tracing::warn!` and reported as `StoreOutcome::Skipped`. Storing the same
//!   entity twice is therefore a no-op the second time.
//!
//! ## Public API
//!
//! - `Daqss`: the façade holding the connection factory.
//! - `connect_options` / `connect_lazy`: build the connection factory from settings.
//! - `StoreOutcome`, `SeriesStoreReport`: what a store call did.
//! - `DbError`, `ConstraintViolation`: the error types of this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod series;
pub mod specification;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect_lazy, connect_options};
pub use error::{ConstraintViolation, DbError};
pub use repository::{Daqss, StoreOutcome};
pub use series::SeriesStoreReport;
pub use specification::format_aggregation_specification;
