//! # DaQSS
//!
//! Access to a DaQSS database: hierarchical data elements, DQ dimensions,
//! aggregation processes, DQ metrics and the DQ results they produce.
//!
//! ```no_run
//! use daqss::{Daqss, DataElement, LevelOfDataGranularity};
//!
//! # async fn run() -> Result<(), daqss::DbError> {
//! let daqss = Daqss::new()?;
//! let table = DataElement::root("warehouse.orders", LevelOfDataGranularity::Table);
//! daqss.store_data_element(&table).await?;
//! daqss
//!     .store_dq_measurement_results_from_series(
//!         "completeness",
//!         LevelOfDataGranularity::Column,
//!         &table.global_identifier,
//!         [("amount", 0.98), ("customer", 1.0)],
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! The connection is configured with the `DAQSS_USERNAME`, `DAQSS_PASSWORD`,
//! `DAQSS_HOST` (default `localhost:5432`) and `DAQSS_DATABASE` (default
//! `daqss`) environment variables.

pub use configuration::{
    ConfigError, DatabaseSettings, EnvironmentVariables, init_tracing, load_settings,
};
pub use core_types::{
    AggregationConstraint, AggregationFunction, AggregationProcess, ConstraintFunctionPair,
    CoreError, DataElement, DqDimension, DqMetric, DqResultSource, GranularityLevel,
    LevelOfDataGranularity, child_identifier,
};
pub use database::{ConstraintViolation, Daqss, DbError, SeriesStoreReport, StoreOutcome};
