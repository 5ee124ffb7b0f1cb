pub mod enums;
pub mod error;
pub mod metric;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{DqResultSource, LevelOfDataGranularity};
pub use error::CoreError;
pub use metric::DqMetric;
pub use structs::{
    AggregationConstraint, AggregationFunction, AggregationProcess, ConstraintFunctionPair,
    DataElement, DqDimension, GranularityLevel, IDENTIFIER_SEPARATOR, child_identifier,
};
