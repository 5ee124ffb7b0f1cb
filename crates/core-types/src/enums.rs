use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A rung in the fixed containment hierarchy of data.
///
/// The ordering expresses containment depth. `Row` and `Column` share the
/// same ordering, so two distinct levels may compare equal by `ordering()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelOfDataGranularity {
    /// A single data value.
    Value,
    /// A row (a record) of data values.
    Row,
    /// A column of data values, i.e. one attribute.
    Column,
    /// All data values contained in a table (a relation).
    Table,
    /// All data values contained in a database.
    Database,
    /// All data values contained in a system, e.g. one integrating several databases.
    System,
}

impl LevelOfDataGranularity {
    /// Every level, in containment order.
    pub const ALL: [LevelOfDataGranularity; 6] = [
        LevelOfDataGranularity::Value,
        LevelOfDataGranularity::Row,
        LevelOfDataGranularity::Column,
        LevelOfDataGranularity::Table,
        LevelOfDataGranularity::Database,
        LevelOfDataGranularity::System,
    ];

    /// The name under which the level is stored in the database.
    pub fn name(&self) -> &'static str {
        match self {
            LevelOfDataGranularity::Value => "value",
            LevelOfDataGranularity::Row => "row",
            LevelOfDataGranularity::Column => "column",
            LevelOfDataGranularity::Table => "table",
            LevelOfDataGranularity::Database => "database",
            LevelOfDataGranularity::System => "system",
        }
    }

    pub fn ordering(&self) -> i32 {
        match self {
            LevelOfDataGranularity::Value => 0,
            LevelOfDataGranularity::Row | LevelOfDataGranularity::Column => 1,
            LevelOfDataGranularity::Table => 2,
            LevelOfDataGranularity::Database => 3,
            LevelOfDataGranularity::System => 4,
        }
    }
}

impl fmt::Display for LevelOfDataGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LevelOfDataGranularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LevelOfDataGranularity::ALL
            .into_iter()
            .find(|level| level.name() == s)
            .ok_or_else(|| CoreError::UnknownGranularity(s.to_string()))
    }
}

/// The entity that computed a DQ result. A result has exactly one producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DqResultSource {
    AggregationProcess(String),
    DqMetric(String),
}

impl DqResultSource {
    pub fn name(&self) -> &str {
        match self {
            DqResultSource::AggregationProcess(name) | DqResultSource::DqMetric(name) => name,
        }
    }

    /// Human readable label used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DqResultSource::AggregationProcess(_) => "DQ aggregation",
            DqResultSource::DqMetric(_) => "DQ measurement",
        }
    }
}
