use crate::enums::LevelOfDataGranularity;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::Display;

/// Separator between a parent identifier and the local identifier of a child.
pub const IDENTIFIER_SEPARATOR: char = '#';

/// Global identifier of the child `key` of `parent_identifier`: `parent#key`.
pub fn child_identifier(parent_identifier: &str, key: &impl Display) -> String {
    format!("{parent_identifier}{IDENTIFIER_SEPARATOR}{key}")
}

/// A row of the `levels_of_data_granularity` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct GranularityLevel {
    #[sqlx(rename = "level_name")]
    pub name: String,
    pub ordering: i32,
}

impl GranularityLevel {
    /// Maps the stored name back onto the fixed set of levels.
    pub fn level(&self) -> Result<LevelOfDataGranularity, CoreError> {
        self.name.parse()
    }
}

impl From<LevelOfDataGranularity> for GranularityLevel {
    fn from(level: LevelOfDataGranularity) -> Self {
        Self {
            name: level.name().to_string(),
            ordering: level.ordering(),
        }
    }
}

/// A node in the containment hierarchy of data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataElement {
    /// Globally unique identifier.
    pub global_identifier: String,
    /// Identifies the element within its parent.
    pub local_identifier: String,
    pub level_of_data_granularity: LevelOfDataGranularity,
    /// Global identifier of the containing element, if any. Must already be stored.
    pub parent_identifier: Option<String>,
}

impl DataElement {
    /// A top-level element whose local identifier equals its global identifier.
    pub fn root(identifier: impl Into<String>, level: LevelOfDataGranularity) -> Self {
        let identifier = identifier.into();
        Self {
            global_identifier: identifier.clone(),
            local_identifier: identifier,
            level_of_data_granularity: level,
            parent_identifier: None,
        }
    }

    /// A child of `parent` whose global identifier is `parent#local`.
    pub fn child_of(parent: &str, local_identifier: impl Into<String>, level: LevelOfDataGranularity) -> Self {
        let local_identifier = local_identifier.into();
        Self {
            global_identifier: child_identifier(parent, &local_identifier),
            local_identifier,
            level_of_data_granularity: level,
            parent_identifier: Some(parent.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqDimension {
    pub name: String,
    pub description: Option<String>,
    /// Name of the dimension this one is a sub-dimension of.
    pub is_subdimension_of: Option<String>,
}

impl DqDimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            is_subdimension_of: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn subdimension_of(mut self, parent: impl Into<String>) -> Self {
        self.is_subdimension_of = Some(parent.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConstraint {
    pub name: String,
    pub description: String,
    /// The constraint encoded in the aggregation engine's language.
    pub formula: String,
    pub level_of_data_granularity: LevelOfDataGranularity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationFunction {
    pub name: String,
    pub description: String,
    pub expression: String,
    /// Granularity of the values to aggregate.
    pub source_level_of_data_granularity: LevelOfDataGranularity,
    /// Granularity of the aggregation result.
    pub target_level_of_data_granularity: LevelOfDataGranularity,
}

/// Names of an aggregation constraint and the aggregation function applied under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintFunctionPair {
    pub constraint: String,
    pub function: String,
}

impl ConstraintFunctionPair {
    pub fn new(constraint: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
            function: function.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationProcess {
    pub name: String,
    pub description: String,
    /// The query that returns the values to aggregate.
    pub query_for_dq_results: String,
    pub constraints_and_functions: Vec<ConstraintFunctionPair>,
    /// Names of the DQ dimensions the process computes values for.
    pub dimensions: Vec<String>,
}
