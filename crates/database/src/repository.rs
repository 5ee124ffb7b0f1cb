use crate::connection::connect_lazy;
use crate::error::{ConstraintViolation, DbError};
use crate::series::SeriesStoreReport;
use crate::specification::format_aggregation_specification;
use chrono::{DateTime, Utc};
use configuration::DatabaseSettings;
use core_types::{
    AggregationConstraint, AggregationFunction, AggregationProcess, DataElement, DqDimension,
    DqMetric, DqResultSource, GranularityLevel, LevelOfDataGranularity, child_identifier,
};
use serde::de::DeserializeOwned;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, Postgres};
use std::fmt::Display;

/// What happened to a single store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    /// The row was rejected by an integrity constraint; a warning was logged.
    Skipped(ConstraintViolation),
}

impl StoreOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, StoreOutcome::Stored)
    }
}

/// The `Daqss` façade holds the connection factory for the DaQSS database and
/// provides all the high-level retrieve and store operations.
///
/// Every operation acquires its own connection and commits before returning.
/// Integrity violations on insert are logged as warnings and reported as
/// [`StoreOutcome::Skipped`]; they are never returned as errors.
#[derive(Debug, Clone)]
pub struct Daqss {
    pool: PgPool,
}

/// One entry of a result series, already mapped onto its data element.
struct SeriesEntry<'a> {
    data_element: &'a str,
    local_identifier: &'a str,
    value: f64,
}

impl Daqss {
    /// Creates a façade configured from the `DAQSS_*` environment variables
    /// (and a `.env` file, if present).
    ///
    /// Missing credentials are logged as errors but do not fail construction;
    /// see [`connect_options`](crate::connect_options) for the fallbacks used.
    /// No connection is opened here, but the pool's maintenance task is
    /// spawned, so this must be called from within a Tokio runtime.
    pub fn new() -> Result<Self, DbError> {
        let settings = configuration::load_settings()?;
        Self::with_settings(&settings)
    }

    /// Creates a façade from explicit settings. Must be called from within a
    /// Tokio runtime, like [`Daqss::new`].
    pub fn with_settings(settings: &DatabaseSettings) -> Result<Self, DbError> {
        settings.report_missing_credentials();
        tracing::info!(
            database = %settings.redacted_connection_string(),
            "Configured DaQSS database connection."
        );
        Ok(Self {
            pool: connect_lazy(settings)?,
        })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns a connection for querying DaQSS directly with SQL.
    pub async fn connect(&self) -> Result<PoolConnection<Postgres>, DbError> {
        Ok(self.pool.acquire().await?)
    }

    // ==========================================================================
    // Retrieval
    // ==========================================================================

    /// Retrieves the formula of an aggregation constraint by its name.
    pub async fn retrieve_aggregation_constraint_formula_by_name(
        &self,
        name: &str,
    ) -> Result<Option<String>, DbError> {
        let formula: Option<String> = sqlx::query_scalar(
            r#"
            SELECT aggregation_constraint_formula
            FROM aggregation_constraint
            WHERE aggregation_constraint_name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if formula.is_none() {
            tracing::error!(
                aggregation_constraint = name,
                "No aggregation constraint exists with the given name."
            );
        }
        Ok(formula)
    }

    /// Retrieves the expression of an aggregation function by its name.
    pub async fn retrieve_aggregation_function_expression_by_name(
        &self,
        name: &str,
    ) -> Result<Option<String>, DbError> {
        let expression: Option<String> = sqlx::query_scalar(
            r#"
            SELECT aggregation_function_expression
            FROM aggregation_function
            WHERE aggregation_function_name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if expression.is_none() {
            tracing::error!(
                aggregation_function = name,
                "No aggregation function exists with the given name."
            );
        }
        Ok(expression)
    }

    /// Retrieves an aggregation process as an aggregation specification of the
    /// form `{(formula,expression),...}`, one pair per constraint and function
    /// the process is based on.
    pub async fn retrieve_aggregation_process_by_name_as_aggregation_specification(
        &self,
        name: &str,
    ) -> Result<Option<String>, DbError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT ac.aggregation_constraint_formula, af.aggregation_function_expression
            FROM aggregation_process_is_based_on AS bo
            JOIN aggregation_constraint AS ac
                ON ac.aggregation_constraint_name = bo.aggregation_constraint_name
            JOIN aggregation_function AS af
                ON af.aggregation_function_name = bo.aggregation_function_name
            WHERE bo.aggregation_process_name = $1
            ORDER BY bo.aggregation_constraint_name, bo.aggregation_function_name
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        let specification = format_aggregation_specification(
            rows.iter().map(|(formula, expression)| (formula.as_str(), expression.as_str())),
        );
        if specification.is_none() {
            tracing::error!(
                aggregation_process = name,
                "No aggregation specification could be retrieved for the given aggregation process name."
            );
        }
        Ok(specification)
    }

    /// Retrieves the stored implementation of a DQ metric and restores it.
    pub async fn retrieve_dq_metric_implementation_by_name<M: DeserializeOwned>(
        &self,
        name: &str,
    ) -> Result<Option<M>, DbError> {
        let implementation: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT metric_implementation FROM dq_metric WHERE metric_name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        match implementation {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => {
                tracing::error!(
                    dq_metric = name,
                    "There is no implementation for a DQ metric with the given name."
                );
                Ok(None)
            }
        }
    }

    /// Retrieves the levels of data granularity known to DaQSS, ascending by ordering.
    pub async fn retrieve_levels_of_data_granularity(&self) -> Result<Vec<GranularityLevel>, DbError> {
        let levels = sqlx::query_as::<_, GranularityLevel>(
            "SELECT level_name, ordering FROM levels_of_data_granularity ORDER BY ordering ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(levels)
    }

    // ==========================================================================
    // Storage
    // ==========================================================================

    pub async fn store_aggregation_constraint(
        &self,
        constraint: &AggregationConstraint,
    ) -> Result<StoreOutcome, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO aggregation_constraint (
                aggregation_constraint_name, aggregation_constraint_description,
                aggregation_constraint_formula, covers_level_of_data_granularity
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&constraint.name)
        .bind(&constraint.description)
        .bind(&constraint.formula)
        .bind(constraint.level_of_data_granularity.name())
        .execute(&self.pool)
        .await;

        outcome_of(result, || {
            format!(
                "The aggregation constraint with the name \"{}\" cannot be stored, since an \
                 aggregation constraint with the same name already exists.",
                constraint.name
            )
        })
    }

    pub async fn store_aggregation_function(
        &self,
        function: &AggregationFunction,
    ) -> Result<StoreOutcome, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO aggregation_function (
                aggregation_function_name, aggregation_function_description,
                aggregation_function_expression, source_level_of_data_granularity,
                target_level_of_data_granularity
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&function.name)
        .bind(&function.description)
        .bind(&function.expression)
        .bind(function.source_level_of_data_granularity.name())
        .bind(function.target_level_of_data_granularity.name())
        .execute(&self.pool)
        .await;

        outcome_of(result, || {
            format!(
                "The aggregation function with the name \"{}\" cannot be stored, since an \
                 aggregation function with the same name already exists.",
                function.name
            )
        })
    }

    /// Stores an aggregation process with its (constraint, function) pairs and
    /// associates it with its dimensions.
    ///
    /// The process row and its pairs are committed together. Each dimension
    /// association is committed on its own and attempted even when the process
    /// itself was skipped. The returned outcome describes the process row.
    pub async fn store_aggregation_process(
        &self,
        process: &AggregationProcess,
    ) -> Result<StoreOutcome, DbError> {
        let outcome = outcome_of(self.insert_aggregation_process(process).await, || {
            format!(
                "The aggregation process with the name \"{}\" cannot be stored, since\n \
                 - an aggregation process with the same name already exists, or\n \
                 - it was tried to add a combination of constraint and aggregation function \
                 that was already associated with this aggregation process, or\n \
                 - the supplied constraints and aggregation functions targeted different \
                 levels of data granularity.",
                process.name
            )
        })?;

        for dimension_name in &process.dimensions {
            let result = sqlx::query(
                r#"
                INSERT INTO aggregation_process_computes_value_for_dimension
                    (aggregation_process_name, dimension_name)
                VALUES ($1, $2)
                "#,
            )
            .bind(&process.name)
            .bind(dimension_name)
            .execute(&self.pool)
            .await;

            outcome_of(result, || {
                format!(
                    "The aggregation process with the name \"{}\" cannot be associated with the \
                     DQ dimension \"{dimension_name}\", since\n - this association is already in \
                     place, or\n - the dimension \"{dimension_name}\" does not exist.",
                    process.name
                )
            })?;
        }

        Ok(outcome)
    }

    async fn insert_aggregation_process(&self, process: &AggregationProcess) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO aggregation_process (
                aggregation_process_name, aggregation_process_description, aggregation_query_for_values
            ) VALUES ($1, $2, $3)
            "#,
        )
        .bind(&process.name)
        .bind(&process.description)
        .bind(&process.query_for_dq_results)
        .execute(&mut *tx)
        .await?;

        for pair in &process.constraints_and_functions {
            sqlx::query(
                r#"
                INSERT INTO aggregation_process_is_based_on (
                    aggregation_process_name, aggregation_constraint_name, aggregation_function_name
                ) VALUES ($1, $2, $3)
                "#,
            )
            .bind(&process.name)
            .bind(&pair.constraint)
            .bind(&pair.function)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Stores a DQ dimension, optionally as a sub-dimension of an existing one.
    ///
    /// Returns [`DbError::ValidationError`] without inserting anything when the
    /// parent dimension does not exist.
    pub async fn store_dq_dimension(&self, dimension: &DqDimension) -> Result<StoreOutcome, DbError> {
        let mut tx = self.pool.begin().await?;

        if let Some(parent) = &dimension.is_subdimension_of {
            let parent_exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM dq_dimension WHERE dimension_name = $1)",
            )
            .bind(parent)
            .fetch_one(&mut *tx)
            .await?;

            if !parent_exists {
                return Err(DbError::ValidationError(format!(
                    "The supplied parent dimension \"{parent}\" does not exist."
                )));
            }
        }

        let result = sqlx::query(
            r#"
            INSERT INTO dq_dimension (dimension_name, dimension_description, is_sub_dimension_of)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&dimension.name)
        .bind(dimension.description.as_deref())
        .bind(dimension.is_subdimension_of.as_deref())
        .execute(&mut *tx)
        .await;

        if result.is_ok() {
            tx.commit().await?;
        }
        outcome_of(result, || {
            format!(
                "A DQ dimension with the name \"{}\" cannot be created, since a dimension with \
                 the same name already exists.",
                dimension.name
            )
        })
    }

    /// Stores a DQ metric together with its serialized implementation and
    /// associates it with the given dimensions.
    ///
    /// Each dimension association is committed on its own. The returned
    /// outcome describes the metric row.
    pub async fn store_dq_metric<M: DqMetric>(
        &self,
        dq_metric: &M,
        dimensions: &[&str],
        level_of_data_granularity: LevelOfDataGranularity,
    ) -> Result<StoreOutcome, DbError> {
        let metric_name = dq_metric.name();
        let implementation = serde_json::to_vec(dq_metric)?;

        let result = sqlx::query(
            r#"
            INSERT INTO dq_metric (
                metric_name, metric_description, metric_implementation,
                designed_for_level_of_data_granularity
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(metric_name)
        .bind(dq_metric.description())
        .bind(implementation)
        .bind(level_of_data_granularity.name())
        .execute(&self.pool)
        .await;

        let outcome = outcome_of(result, || {
            format!(
                "A DQ metric with the name \"{metric_name}\" cannot be stored, since a metric \
                 with the same name already exists."
            )
        })?;

        for dimension_name in dimensions {
            let result = sqlx::query(
                "INSERT INTO metric_computes_value_for_dimension (metric_name, dimension_name) VALUES ($1, $2)",
            )
            .bind(metric_name)
            .bind(*dimension_name)
            .execute(&self.pool)
            .await;

            outcome_of(result, || {
                format!(
                    "The DQ metric with the name \"{metric_name}\" cannot be associated with the \
                     DQ dimension \"{dimension_name}\", since\n - this association is already in \
                     place, or\n - the dimension \"{dimension_name}\" does not exist."
                )
            })?;
        }

        Ok(outcome)
    }

    /// Stores the representation of a data element. A parent, if given, must
    /// already be stored.
    pub async fn store_data_element(&self, data_element: &DataElement) -> Result<StoreOutcome, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO data_element (
                data_element_global_identifier, data_element_local_identifier,
                is_of_level_of_data_granularity, parent_data_element_global_identifier
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&data_element.global_identifier)
        .bind(&data_element.local_identifier)
        .bind(data_element.level_of_data_granularity.name())
        .bind(data_element.parent_identifier.as_deref())
        .execute(&self.pool)
        .await;

        outcome_of(result, || match &data_element.parent_identifier {
            None => format!(
                "The data element with the global_identifier \"{}\" cannot be stored, since a \
                 data element with the same global_identifier already exists.",
                data_element.global_identifier
            ),
            Some(parent) => format!(
                "The data element with the global_identifier \"{}\" cannot be stored, since\n \
                 - a data element with the same global_identifier already exists, or\n \
                 - the provided parent data element global_identifier \"{parent}\" does not exist.",
                data_element.global_identifier
            ),
        })
    }

    /// Stores the result values computed by an aggregation process.
    ///
    /// Each `(key, value)` entry is attached to the data element
    /// `parent_data_element#key`, which is created on the fly if it does not
    /// exist yet.
    pub async fn store_dq_aggregation_results_from_series<I, K>(
        &self,
        aggregation_process: &str,
        level_of_data_granularity: LevelOfDataGranularity,
        parent_data_element: &str,
        values: I,
    ) -> Result<SeriesStoreReport, DbError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Display,
    {
        let source = DqResultSource::AggregationProcess(aggregation_process.to_string());
        self.store_results_from_series(&source, level_of_data_granularity, parent_data_element, values)
            .await
    }

    /// Stores the result values computed by the DQ metric named `dq_metric`.
    ///
    /// Data elements are handled as in
    /// [`Daqss::store_dq_aggregation_results_from_series`].
    pub async fn store_dq_measurement_results_from_series<I, K>(
        &self,
        dq_metric: &str,
        level_of_data_granularity: LevelOfDataGranularity,
        parent_data_element: &str,
        values: I,
    ) -> Result<SeriesStoreReport, DbError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Display,
    {
        let source = DqResultSource::DqMetric(dq_metric.to_string());
        self.store_results_from_series(&source, level_of_data_granularity, parent_data_element, values)
            .await
    }

    async fn store_results_from_series<I, K>(
        &self,
        source: &DqResultSource,
        level_of_data_granularity: LevelOfDataGranularity,
        parent_data_element: &str,
        values: I,
    ) -> Result<SeriesStoreReport, DbError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Display,
    {
        // All results of one call share a creation timestamp.
        let timestamp = Utc::now();
        let mut report = SeriesStoreReport::default();

        for (key, value) in values {
            let local_identifier = key.to_string();
            let data_element = child_identifier(parent_data_element, &local_identifier);
            let entry = SeriesEntry {
                data_element: &data_element,
                local_identifier: &local_identifier,
                value,
            };

            let result = self
                .insert_series_entry(source, level_of_data_granularity, parent_data_element, &entry, timestamp)
                .await;
            match result {
                Ok(()) => report.stored += 1,
                Err(e) => match ConstraintViolation::of(&e) {
                    Some(violation) => {
                        tracing::debug!(%violation, data_element = %data_element, "Skipped DQ result.");
                        report.skipped.push(data_element);
                    }
                    None => return Err(e.into()),
                },
            }
        }

        if !report.is_complete() {
            tracing::warn!(
                producer = source.name(),
                skipped = report.skipped.len(),
                stored = report.stored,
                "At least one {} result cannot be stored, since for at least one result value\n \
                 - the producer computed two results for the same data element, or\n \
                 - the provided parent data element is not represented in DaQSS",
                source.kind()
            );
        }

        Ok(report)
    }

    /// Inserts the data element of one series entry (if missing) and its
    /// result within one transaction.
    async fn insert_series_entry(
        &self,
        source: &DqResultSource,
        level_of_data_granularity: LevelOfDataGranularity,
        parent_data_element: &str,
        entry: &SeriesEntry<'_>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let (aggregation_process, dq_metric) = match source {
            DqResultSource::AggregationProcess(name) => (Some(name.as_str()), None),
            DqResultSource::DqMetric(name) => (None, Some(name.as_str())),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO data_element (
                data_element_global_identifier, data_element_local_identifier,
                is_of_level_of_data_granularity, parent_data_element_global_identifier
            ) VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(entry.data_element)
        .bind(entry.local_identifier)
        .bind(level_of_data_granularity.name())
        .bind(parent_data_element)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO dq_result (
                creation_timestamp, result_value, computed_on_data_element_global_id,
                calculated_by_aggregation_process, calculated_by_dq_metric
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(timestamp)
        .bind(entry.value)
        .bind(entry.data_element)
        .bind(aggregation_process)
        .bind(dq_metric)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}

/// Maps the result of an insert onto a [`StoreOutcome`], downgrading integrity
/// violations to a logged warning. Any other error is returned.
fn outcome_of<T>(
    result: Result<T, sqlx::Error>,
    warning: impl FnOnce() -> String,
) -> Result<StoreOutcome, DbError> {
    match result {
        Ok(_) => Ok(StoreOutcome::Stored),
        Err(e) => match ConstraintViolation::of(&e) {
            Some(violation) => {
                tracing::warn!(%violation, "{}", warning());
                Ok(StoreOutcome::Skipped(violation))
            }
            None => Err(e.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_settings(username: Option<&str>) -> DatabaseSettings {
        DatabaseSettings {
            username: username.map(str::to_string),
            password: None,
            host: "127.0.0.1:1".to_string(),
            database: "daqss".to_string(),
        }
    }

    #[tokio::test]
    async fn facade_is_built_inside_a_runtime_without_connecting() {
        let daqss = Daqss::with_settings(&unreachable_settings(Some("alice"))).unwrap();
        assert_eq!(daqss.pool().size(), 0);

        // Missing credentials are reported, not fatal.
        let anonymous = Daqss::with_settings(&unreachable_settings(None)).unwrap();
        assert_eq!(anonymous.pool().size(), 0);
    }

    #[test]
    fn store_outcome_reports_whether_a_row_was_written() {
        assert!(StoreOutcome::Stored.is_stored());
        assert!(!StoreOutcome::Skipped(ConstraintViolation::Unique).is_stored());
    }
}
