use configuration::ConfigError;
use core_types::CoreError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load the database connection configuration: {0}")]
    ConnectionConfigError(#[from] ConfigError),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error(transparent)]
    CoreError(#[from] CoreError),
}

/// The kind of integrity constraint an insert ran into.
///
/// Every SQLSTATE of class 23 maps onto one of these; stores treat them as
/// "already there or not insertable" and skip instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique,
    ForeignKey,
    NotNull,
    Check,
    Other,
}

impl ConstraintViolation {
    /// Classifies a PostgreSQL SQLSTATE code. Returns `None` for codes that are
    /// not integrity constraint violations.
    pub fn from_sqlstate(code: &str) -> Option<Self> {
        match code {
            "23505" => Some(ConstraintViolation::Unique),
            "23503" => Some(ConstraintViolation::ForeignKey),
            "23502" => Some(ConstraintViolation::NotNull),
            "23514" => Some(ConstraintViolation::Check),
            code if code.starts_with("23") => Some(ConstraintViolation::Other),
            _ => None,
        }
    }

    /// Returns the violation carried by a driver error, if it is one.
    pub fn of(err: &sqlx::Error) -> Option<Self> {
        match err {
            sqlx::Error::Database(db_err) => db_err.code().as_deref().and_then(Self::from_sqlstate),
            _ => None,
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConstraintViolation::Unique => "unique_violation",
            ConstraintViolation::ForeignKey => "foreign_key_violation",
            ConstraintViolation::NotNull => "not_null_violation",
            ConstraintViolation::Check => "check_violation",
            ConstraintViolation::Other => "integrity_constraint_violation",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_codes_are_classified() {
        assert_eq!(ConstraintViolation::from_sqlstate("23505"), Some(ConstraintViolation::Unique));
        assert_eq!(ConstraintViolation::from_sqlstate("23503"), Some(ConstraintViolation::ForeignKey));
        assert_eq!(ConstraintViolation::from_sqlstate("23502"), Some(ConstraintViolation::NotNull));
        assert_eq!(ConstraintViolation::from_sqlstate("23514"), Some(ConstraintViolation::Check));
        // exclusion_violation
        assert_eq!(ConstraintViolation::from_sqlstate("23P01"), Some(ConstraintViolation::Other));
    }

    #[test]
    fn other_codes_are_not_violations() {
        // undefined_table, connection_failure
        assert_eq!(ConstraintViolation::from_sqlstate("42P01"), None);
        assert_eq!(ConstraintViolation::from_sqlstate("08006"), None);
    }

    #[test]
    fn non_database_errors_are_not_violations() {
        assert_eq!(ConstraintViolation::of(&sqlx::Error::RowNotFound), None);
        assert_eq!(ConstraintViolation::of(&sqlx::Error::PoolTimedOut), None);
    }
}
