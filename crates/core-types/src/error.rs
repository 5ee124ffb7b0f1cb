use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown level of data granularity: {0}")]
    UnknownGranularity(String),
}
