use serde::Serialize;
use serde::de::DeserializeOwned;

/// A DQ metric whose implementation can be stored in and restored from DaQSS.
///
/// The serialized form of the implementing type is what gets persisted, so
/// everything needed to evaluate the metric must live in its fields.
pub trait DqMetric: Serialize + DeserializeOwned {
    /// The unique name the metric is stored under.
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }
}
