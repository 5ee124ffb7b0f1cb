/// Outcome of storing a series of DQ results.
///
/// Every entry is committed on its own, so `stored` entries persist even when
/// later ones are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesStoreReport {
    pub stored: usize,
    /// Child identifiers whose result could not be stored.
    pub skipped: Vec<String>,
}

impl SeriesStoreReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn total(&self) -> usize {
        self.stored + self.skipped.len()
    }
}
