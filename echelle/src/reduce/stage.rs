use thiserror::Error;

use crate::trace::SpectralTraceError;
use crate::wavelength::CatalogError;

/// Result of an optional reduction stage.
///
/// A skipped stage lowers the quality of the reduced order but never
/// aborts it.
#[derive(Debug)]
pub enum StageOutcome<T> {
    Applied(T),
    Skipped(SkipReason),
}

impl<T> StageOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Why an optional stage did not run to completion.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("spectral trace unavailable: {0}")]
    SpectralTrace(#[from] SpectralTraceError),

    #[error("line catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("no sky lines matched the catalog")]
    NoLineMatches,

    #[error("no line catalog configured")]
    NoCatalog,
}
