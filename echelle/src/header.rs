//! Typed observation metadata and the checks a frame must pass before its
//! orders are reduced.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detector columns and rows.
pub const DETECTOR_SIZE: usize = 1024;

/// Echelle positions above this value are low-resolution mode.
pub const MAX_HIGH_RES_ECHELLE_POS: f64 = 100.0;

pub const SUPPORTED_FILTERS: &[&str] = &[
    "NIRSPEC-1",
    "NIRSPEC-2",
    "NIRSPEC-3",
    "NIRSPEC-4",
    "NIRSPEC-5",
    "NIRSPEC-6",
    "NIRSPEC-7",
    "K-AO",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationHeader {
    /// Detector columns.
    pub naxis1: usize,
    /// Detector rows.
    pub naxis2: usize,
    pub filter: String,
    /// Echelle angle, degrees.
    pub echelle_pos: f64,
    /// Cross-disperser angle, degrees.
    pub disperser_pos: f64,
    /// Seconds.
    pub integration_time: f64,
    pub target_name: String,
    pub slit: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeaderError {
    #[error("cannot reduce low-resolution frame (echelle position {echelle_pos} > 100)")]
    LowResolution { echelle_pos: f64 },

    #[error("{axis} is {actual}, expected 1024")]
    DetectorSize { axis: &'static str, actual: usize },

    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("integration time {0} s is not positive")]
    InvalidIntegrationTime(f64),
}

impl ObservationHeader {
    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.echelle_pos > MAX_HIGH_RES_ECHELLE_POS {
            return Err(HeaderError::LowResolution {
                echelle_pos: self.echelle_pos,
            });
        }
        if self.naxis1 != DETECTOR_SIZE {
            return Err(HeaderError::DetectorSize {
                axis: "NAXIS1",
                actual: self.naxis1,
            });
        }
        if self.naxis2 != DETECTOR_SIZE {
            return Err(HeaderError::DetectorSize {
                axis: "NAXIS2",
                actual: self.naxis2,
            });
        }
        let filter = self.filter.to_ascii_uppercase();
        if !SUPPORTED_FILTERS.contains(&filter.as_str()) {
            return Err(HeaderError::UnsupportedFilter(self.filter.clone()));
        }
        if !(self.integration_time > 0.0) {
            return Err(HeaderError::InvalidIntegrationTime(self.integration_time));
        }
        Ok(())
    }
}
