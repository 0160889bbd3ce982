//! Configuration types for order reduction.
//!
//! [`ReductionConfig`] groups the tunables of every stage. Each group has
//! defaults suited to a 1024x1024 NIRSPEC-class echelle detector and can be
//! read from YAML or JSON with missing fields falling back to the defaults.

use std::path::{Path, PathBuf};

use common::file_format::{FileExtensionError, SerdeFormat, SerdeFormatError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Line matching constants
// ============================================================================

/// Gaussian sigma, in columns, of each line in the synthesized sky spectrum.
pub const SYNTH_LINE_SIGMA_PX: f64 = 1.0;

/// Minimum significance of an observed sky peak, in MAD-sigma above the median.
pub const PEAK_SIGMA: f64 = 3.0;

/// Largest global shift, in columns, searched between synthetic and observed sky.
pub const MAX_SHIFT_PX: usize = 20;

/// Largest accepted distance, in columns, between an observed peak and the
/// shifted predicted column of its catalog line.
pub const MATCH_TOLERANCE_PX: f64 = 2.0;

// ============================================================================
// Extraction
// ============================================================================

/// Aperture geometry for spectral extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Rows on each side of the spatial peak in the object window.
    pub object_half_width: usize,
    /// Rows in each sky window.
    pub sky_height: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            object_half_width: 4,
            sky_height: 8,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) {
        assert!(
            self.sky_height > 0,
            "sky_height must be positive, got {}",
            self.sky_height
        );
    }
}

// ============================================================================
// Noise Model
// ============================================================================

/// Detector noise model used for the per-pixel variance image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseModel {
    /// Gain in electrons per DN.
    pub gain: f64,
    /// Read noise in electrons.
    pub read_noise: f64,
    /// Dark current in electrons per second.
    pub dark_current: f64,
}

impl Default for NoiseModel {
    fn default() -> Self {
        Self {
            gain: 5.8,
            read_noise: 23.0,
            dark_current: 0.8,
        }
    }
}

impl NoiseModel {
    pub fn new(gain: f64, read_noise: f64, dark_current: f64) -> Self {
        Self {
            gain,
            read_noise,
            dark_current,
        }
    }

    pub fn validate(&self) {
        assert!(self.gain > 0.0, "gain must be positive, got {}", self.gain);
        assert!(
            self.read_noise >= 0.0,
            "read_noise must be non-negative, got {}",
            self.read_noise
        );
        assert!(
            self.dark_current >= 0.0,
            "dark_current must be non-negative, got {}",
            self.dark_current
        );
    }
}

// ============================================================================
// Traces
// ============================================================================

/// Smoothing of the per-column spatial trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialTraceConfig {
    pub poly_degree: usize,
    /// Clipping threshold in MAD-sigma of the fit residuals.
    pub kappa: f64,
    pub max_iterations: usize,
}

impl Default for SpatialTraceConfig {
    fn default() -> Self {
        Self {
            poly_degree: 3,
            kappa: 3.0,
            max_iterations: 5,
        }
    }
}

impl SpatialTraceConfig {
    pub fn validate(&self) {
        assert!(self.kappa > 0.0, "kappa must be positive, got {}", self.kappa);
    }
}

/// Detection and smoothing of the spectral (row-to-row) tilt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralTraceConfig {
    /// Largest row displacement searched, in columns.
    pub max_lag: usize,
    /// Rows whose peak normalized correlation is below this are dropped.
    pub min_correlation: f64,
    /// Fewest accepted rows for a usable trace.
    pub min_rows: usize,
    pub poly_degree: usize,
    pub kappa: f64,
    pub max_iterations: usize,
}

impl Default for SpectralTraceConfig {
    fn default() -> Self {
        Self {
            max_lag: 8,
            min_correlation: 0.5,
            min_rows: 5,
            poly_degree: 2,
            kappa: 3.0,
            max_iterations: 5,
        }
    }
}

impl SpectralTraceConfig {
    pub fn validate(&self) {
        assert!(
            (-1.0..=1.0).contains(&self.min_correlation),
            "min_correlation must be in [-1, 1], got {}",
            self.min_correlation
        );
        assert!(self.min_rows > 0, "min_rows must be positive");
        assert!(self.kappa > 0.0, "kappa must be positive, got {}", self.kappa);
    }
}

// ============================================================================
// Line Identification
// ============================================================================

/// Sky line identification against a reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineIdConfig {
    pub line_sigma: f64,
    pub peak_sigma: f64,
    pub max_shift: usize,
    pub match_tolerance: f64,
    /// Catalog file loaded by [`crate::OrderReducer::from_config`].
    pub catalog_path: Option<PathBuf>,
}

impl Default for LineIdConfig {
    fn default() -> Self {
        Self {
            line_sigma: SYNTH_LINE_SIGMA_PX,
            peak_sigma: PEAK_SIGMA,
            max_shift: MAX_SHIFT_PX,
            match_tolerance: MATCH_TOLERANCE_PX,
            catalog_path: None,
        }
    }
}

impl LineIdConfig {
    pub fn validate(&self) {
        assert!(
            self.line_sigma > 0.0,
            "line_sigma must be positive, got {}",
            self.line_sigma
        );
        assert!(
            self.peak_sigma >= 0.0,
            "peak_sigma must be non-negative, got {}",
            self.peak_sigma
        );
        assert!(
            self.match_tolerance > 0.0,
            "match_tolerance must be positive, got {}",
            self.match_tolerance
        );
    }
}

// ============================================================================
// Reduction
// ============================================================================

/// Complete configuration of one reduction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionConfig {
    pub extraction: ExtractionConfig,
    pub noise: NoiseModel,
    pub spatial_trace: SpatialTraceConfig,
    pub spectral_trace: SpectralTraceConfig,
    pub line_id: LineIdConfig,
}

impl ReductionConfig {
    /// Validate every group. Panics on an invalid value.
    pub fn validate(&self) {
        self.extraction.validate();
        self.noise.validate();
        self.spatial_trace.validate();
        self.spectral_trace.validate();
        self.line_id.validate();
    }

    /// Read a configuration file; the format follows the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = SerdeFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        format
            .deserialize(&text)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Errors that can occur when loading a [`ReductionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FileExtensionError),

    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: SerdeFormatError,
    },
}
