//! Echelle - per-order reduction of echelle spectrograph frames.
//!
//! Given the object and flat-field cutouts of one spectral order, together
//! with masks and a trace seed measured upstream, this library produces:
//! - Flat-fielded images rectified along the spatial and spectral traces
//! - A per-pixel noise model
//! - Extracted object, sky and noise spectra
//! - Sky emission lines matched to a reference catalog
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use echelle::{CatalogFile, Order, OrderReducer, ReductionConfig};
//! use std::sync::Arc;
//!
//! let reducer = OrderReducer::from_config(ReductionConfig::default())
//!     .with_catalog(Arc::new(CatalogFile::new("ir_ohlines.dat")));
//!
//! let order = reducer.reduce(Order::new(input))?;
//! println!("order {}: {} lines", order.order_num, order.lines.len());
//! ```

pub(crate) mod common;
pub mod config;
mod error;
mod header;
pub mod image;
pub(crate) mod math;
mod order;
mod reduce;
mod summary;
pub mod trace;
pub mod wavelength;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude;

// ============================================================================
// Order data
// ============================================================================

pub use crate::common::Buffer2;
pub use image::{ExtractedSpectra, ExtractionWindows, Image, Mask};
pub use order::{Line, Order, OrderImages, OrderInput, ReductionFlags};

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    ConfigError, ExtractionConfig, LineIdConfig, NoiseModel, ReductionConfig,
    SpatialTraceConfig, SpectralTraceConfig,
};

// ============================================================================
// Reduction
// ============================================================================

pub use error::ReduceError;
pub use reduce::{
    EventLog, OrderReducer, ReductionEvent, ReductionObserver, SkipReason, StageOutcome,
    TracingObserver, reduce_order,
};
pub use trace::SpectralTraceError;

// ============================================================================
// Line catalogs
// ============================================================================

pub use wavelength::{CatalogError, CatalogFile, CatalogSource, LineCatalog, get_oh_lines};

// ============================================================================
// Metadata and summaries
// ============================================================================

pub use header::{HeaderError, ObservationHeader};
pub use summary::{FrameSummary, OrderSummary};
