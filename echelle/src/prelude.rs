//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use echelle::prelude::*;
//! ```

// Order data
pub use crate::{Image, Line, Mask, Order, OrderInput};

// Reduction - main API
pub use crate::{
    OrderReducer, ReduceError, ReductionConfig, ReductionEvent, ReductionObserver, reduce_order,
};

// Line catalogs
pub use crate::{CatalogFile, CatalogSource, LineCatalog};

// Summaries
pub use crate::{FrameSummary, ObservationHeader, OrderSummary};
