//! Spatial and spectral trace modeling and the per-pixel noise image.

mod noise;
mod spatial;
mod spectral;

pub use noise::calc_noise_img;
pub use spatial::{SmoothedTrace, smooth_spatial_trace};
pub use spectral::{SpectralTraceError, TracePoint, find_spectral_trace, smooth_spectral_trace};
