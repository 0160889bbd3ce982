//! The per-order record that the reduction fills in.

use crate::error::ReduceError;
use crate::header::{HeaderError, ObservationHeader};
use crate::image::{ExtractionWindows, Image, Mask, check_len, check_shape};

/// Upstream products for one spectral order.
#[derive(Debug, Clone)]
pub struct OrderInput {
    pub order_num: u32,
    pub obj_cutout: Image,
    pub flat_cutout: Image,
    pub on_order_mask: Mask,
    pub off_order_mask: Mask,
    /// Spatial row of the order center, one value per column.
    pub avg_trace: Vec<f64>,
    /// Rows of margin above and below the order inside the cutout.
    pub padding: usize,
    /// Measured row of the bottom order edge.
    pub bot_meas: f64,
    /// Seconds.
    pub integration_time: f64,
    /// Estimated wavelength of every column.
    pub wavelength_scale_calc: Vec<f64>,
}

impl OrderInput {
    /// Take the exposure metadata from a frame header.
    ///
    /// The header is validated first; a frame that fails validation
    /// produces no order.
    pub fn with_header(mut self, header: &ObservationHeader) -> Result<Self, HeaderError> {
        header.validate()?;
        self.integration_time = header.integration_time;
        Ok(self)
    }
}

/// Flat, normalized flat, object and flattened object, kept in lockstep
/// through every geometric correction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderImages {
    pub flat: Image,
    pub normalized_flat: Image,
    pub obj: Image,
    pub flattened_obj: Image,
}

impl OrderImages {
    /// Apply `f` to all four images.
    pub(crate) fn try_map(
        &self,
        mut f: impl FnMut(&Image) -> Result<Image, ReduceError>,
    ) -> Result<Self, ReduceError> {
        Ok(Self {
            flat: f(&self.flat)?,
            normalized_flat: f(&self.normalized_flat)?,
            obj: f(&self.obj)?,
            flattened_obj: f(&self.flattened_obj)?,
        })
    }
}

/// Stages that have completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReductionFlags {
    pub flat_normalized: bool,
    pub flattened: bool,
    pub spatial_rectified: bool,
    pub spectral_rectified: bool,
}

/// A sky line matched to a catalog wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub col: usize,
    pub accepted_wavelength: f64,
    /// Sky spectrum value at `col`.
    pub peak: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_num: u32,
    pub obj_cutout: Image,
    pub flat_cutout: Image,
    pub on_order_mask: Mask,
    pub off_order_mask: Mask,
    pub avg_trace: Vec<f64>,
    pub padding: usize,
    pub bot_meas: f64,
    pub integration_time: f64,
    pub wavelength_scale_calc: Vec<f64>,

    pub flat_mean: Option<f64>,
    /// Working images; rectified in place as the stages run.
    pub images: Option<OrderImages>,
    pub smoothed_trace: Vec<f64>,
    /// `true` for columns used in the final spatial trace fit.
    pub trace_mask: Vec<bool>,
    pub spectral_trace: Option<Vec<f64>>,
    /// Per-pixel variance of the flattened object.
    pub noise_img: Option<Image>,
    pub spatial_profile: Vec<f64>,
    pub peak_location: usize,
    pub windows: Option<ExtractionWindows>,
    pub obj_spec: Vec<f64>,
    pub sky_spec: Vec<f64>,
    pub noise_spec: Vec<f64>,
    pub synthesized_sky_spec: Option<Vec<f64>>,
    pub lines: Vec<Line>,
    pub flags: ReductionFlags,
}

impl Order {
    pub fn new(input: OrderInput) -> Self {
        let OrderInput {
            order_num,
            obj_cutout,
            flat_cutout,
            on_order_mask,
            off_order_mask,
            avg_trace,
            padding,
            bot_meas,
            integration_time,
            wavelength_scale_calc,
        } = input;

        Self {
            order_num,
            obj_cutout,
            flat_cutout,
            on_order_mask,
            off_order_mask,
            avg_trace,
            padding,
            bot_meas,
            integration_time,
            wavelength_scale_calc,
            flat_mean: None,
            images: None,
            smoothed_trace: Vec::new(),
            trace_mask: Vec::new(),
            spectral_trace: None,
            noise_img: None,
            spatial_profile: Vec::new(),
            peak_location: 0,
            windows: None,
            obj_spec: Vec::new(),
            sky_spec: Vec::new(),
            noise_spec: Vec::new(),
            synthesized_sky_spec: None,
            lines: Vec::new(),
            flags: ReductionFlags::default(),
        }
    }

    /// Columns (spectral axis).
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.obj_cutout.width()
    }

    /// Rows (spatial axis).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.obj_cutout.height()
    }

    /// Check that every raw array agrees with the object cutout.
    ///
    /// The wavelength scale is not checked here; a mismatched scale only
    /// disables line matching.
    pub fn validate(&self) -> Result<(), ReduceError> {
        if self.obj_cutout.is_empty() {
            return Err(ReduceError::EmptyImage {
                what: "object cutout",
            });
        }
        check_shape("flat cutout", &self.obj_cutout, &self.flat_cutout)?;
        check_shape("on-order mask", &self.obj_cutout, &self.on_order_mask)?;
        check_shape("off-order mask", &self.obj_cutout, &self.off_order_mask)?;
        check_len("average trace", self.n_cols(), self.avg_trace.len())
    }
}
