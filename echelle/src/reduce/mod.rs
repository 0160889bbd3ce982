//! Per-order reduction pipeline.
//!
//! [`reduce_order`] runs every stage on one order in sequence:
//!
//! 1. Normalize the flat and flat-field the object.
//! 2. Smooth the spatial trace and rectify all images along it.
//! 3. Measure the spectral tilt and rectify along it (optional).
//! 4. Compute the noise image, locate the spatial peak and extract spectra.
//! 5. Identify sky lines against a catalog (optional).
//!
//! Fatal problems return [`ReduceError`]. Optional stages that cannot run
//! are reported to the [`ReductionObserver`] and leave their outputs empty.

mod observer;
mod stage;


use std::sync::Arc;

use rayon::prelude::*;

pub use observer::{EventLog, ReductionEvent, ReductionObserver, TracingObserver};
pub use stage::{SkipReason, StageOutcome};

use crate::config::{ReductionConfig, SpectralTraceConfig};
use crate::error::ReduceError;
use crate::image::{
    Image, extract_spectra, flatten, get_extraction_ranges, normalize, rectify_spatial,
    rectify_spectral,
};
use crate::math::argmax;
use crate::order::{Line, Order, OrderImages};
use crate::trace::{
    calc_noise_img, find_spectral_trace, smooth_spatial_trace, smooth_spectral_trace,
};
use crate::wavelength::{CatalogFile, CatalogSource, line_id, synthesize_sky};

/// Reduce one order.
///
/// The order is consumed; on success it is returned with every derived
/// field filled in.
pub fn reduce_order(
    mut order: Order,
    config: &ReductionConfig,
    catalog: Option<&dyn CatalogSource>,
    observer: &dyn ReductionObserver,
) -> Result<Order, ReduceError> {
    order.validate()?;
    let order_num = order.order_num;
    let emit = |event: ReductionEvent| observer.on_event(order_num, &event);

    // Step 1: Flat normalization and flat fielding
    let mut images = flat_field(&mut order, &emit)?;

    // Step 2: Spatial trace and rectification
    let (rejected, correction) = smooth_spatial(&mut order, config);
    emit(ReductionEvent::SpatialTraceSmoothed { rejected });

    // The stored trace carries the bottom-edge correction, so its mean is the
    // row the order lands on; columns are moved from the measured positions.
    let measured: Vec<f64> = order.smoothed_trace.iter().map(|t| t - correction).collect();
    let reference = crate::math::mean(&order.smoothed_trace).unwrap_or(0.0);
    images = images.try_map(|image| rectify_spatial(image, &measured, reference))?;
    order.flags.spatial_rectified = true;
    emit(ReductionEvent::SpatialRectified);

    update_spatial_profile(&mut order, &images.flattened_obj);

    // Step 3: Spectral tilt (optional)
    match rectify_spectrally(&mut order, &images, &config.spectral_trace)? {
        StageOutcome::Applied(rectified) => {
            images = rectified;
            order.flags.spectral_rectified = true;
            emit(ReductionEvent::SpectralRectified);
        }
        StageOutcome::Skipped(reason) => {
            emit(ReductionEvent::SpectralRectificationSkipped {
                reason: reason.to_string(),
            });
        }
    }

    // Step 4: Noise and extraction
    let noise = calc_noise_img(
        &images.obj,
        &images.normalized_flat,
        order.integration_time,
        &config.noise,
    )?;
    emit(ReductionEvent::NoiseImageComputed);

    update_spatial_profile(&mut order, &images.flattened_obj);
    let windows = get_extraction_ranges(
        images.flattened_obj.height(),
        order.peak_location,
        &config.extraction,
    )?;
    let spectra = extract_spectra(&images.flattened_obj, &noise, order.peak_location, &windows)?;
    order.obj_spec = spectra.obj;
    order.sky_spec = spectra.sky;
    order.noise_spec = spectra.noise;
    order.windows = Some(windows);
    order.noise_img = Some(noise);
    order.images = Some(images);
    emit(ReductionEvent::SpectraExtracted {
        peak_row: order.peak_location,
    });

    // Step 5: Sky line identification (optional)
    match identify_lines(&mut order, config, catalog) {
        StageOutcome::Applied(count) => emit(ReductionEvent::LinesMatched { count }),
        StageOutcome::Skipped(reason) => emit(ReductionEvent::LineMatchingSkipped {
            reason: reason.to_string(),
        }),
    }

    Ok(order)
}

fn flat_field(
    order: &mut Order,
    emit: &impl Fn(ReductionEvent),
) -> Result<OrderImages, ReduceError> {
    let (normalized_flat, mean) =
        normalize(&order.flat_cutout, &order.on_order_mask, &order.off_order_mask)?;
    order.flat_mean = Some(mean);
    order.flags.flat_normalized = true;
    emit(ReductionEvent::FlatNormalized { mean });

    let flattened_obj = flatten(&order.obj_cutout, &normalized_flat)?;
    order.flags.flattened = true;
    emit(ReductionEvent::FlatFielded);

    Ok(OrderImages {
        flat: order.flat_cutout.clone(),
        normalized_flat,
        obj: order.obj_cutout.clone(),
        flattened_obj,
    })
}

/// Smooth the average trace and apply the bottom-edge correction.
/// Returns the number of rejected columns and the correction in rows
/// (zero when the bottom edge sits within the padding).
fn smooth_spatial(order: &mut Order, config: &ReductionConfig) -> (usize, f64) {
    let smoothed = smooth_spatial_trace(&order.avg_trace, &config.spatial_trace);
    let rejected = smoothed.rejected();
    order.smoothed_trace = smoothed.trace;
    order.trace_mask = smoothed.valid_mask;

    let padding = order.padding as f64;
    let mut correction = 0.0;
    if order.bot_meas > padding {
        correction = padding - order.bot_meas;
        tracing::debug!(
            order = order.order_num,
            correction,
            "shifting trace to bottom edge"
        );
        for v in order
            .smoothed_trace
            .iter_mut()
            .chain(order.avg_trace.iter_mut())
        {
            *v += correction;
        }
    }

    (rejected, correction)
}

fn rectify_spectrally(
    order: &mut Order,
    images: &OrderImages,
    config: &SpectralTraceConfig,
) -> Result<StageOutcome<OrderImages>, ReduceError> {
    let raw = match find_spectral_trace(&images.flattened_obj, order.padding, config) {
        Ok(raw) => raw,
        Err(e) => return Ok(StageOutcome::Skipped(e.into())),
    };
    let trace = smooth_spectral_trace(&raw, images.flattened_obj.height(), config);
    let rectified = images.try_map(|image| rectify_spectral(image, &trace))?;
    order.spectral_trace = Some(trace);
    Ok(StageOutcome::Applied(rectified))
}

/// Spatial profile from row means of `flattened` and its first maximum.
fn update_spatial_profile(order: &mut Order, flattened: &Image) {
    order.spatial_profile = flattened.row_means();
    order.peak_location = argmax(&order.spatial_profile).unwrap_or(0);
}

/// Populate the synthesized sky and the matched lines.
fn identify_lines(
    order: &mut Order,
    config: &ReductionConfig,
    catalog: Option<&dyn CatalogSource>,
) -> StageOutcome<usize> {
    let Some(source) = catalog else {
        return StageOutcome::Skipped(SkipReason::NoCatalog);
    };
    let catalog = match source.load() {
        Ok(catalog) => catalog,
        Err(e) => return StageOutcome::Skipped(e.into()),
    };

    order.synthesized_sky_spec = Some(synthesize_sky(
        catalog.wavelengths(),
        catalog.intensities(),
        &order.wavelength_scale_calc,
        config.line_id.line_sigma,
    ));

    let Some(pairs) = line_id(order, &catalog, &config.line_id) else {
        return StageOutcome::Skipped(SkipReason::NoLineMatches);
    };
    let lines: Vec<Line> = pairs
        .into_iter()
        .map(|(col, wavelength)| Line {
            col,
            accepted_wavelength: wavelength,
            peak: order.sky_spec[col],
        })
        .collect();
    order.lines = lines;
    StageOutcome::Applied(order.lines.len())
}

/// Reduces orders with a shared configuration, catalog and observer.
///
/// # Example
///
/// ```rust,ignore
/// use echelle::{OrderReducer, ReductionConfig};
///
/// let reducer = OrderReducer::from_config(ReductionConfig::from_file("reduce.yaml")?);
/// let reduced = reducer.reduce_all(orders);
/// ```
pub struct OrderReducer {
    config: ReductionConfig,
    catalog: Option<Arc<dyn CatalogSource>>,
    observer: Arc<dyn ReductionObserver>,
}

impl Default for OrderReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderReducer {
    /// Default configuration, no catalog, events go to `tracing`.
    pub fn new() -> Self {
        Self::from_config(ReductionConfig::default())
    }

    /// Panics if the configuration is invalid. A configured catalog path
    /// becomes the catalog source.
    pub fn from_config(config: ReductionConfig) -> Self {
        config.validate();
        let catalog = config
            .line_id
            .catalog_path
            .as_ref()
            .map(|path| Arc::new(CatalogFile::new(path)) as Arc<dyn CatalogSource>);
        Self {
            config,
            catalog,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogSource>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ReductionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ReductionConfig {
        &self.config
    }

    pub fn reduce(&self, order: Order) -> Result<Order, ReduceError> {
        reduce_order(
            order,
            &self.config,
            self.catalog.as_deref(),
            self.observer.as_ref(),
        )
    }

    /// Reduce independent orders in parallel. Results keep the input order.
    pub fn reduce_all(&self, orders: Vec<Order>) -> Vec<Result<Order, ReduceError>> {
        orders
            .into_par_iter()
            .map(|order| self.reduce(order))
            .collect()
    }
}
