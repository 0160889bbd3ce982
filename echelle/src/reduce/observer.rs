//! Reporting of reduction progress.

use parking_lot::Mutex;

/// Something that happened while reducing one order.
#[derive(Debug, Clone, PartialEq)]
pub enum ReductionEvent {
    FlatNormalized { mean: f64 },
    FlatFielded,
    SpatialTraceSmoothed { rejected: usize },
    SpatialRectified,
    SpectralRectified,
    SpectralRectificationSkipped { reason: String },
    NoiseImageComputed,
    SpectraExtracted { peak_row: usize },
    LinesMatched { count: usize },
    LineMatchingSkipped { reason: String },
}

impl ReductionEvent {
    /// Whether the event reports degraded output.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::SpectralRectificationSkipped { .. } | Self::LineMatchingSkipped { .. }
        )
    }
}

/// Receives events from every order being reduced, possibly from several
/// threads at once.
pub trait ReductionObserver: Send + Sync {
    fn on_event(&self, order_num: u32, event: &ReductionEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReductionObserver for TracingObserver {
    fn on_event(&self, order_num: u32, event: &ReductionEvent) {
        match event {
            ReductionEvent::FlatNormalized { mean } => {
                tracing::info!(order = order_num, mean, "flat normalized");
            }
            ReductionEvent::FlatFielded => {
                tracing::info!(order = order_num, "object flat fielded");
            }
            ReductionEvent::SpatialTraceSmoothed { rejected } => {
                tracing::info!(order = order_num, rejected, "spatial trace smoothed");
            }
            ReductionEvent::SpatialRectified => {
                tracing::info!(order = order_num, "spatial rectification done");
            }
            ReductionEvent::SpectralRectified => {
                tracing::info!(order = order_num, "spectral rectification done");
            }
            ReductionEvent::SpectralRectificationSkipped { reason } => {
                tracing::warn!(order = order_num, %reason, "spectral rectification skipped");
            }
            ReductionEvent::NoiseImageComputed => {
                tracing::info!(order = order_num, "noise image computed");
            }
            ReductionEvent::SpectraExtracted { peak_row } => {
                tracing::info!(order = order_num, peak_row, "spectra extracted");
            }
            ReductionEvent::LinesMatched { count } => {
                tracing::info!(order = order_num, count, "sky lines matched");
            }
            ReductionEvent::LineMatchingSkipped { reason } => {
                tracing::warn!(order = order_num, %reason, "line matching skipped");
            }
        }
    }
}

/// Records every event in arrival order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<(u32, ReductionEvent)>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(u32, ReductionEvent)> {
        self.events.lock().clone()
    }

    /// Events of one order, in the order they were emitted.
    pub fn for_order(&self, order_num: u32) -> Vec<ReductionEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(n, _)| *n == order_num)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ReductionObserver for EventLog {
    fn on_event(&self, order_num: u32, event: &ReductionEvent) {
        self.events.lock().push((order_num, event.clone()));
    }
}
