//! Testing utilities for echelle.

#![allow(dead_code)]

use std::io::Write;

use crate::image::{Image, Mask};
use crate::order::{Order, OrderInput};

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Wavelength of column `x` on the synthetic scale.
pub fn column_wavelength(x: f64) -> f64 {
    21000.0 + 0.25 * x
}

/// Write a two-column line catalog to a temporary file.
pub fn write_catalog(lines: &[(f64, f64)]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".dat")
        .tempfile()
        .unwrap();
    writeln!(file, "# wavelength intensity").unwrap();
    for (wavelength, intensity) in lines {
        writeln!(file, "{wavelength:.4} {intensity:.3}").unwrap();
    }
    file
}

/// Parameters of a synthetic order: a Gaussian (or single-row) source along
/// a straight spatial trace, a flat background and tilted sky lines.
#[derive(Debug, Clone)]
pub struct SyntheticOrder {
    pub order_num: u32,
    pub width: usize,
    pub height: usize,
    /// Source row at the middle column.
    pub center_row: f64,
    /// Rows per column.
    pub trace_slope: f64,
    /// Sky line displacement in columns per row, relative to `center_row`.
    pub tilt: f64,
    pub source_amplitude: f64,
    /// Spatial sigma of the source; 0 puts all flux in one row.
    pub source_sigma: f64,
    pub background: f64,
    /// `(column at center_row, amplitude)` of each sky line.
    pub sky_lines: Vec<(f64, f64)>,
    pub flat_level: f64,
    pub padding: usize,
    pub bot_meas: f64,
    pub integration_time: f64,
}

impl Default for SyntheticOrder {
    fn default() -> Self {
        Self {
            order_num: 35,
            width: 128,
            height: 40,
            center_row: 20.0,
            trace_slope: 0.0,
            tilt: 0.0,
            source_amplitude: 200.0,
            source_sigma: 1.5,
            background: 20.0,
            sky_lines: vec![(20.0, 300.0), (45.0, 150.0), (70.0, 400.0), (100.0, 250.0)],
            flat_level: 1000.0,
            padding: 4,
            bot_meas: 2.0,
            integration_time: 60.0,
        }
    }
}

impl SyntheticOrder {
    pub fn trace(&self, x: usize) -> f64 {
        self.center_row + self.trace_slope * (x as f64 - (self.width - 1) as f64 / 2.0)
    }

    /// Flat-fielded signal at `(x, y)`.
    pub fn signal(&self, x: usize, y: usize) -> f64 {
        let shift = self.tilt * (y as f64 - self.center_row);
        let sky: f64 = self
            .sky_lines
            .iter()
            .map(|&(c, a)| {
                let d = x as f64 - c - shift;
                a * (-0.5 * d * d).exp()
            })
            .sum();

        let center = self.trace(x);
        let source = if self.source_sigma > 0.0 {
            let d = (y as f64 - center) / self.source_sigma;
            self.source_amplitude * (-0.5 * d * d).exp()
        } else if y as f64 == center.round() {
            self.source_amplitude
        } else {
            0.0
        };

        self.background + sky + source
    }

    /// Catalog entries for every sky line.
    pub fn catalog_lines(&self) -> Vec<(f64, f64)> {
        self.sky_lines
            .iter()
            .map(|&(c, a)| (column_wavelength(c), a))
            .collect()
    }

    pub fn input(&self) -> OrderInput {
        let (w, h) = (self.width, self.height);
        OrderInput {
            order_num: self.order_num,
            obj_cutout: Image::from_fn(w, h, |x, y| self.signal(x, y)),
            flat_cutout: Image::new_filled(w, h, self.flat_level),
            on_order_mask: Mask::new_filled(w, h, true),
            off_order_mask: Mask::new_filled(w, h, false),
            avg_trace: (0..w).map(|x| self.trace(x)).collect(),
            padding: self.padding,
            bot_meas: self.bot_meas,
            integration_time: self.integration_time,
            wavelength_scale_calc: (0..w).map(|x| column_wavelength(x as f64)).collect(),
        }
    }

    pub fn build(&self) -> Order {
        Order::new(self.input())
    }
}
