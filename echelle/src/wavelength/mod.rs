//! Sky-line identification against a reference emission-line catalog.

mod catalog;
mod line_id;
mod synth;

pub use catalog::{CatalogError, CatalogFile, CatalogSource, LineCatalog, get_oh_lines};
pub use line_id::line_id;
pub use synth::{synthesize_sky, wavelength_to_column};
