use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reference emission lines sorted by wavelength.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineCatalog {
    wavelengths: Vec<f64>,
    intensities: Vec<f64>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read line catalog '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed line catalog '{path}' at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Line catalog '{path}' has no lines")]
    Empty { path: PathBuf },
}

/// Something that can provide a line catalog on demand.
///
/// Sources are shared across worker threads by parallel reduction.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> Result<LineCatalog, CatalogError>;
}

/// A catalog read from a text file every time it is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    path: PathBuf,
}

impl CatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for CatalogFile {
    fn load(&self) -> Result<LineCatalog, CatalogError> {
        get_oh_lines(&self.path)
    }
}

impl CatalogSource for LineCatalog {
    fn load(&self) -> Result<LineCatalog, CatalogError> {
        Ok(self.clone())
    }
}

/// Read an OH sky-line catalog.
///
/// Each data row holds a wavelength and an intensity separated by
/// whitespace; further columns are ignored. Blank lines and lines starting
/// with `#` are skipped.
pub fn get_oh_lines(path: impl AsRef<Path>) -> Result<LineCatalog, CatalogError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = LineCatalog::parse(&text, path)?;
    tracing::debug!(path = %path.display(), lines = catalog.len(), "line catalog loaded");
    Ok(catalog)
}

impl LineCatalog {
    /// Build a catalog from parallel slices. Lines are sorted by wavelength.
    pub fn new(wavelengths: Vec<f64>, intensities: Vec<f64>) -> Self {
        assert_eq!(
            wavelengths.len(),
            intensities.len(),
            "wavelengths and intensities must have the same length"
        );
        let mut pairs: Vec<(f64, f64)> = wavelengths.into_iter().zip(intensities).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (wavelengths, intensities) = pairs.into_iter().unzip();
        Self {
            wavelengths,
            intensities,
        }
    }

    fn parse(text: &str, path: &Path) -> Result<Self, CatalogError> {
        let parse_error = |line: usize, reason: String| CatalogError::Parse {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut wavelengths = Vec::new();
        let mut intensities = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(wl), Some(intensity)) = (fields.next(), fields.next()) else {
                return Err(parse_error(line_no, "expected two columns".to_string()));
            };
            let wl: f64 = wl
                .parse()
                .map_err(|e| parse_error(line_no, format!("wavelength '{wl}': {e}")))?;
            let intensity: f64 = intensity
                .parse()
                .map_err(|e| parse_error(line_no, format!("intensity '{intensity}': {e}")))?;
            if !wl.is_finite() || !intensity.is_finite() {
                return Err(parse_error(line_no, "non-finite value".to_string()));
            }

            wavelengths.push(wl);
            intensities.push(intensity);
        }

        if wavelengths.is_empty() {
            return Err(CatalogError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self::new(wavelengths, intensities))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    #[inline]
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    #[inline]
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }
}
