use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Structured form of one raw column header such as `"Potential /mV"`.
///
/// `multiplier` is `None` when the unit is not present in the unit table used
/// for parsing; such a column is carried through unscaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderDescriptor {
    pub title: String,
    pub unit: String,
    pub multiplier: Option<f64>,
}

impl HeaderDescriptor {
    pub fn new(title: impl Into<String>, unit: impl Into<String>, multiplier: Option<f64>) -> Self {
        Self {
            title: title.into(),
            unit: unit.into(),
            multiplier,
        }
    }

    pub fn is_convertible(&self) -> bool {
        self.multiplier.is_some()
    }
}

impl fmt::Display for HeaderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.title, self.unit)
    }
}

/// Numeric table as exported by the instrument, column-major.
///
/// Blank and `NaN` cells are `None`. Every column has `height()` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub columns: Vec<Vec<Option<f64>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, columns: Vec<Vec<Option<f64>>>) -> Self {
        Self { headers, columns }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn column(&self, index: usize) -> Option<&[Option<f64>]> {
        self.columns.get(index).map(Vec::as_slice)
    }
}

/// Result of attempting to load an instrument export from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(RawTable),
    Empty,
    UnsupportedFormat { extension: String },
    NotFound { path: PathBuf },
}

impl LoadOutcome {
    pub fn status_code(&self) -> u16 {
        match self {
            LoadOutcome::Loaded(_) => 200,
            LoadOutcome::Empty => 204,
            LoadOutcome::UnsupportedFormat { .. } => 400,
            LoadOutcome::NotFound { .. } => 404,
        }
    }

    pub fn status_message(&self) -> String {
        match self {
            LoadOutcome::Loaded(_) => "data loaded successfully".to_string(),
            LoadOutcome::Empty => "file is empty".to_string(),
            LoadOutcome::UnsupportedFormat { extension } if extension.is_empty() => {
                "file has no extension".to_string()
            }
            LoadOutcome::UnsupportedFormat { extension } => {
                format!("file format '.{extension}' is not supported")
            }
            LoadOutcome::NotFound { path } => format!("file {} was not found", path.display()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    pub fn into_table(self) -> Option<RawTable> {
        match self {
            LoadOutcome::Loaded(table) => Some(table),
            _ => None,
        }
    }
}
