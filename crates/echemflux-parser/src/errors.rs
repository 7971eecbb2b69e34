use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("column {column_index} header '{header}' is malformed: expected '<Title> /<Unit>'")]
    MalformedHeader { column_index: usize, header: String },

    #[error("{reader} CSV error: {source}")]
    Csv {
        reader: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{reader} content is not valid UTF-8: {source}")]
    Encoding {
        reader: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("{reader} workbook error: {source}")]
    Workbook {
        reader: &'static str,
        #[source]
        source: calamine::Error,
    },

    #[error("{reader} data row {line_index} invalid: {message}")]
    DataRow {
        reader: &'static str,
        line_index: usize,
        message: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParserError {
    /// Zero-based column the error refers to, when it refers to one.
    pub fn column_index(&self) -> Option<usize> {
        match self {
            ParserError::MalformedHeader { column_index, .. } => Some(*column_index),
            _ => None,
        }
    }
}
