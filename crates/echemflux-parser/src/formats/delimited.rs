use crate::errors::ParserError;
use crate::model::RawTable;
use crate::registry::TableReader;

use super::{decode_utf8, read_delimited};

/// Comma-separated exports (`.csv`).
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReader;

impl CsvReader {
    const NAME: &'static str = "CSV";
}

impl TableReader for CsvReader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn read(&self, content: &[u8]) -> Result<RawTable, ParserError> {
        read_delimited(Self::NAME, b',', decode_utf8(Self::NAME, content)?)
    }
}

/// Tab-separated exports. Most potentiostat software writes these as `.txt`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TsvReader;

impl TsvReader {
    const NAME: &'static str = "TSV";
}

impl TableReader for TsvReader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tsv", "txt"]
    }

    fn read(&self, content: &[u8]) -> Result<RawTable, ParserError> {
        read_delimited(Self::NAME, b'\t', decode_utf8(Self::NAME, content)?)
    }
}
