use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::errors::ParserError;
use crate::formats::{CsvReader, TsvReader, XlsxReader};
use crate::model::{LoadOutcome, RawTable};

pub trait TableReader {
    fn name(&self) -> &'static str;
    fn extensions(&self) -> &'static [&'static str];
    fn read(&self, content: &[u8]) -> Result<RawTable, ParserError>;
}

static CSV_READER: CsvReader = CsvReader;
static TSV_READER: TsvReader = TsvReader;
static XLSX_READER: XlsxReader = XlsxReader;

fn default_readers() -> [&'static dyn TableReader; 3] {
    [&CSV_READER, &TSV_READER, &XLSX_READER]
}

/// Picks the reader registered for a file extension (without the dot,
/// case-insensitive).
pub fn reader_for_extension(extension: &str) -> Option<&'static dyn TableReader> {
    let extension = extension.to_ascii_lowercase();
    default_readers()
        .into_iter()
        .find(|reader| reader.extensions().contains(&extension.as_str()))
}

/// Loads an instrument export from disk.
///
/// Unsupported extensions, missing files and tables without rows or columns
/// are reported through [`LoadOutcome`]; only unreadable files and malformed
/// cell contents are errors.
pub fn load_table(path: impl AsRef<Path>) -> Result<LoadOutcome, ParserError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let Some(reader) = reader_for_extension(&extension) else {
        return Ok(LoadOutcome::UnsupportedFormat { extension });
    };

    let content = match fs::read(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(LoadOutcome::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ParserError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    parse_table(reader, &content)
}

/// Parses an in-memory export with the given reader, classifying tables
/// without rows or columns as [`LoadOutcome::Empty`].
pub fn parse_table(
    reader: &dyn TableReader,
    content: &[u8],
) -> Result<LoadOutcome, ParserError> {
    let table = reader.read(content)?;
    debug!(
        reader = reader.name(),
        columns = table.width(),
        rows = table.height(),
        "read instrument export"
    );

    if table.is_empty() {
        Ok(LoadOutcome::Empty)
    } else {
        Ok(LoadOutcome::Loaded(table))
    }
}
