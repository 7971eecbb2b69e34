mod common;
mod delimited;
mod spreadsheet;

pub use delimited::{CsvReader, TsvReader};
pub use spreadsheet::XlsxReader;

pub(crate) use common::{decode_utf8, parse_optional_f64, read_delimited};
