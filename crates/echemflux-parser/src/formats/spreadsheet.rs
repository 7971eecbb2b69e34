use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};

use crate::errors::ParserError;
use crate::model::RawTable;
use crate::registry::TableReader;

use super::parse_optional_f64;

/// Excel workbooks (`.xlsx`, `.xls`). Only the first worksheet is read; its
/// first used row holds the headers.
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxReader;

impl XlsxReader {
    const NAME: &'static str = "XLSX";
}

impl TableReader for XlsxReader {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xls"]
    }

    fn read(&self, content: &[u8]) -> Result<RawTable, ParserError> {
        let workbook_error = |source| ParserError::Workbook {
            reader: Self::NAME,
            source,
        };

        let mut workbook =
            open_workbook_auto_from_rs(Cursor::new(content)).map_err(workbook_error)?;
        match workbook.worksheet_range_at(0) {
            Some(range) => read_range(Self::NAME, &range.map_err(workbook_error)?),
            None => Ok(RawTable::default()),
        }
    }
}

fn read_range(reader: &'static str, range: &Range<Data>) -> Result<RawTable, ParserError> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(RawTable::default());
    };

    let mut headers: Vec<String> = header
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    while headers.last().is_some_and(|h| h.is_empty()) {
        headers.pop();
    }
    let width = headers.len();

    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); width];

    for (row_idx, row) in rows.enumerate() {
        let line_index = row_idx + 2;

        if let Some(extra) = row.iter().skip(width).find(|cell| !is_blank(cell)) {
            return Err(ParserError::DataRow {
                reader,
                line_index,
                message: format!("found value '{extra}' beyond the {width} header columns"),
            });
        }

        for (idx, column) in columns.iter_mut().enumerate() {
            let value = match row.get(idx) {
                Some(cell) => cell_value(reader, cell, line_index, &headers[idx])?,
                None => None,
            };
            column.push(value);
        }
    }

    Ok(RawTable::new(headers, columns))
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

// Formula errors (`#DIV/0!`, `#N/A`) are treated as missing samples.
fn cell_value(
    reader: &'static str,
    cell: &Data,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    match cell {
        Data::Empty | Data::Error(_) => Ok(None),
        Data::Float(value) => Ok((!value.is_nan()).then_some(*value)),
        Data::Int(value) => Ok(Some(*value as f64)),
        Data::String(text) => parse_optional_f64(reader, text, line_index, column),
        other => Err(ParserError::DataRow {
            reader,
            line_index,
            message: format!("column '{column}' holds non-numeric cell '{other}'"),
        }),
    }
}
