use crate::errors::ParserError;
use crate::model::RawTable;

pub(crate) fn decode_utf8<'a>(
    reader: &'static str,
    content: &'a [u8],
) -> Result<&'a str, ParserError> {
    std::str::from_utf8(content).map_err(|source| ParserError::Encoding { reader, source })
}

pub(crate) fn read_delimited(
    reader: &'static str,
    delimiter: u8,
    content: &str,
) -> Result<RawTable, ParserError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut records = csv_reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(|source| ParserError::Csv { reader, source })?,
        None => return Ok(RawTable::default()),
    };
    let headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    let width = headers.len();

    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); width];

    for (row_idx, record) in records.enumerate() {
        let record = record.map_err(|source| ParserError::Csv { reader, source })?;
        let line_index = row_idx + 2; // header row is line 1

        if record.len() > width {
            if let Some(extra) = record.iter().skip(width).find(|v| !v.trim().is_empty()) {
                return Err(ParserError::DataRow {
                    reader,
                    line_index,
                    message: format!(
                        "found value '{}' beyond the {width} header columns",
                        extra.trim()
                    ),
                });
            }
        }

        for (idx, column) in columns.iter_mut().enumerate() {
            let value = record.get(idx).unwrap_or("");
            column.push(parse_optional_f64(reader, value, line_index, &headers[idx])?);
        }
    }

    Ok(RawTable::new(headers, columns))
}

pub(crate) fn parse_optional_f64(
    reader: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|err| ParserError::DataRow {
            reader,
            line_index,
            message: format!("failed to parse column '{column}' as float: {err}"),
        })
}
