use crate::errors::ParserError;
use crate::model::HeaderDescriptor;
use crate::units::UnitTable;

const UNIT_SEPARATOR: &str = " /";

/// Removes the `.N` style suffix instruments and spreadsheet tools append to
/// repeated column names (`"Time /s.1"` -> `"Time /s"`).
///
/// Only a `.` after the last unit separator starts a suffix, so titles such as
/// `"Ewe vs. Ref /V"` keep their text.
pub fn strip_instrument_suffix(raw: &str) -> &str {
    let Some(separator) = raw.rfind(UNIT_SEPARATOR) else {
        return raw;
    };
    let unit_start = separator + UNIT_SEPARATOR.len();
    match raw[unit_start..].find('.') {
        Some(dot) => &raw[..unit_start + dot],
        None => raw,
    }
}

/// Parses a single header. Errors report column 0; use [`parse_headers`] for a
/// full header row so errors carry the real column position.
pub fn parse_header(raw: &str, units: &UnitTable) -> Result<HeaderDescriptor, ParserError> {
    parse_header_at(0, raw, units)
}

/// Parses a header row. The output is index-aligned with `raw`.
pub fn parse_headers<S: AsRef<str>>(
    raw: &[S],
    units: &UnitTable,
) -> Result<Vec<HeaderDescriptor>, ParserError> {
    raw.iter()
        .enumerate()
        .map(|(idx, header)| parse_header_at(idx, header.as_ref(), units))
        .collect()
}

fn parse_header_at(
    column_index: usize,
    raw: &str,
    units: &UnitTable,
) -> Result<HeaderDescriptor, ParserError> {
    let stripped = strip_instrument_suffix(raw.trim());
    let (title, unit) =
        stripped
            .rsplit_once(UNIT_SEPARATOR)
            .ok_or_else(|| ParserError::MalformedHeader {
                column_index,
                header: raw.to_string(),
            })?;

    let title = title.trim();
    let unit = unit.trim();
    Ok(HeaderDescriptor::new(title, unit, units.multiplier(unit)))
}
