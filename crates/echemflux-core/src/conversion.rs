use std::fmt;

use echemflux_parser::{HeaderDescriptor, RawTable};
use serde::Serialize;
use tracing::warn;

use crate::error::{PipelineError, Result};

/// One measured channel after SI normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub title: String,
    pub values: Vec<Option<f64>>,
}

/// SI-normalized table. Channels are addressed by position only; several
/// channels may share a title (e.g. one `Time` column per level).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    channels: Vec<Channel>,
}

impl NormalizedTable {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn titles(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.title.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.channels.len()
    }

    pub fn height(&self) -> usize {
        self.channels.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// A column whose unit was not found in the unit table and was left unscaled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitWarning {
    pub column_index: usize,
    pub title: String,
    pub unit: String,
}

impl fmt::Display for UnitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column {} ('{}') has unrecognized unit '{}'; values left unscaled",
            self.column_index, self.title, self.unit
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionReport {
    pub table: NormalizedTable,
    pub warnings: Vec<UnitWarning>,
}

/// Scales every raw column by its header's SI multiplier and renames it to
/// the header title. `headers` must be index-aligned with `raw.columns`.
pub fn normalize(raw: &RawTable, headers: &[HeaderDescriptor]) -> Result<ConversionReport> {
    if headers.len() != raw.width() {
        return Err(PipelineError::ColumnCountMismatch {
            headers: headers.len(),
            columns: raw.width(),
        });
    }

    let height = raw.height();
    let mut channels = Vec::with_capacity(raw.width());
    let mut warnings = Vec::new();

    for (column_index, (values, header)) in raw.columns.iter().zip(headers).enumerate() {
        if values.len() != height {
            return Err(PipelineError::ColumnLengthMismatch {
                column_index,
                expected: height,
                found: values.len(),
            });
        }

        let values = match header.multiplier {
            Some(multiplier) => values.iter().map(|v| v.map(|x| x * multiplier)).collect(),
            None => {
                let warning = UnitWarning {
                    column_index,
                    title: header.title.clone(),
                    unit: header.unit.clone(),
                };
                warn!(
                    column_index,
                    title = %header.title,
                    unit = %header.unit,
                    "no matching unit found, column left unscaled"
                );
                warnings.push(warning);
                values.clone()
            }
        };

        channels.push(Channel {
            title: header.title.clone(),
            values,
        });
    }

    Ok(ConversionReport {
        table: NormalizedTable::new(channels),
        warnings,
    })
}
