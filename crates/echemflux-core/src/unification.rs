// crates/echemflux-core/src/unification.rs

use polars::prelude::*;
use tracing::{debug, warn};

use crate::conversion::NormalizedTable;
use crate::error::{PipelineError, Result};
use crate::experiment::ExperimentSpec;

pub const TIME_COLUMN: &str = "time_s";
pub const CURRENT_COLUMN: &str = "current_a";
pub const POTENTIAL_COLUMN: &str = "potential_v";

/// One pass through one level of one cycle.
///
/// `current` is the nominal current declared for the level, not a measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelOccurrence {
    pub index: usize,
    pub time: Vec<Option<f64>>,
    pub current: f64,
    pub potential: Vec<Option<f64>>,
}

impl LevelOccurrence {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let rows = self.time.len();
        DataFrame::new(vec![
            Series::new(TIME_COLUMN.into(), self.time.clone()).into(),
            Series::new(CURRENT_COLUMN.into(), vec![self.current; rows]).into(),
            Series::new(POTENTIAL_COLUMN.into(), self.potential.clone()).into(),
        ])
    }
}

/// Level occurrences in the order their column pairs appear in the export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedTable {
    pub occurrences: Vec<LevelOccurrence>,
}

impl UnifiedTable {
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LevelOccurrence> {
        self.occurrences.iter()
    }
}

/// Rebuilds level occurrences from consecutive (time, potential) channel pairs.
///
/// Exports that do not separate both cycles and levels into their own columns
/// are not supported and produce an empty table.
pub fn unify(table: &NormalizedTable, spec: &ExperimentSpec) -> Result<UnifiedTable> {
    if !spec.supports_unification() {
        warn!(
            cycle_separated = spec.cycle_separated(),
            level_separated = spec.level_separated(),
            "raw layout is not separated by cycle and level; nothing to unify"
        );
        return Ok(UnifiedTable::default());
    }

    if table.width() % 2 != 0 {
        return Err(PipelineError::UnpairedColumn {
            column_index: table.width() - 1,
        });
    }

    let occurrences: Vec<LevelOccurrence> = table
        .channels()
        .chunks_exact(2)
        .enumerate()
        .map(|(index, pair)| LevelOccurrence {
            index,
            time: pair[0].values.clone(),
            current: spec.nominal_current(index),
            potential: pair[1].values.clone(),
        })
        .collect();

    debug!(
        occurrences = occurrences.len(),
        rows = table.height(),
        "unified level occurrences"
    );

    Ok(UnifiedTable { occurrences })
}
