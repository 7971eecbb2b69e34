use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::experiment::ExperimentSpec;
use crate::unification::{UnifiedTable, CURRENT_COLUMN, POTENTIAL_COLUMN, TIME_COLUMN};

const SECONDS_PER_HOUR: f64 = 3600.0;
const MILLIAMPS_PER_AMP: f64 = 1000.0;

pub const SPECIFIC_CAPACITY_COLUMN: &str = "specific_capacity_mah_g";
pub const ENERGY_DENSITY_COLUMN: &str = "energy_density_wh_kg";
pub const POWER_DENSITY_COLUMN: &str = "power_density_w_kg";

/// Derived series for one level occurrence, after non-finite rows were dropped.
#[derive(Debug, Clone)]
pub struct LevelMetrics {
    pub id: usize,
    pub cycle_index: usize,
    pub level_index: usize,
    pub frame: DataFrame,
}

impl LevelMetrics {
    /// `frame` prefixed with `id`, `cycle_index` and `level_index` columns.
    pub fn tagged_frame(&self) -> PolarsResult<DataFrame> {
        self.tag(&self.frame)
    }

    pub(crate) fn tag(&self, frame: &DataFrame) -> PolarsResult<DataFrame> {
        let rows = frame.height();
        let mut tagged = DataFrame::new(vec![
            Series::new("id".into(), vec![self.id as u32; rows]).into(),
            Series::new("cycle_index".into(), vec![self.cycle_index as u32; rows]).into(),
            Series::new("level_index".into(), vec![self.level_index as u32; rows]).into(),
        ])?;
        tagged.hstack_mut(frame.get_columns())?;
        Ok(tagged)
    }
}

/// Final values of one level occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub id: usize,
    pub cycle_index: usize,
    pub level_index: usize,
    pub final_current: f64,
    pub final_time: f64,
    pub final_specific_capacity: f64,
    pub final_energy_density: f64,
    pub final_power_density: f64,
}

/// Per-level series and summaries, index-aligned with the unified occurrences.
#[derive(Debug, Clone, Default)]
pub struct GcdReport {
    pub levels: Vec<LevelMetrics>,
    pub summaries: Vec<LevelSummary>,
}

impl GcdReport {
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn summary_frame(&self) -> PolarsResult<DataFrame> {
        let s = &self.summaries;
        DataFrame::new(vec![
            Series::new("id".into(), s.iter().map(|r| r.id as u32).collect::<Vec<_>>()).into(),
            Series::new(
                "cycle_index".into(),
                s.iter().map(|r| r.cycle_index as u32).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "level_index".into(),
                s.iter().map(|r| r.level_index as u32).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                CURRENT_COLUMN.into(),
                s.iter().map(|r| r.final_current).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                TIME_COLUMN.into(),
                s.iter().map(|r| r.final_time).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                SPECIFIC_CAPACITY_COLUMN.into(),
                s.iter().map(|r| r.final_specific_capacity).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                ENERGY_DENSITY_COLUMN.into(),
                s.iter().map(|r| r.final_energy_density).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                POWER_DENSITY_COLUMN.into(),
                s.iter().map(|r| r.final_power_density).collect::<Vec<_>>(),
            )
            .into(),
        ])
    }

    /// All level series stacked in occurrence order (long form).
    pub fn detail_frame(&self) -> PolarsResult<DataFrame> {
        let frames = self
            .levels
            .iter()
            .map(LevelMetrics::tagged_frame)
            .collect::<PolarsResult<Vec<_>>>()?;
        stack_frames(frames)
    }
}

pub(crate) fn stack_frames(mut frames: Vec<DataFrame>) -> PolarsResult<DataFrame> {
    match frames.len() {
        0 => Ok(DataFrame::default()),
        1 => Ok(frames.remove(0)),
        _ => {
            let mut iter = frames.into_iter();
            let mut combined = iter.next().unwrap_or_default();
            for df in iter {
                combined.vstack_mut(&df)?;
            }
            Ok(combined)
        }
    }
}

/// Charge per unit mass in mAh/g. The sign of the current is discarded.
pub fn specific_capacity(time_s: f64, current_a: f64, material_mass_g: f64) -> f64 {
    ((time_s / SECONDS_PER_HOUR) * (current_a * MILLIAMPS_PER_AMP) / material_mass_g).abs()
}

/// Running trapezoidal integral of `y` over `x`, starting at 0.
///
/// The output has one entry per sample; a NaN sample poisons every later value.
pub fn cumulative_trapezoid(y: &[f64], x: &[f64]) -> Vec<f64> {
    debug_assert_eq!(y.len(), x.len());
    let len = y.len().min(x.len());
    let mut integral = Vec::with_capacity(len);
    let mut total = 0.0;
    for idx in 0..len {
        if idx > 0 {
            total += (x[idx] - x[idx - 1]) * (y[idx] + y[idx - 1]) / 2.0;
        }
        integral.push(total);
    }
    integral
}

/// Appends specific capacity, energy density and power density columns to a
/// level frame holding `time_s`, `current_a` and `potential_v`.
///
/// Energy density integrates specific capacity against potential and takes the
/// magnitude of the running integral. Rows at `time_s == 0` get a non-finite
/// power density.
pub fn apply_gcd_metrics(df: &DataFrame, material_mass: f64) -> PolarsResult<DataFrame> {
    let time = float_values(df, TIME_COLUMN)?;
    let current = float_values(df, CURRENT_COLUMN)?;
    let potential = float_values(df, POTENTIAL_COLUMN)?;

    let capacity: Vec<f64> = time
        .iter()
        .zip(&current)
        .map(|(t, i)| specific_capacity(*t, *i, material_mass))
        .collect();

    let energy: Vec<f64> = cumulative_trapezoid(&capacity, &potential)
        .into_iter()
        .map(f64::abs)
        .collect();

    let power: Vec<f64> = energy
        .iter()
        .zip(&time)
        .map(|(e, t)| e / (t / SECONDS_PER_HOUR))
        .collect();

    let mut output = df.clone();
    output.hstack_mut(&[
        Series::new(SPECIFIC_CAPACITY_COLUMN.into(), capacity).into(),
        Series::new(ENERGY_DENSITY_COLUMN.into(), energy).into(),
        Series::new(POWER_DENSITY_COLUMN.into(), power).into(),
    ])?;

    Ok(output)
}

fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    Ok(df
        .column(name)?
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Drops every row holding a null or a non-finite float in any column.
pub fn retain_finite_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    let mut keep = vec![true; df.height()];

    for column in df.get_columns() {
        match column.f64() {
            Ok(values) => {
                for (flag, value) in keep.iter_mut().zip(values.into_iter()) {
                    if !value.is_some_and(f64::is_finite) {
                        *flag = false;
                    }
                }
            }
            Err(_) => {
                let nulls = column.is_null();
                for (flag, is_null) in keep.iter_mut().zip(nulls.into_iter()) {
                    if is_null == Some(true) {
                        *flag = false;
                    }
                }
            }
        }
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    df.filter(&mask)
}

fn last_value(frame: &DataFrame, name: &str, row: usize) -> PolarsResult<f64> {
    frame.column(name)?.f64()?.get(row).ok_or_else(|| {
        PolarsError::NoData(format!("column '{name}' has no value at row {row}").into())
    })
}

fn summarize_level(level: &LevelMetrics) -> Result<LevelSummary> {
    let frame = &level.frame;
    let row = frame
        .height()
        .checked_sub(1)
        .ok_or(PipelineError::EmptyLevel {
            id: level.id,
            cycle_index: level.cycle_index,
            level_index: level.level_index,
        })?;

    Ok(LevelSummary {
        id: level.id,
        cycle_index: level.cycle_index,
        level_index: level.level_index,
        final_current: last_value(frame, CURRENT_COLUMN, row)?,
        final_time: last_value(frame, TIME_COLUMN, row)?,
        final_specific_capacity: last_value(frame, SPECIFIC_CAPACITY_COLUMN, row)?,
        final_energy_density: last_value(frame, ENERGY_DENSITY_COLUMN, row)?,
        final_power_density: last_value(frame, POWER_DENSITY_COLUMN, row)?,
    })
}

/// Computes the derived series and the summary of every level occurrence.
///
/// An empty unified table means the raw layout was unsupported and yields an
/// empty report. A level left without any finite row fails the whole run.
pub fn compute_metrics(unified: &UnifiedTable, spec: &ExperimentSpec) -> Result<GcdReport> {
    if unified.is_empty() {
        debug!("no level occurrences to compute");
        return Ok(GcdReport::default());
    }

    let mut report = GcdReport {
        levels: Vec::with_capacity(unified.len()),
        summaries: Vec::with_capacity(unified.len()),
    };

    for occurrence in unified.iter() {
        let derived = apply_gcd_metrics(&occurrence.to_frame()?, spec.material_mass())?;
        let frame = retain_finite_rows(&derived)?;

        let level = LevelMetrics {
            id: occurrence.index + 1,
            cycle_index: spec.cycle_index(occurrence.index),
            level_index: spec.level_index(occurrence.index),
            frame,
        };
        debug!(
            id = level.id,
            cycle_index = level.cycle_index,
            level_index = level.level_index,
            rows_dropped = occurrence.len() - level.frame.height(),
            "computed level metrics"
        );

        report.summaries.push(summarize_level(&level)?);
        report.levels.push(level);
    }

    Ok(report)
}
