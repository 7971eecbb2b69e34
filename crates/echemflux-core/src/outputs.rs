use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::calculator::{stack_frames, GcdReport};
use crate::conversion::NormalizedTable;
use crate::error::{PipelineError, Result};

/// Default cap on detail rows written per level.
pub const DEFAULT_DETAIL_ROWS: usize = 200;

/// Files written by [`write_gcd_report`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub summary_csv: PathBuf,
    pub summary_json: PathBuf,
    pub details_csv: PathBuf,
}

/// Keeps every `ceil(height / max_rows)`-th row, starting with the first.
pub fn subsample(df: &DataFrame, max_rows: usize) -> Result<DataFrame> {
    if max_rows == 0 {
        return Err(PipelineError::Report(
            "detail row cap must be at least 1".to_string(),
        ));
    }

    let height = df.height();
    if height <= max_rows {
        return Ok(df.clone());
    }

    let stride = height.div_ceil(max_rows);
    let indices: Vec<IdxSize> = (0..height).step_by(stride).map(|i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), indices);
    Ok(df.take(&idx)?)
}

/// Writes the summary (CSV and JSON) and the subsampled per-level detail
/// series of a galvanostatic run into `dir`, named after `stem`.
pub fn write_gcd_report(
    dir: &Path,
    stem: &str,
    report: &GcdReport,
    max_detail_rows: usize,
) -> Result<ReportPaths> {
    fs::create_dir_all(dir)?;

    let paths = ReportPaths {
        summary_csv: dir.join(format!("{stem}_summary.csv")),
        summary_json: dir.join(format!("{stem}_summary.json")),
        details_csv: dir.join(format!("{stem}_details.csv")),
    };

    let mut summary = report.summary_frame()?;
    write_frame_csv(&paths.summary_csv, &mut summary)?;

    let json_file = File::create(&paths.summary_json)?;
    serde_json::to_writer_pretty(json_file, &report.summaries)?;

    let mut sampled = Vec::with_capacity(report.levels.len());
    for level in &report.levels {
        let frame = subsample(&level.frame, max_detail_rows)?;
        sampled.push(level.tag(&frame)?);
    }
    let mut details = stack_frames(sampled)?;
    write_frame_csv(&paths.details_csv, &mut details)?;

    info!(
        levels = report.summaries.len(),
        detail_rows = details.height(),
        summary = %paths.summary_csv.display(),
        "wrote galvanostatic report"
    );

    Ok(paths)
}

fn write_frame_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// Writes a normalized table as CSV. Titles are written as-is, so repeated
/// titles stay repeated.
pub fn write_normalized_csv(path: &Path, table: &NormalizedTable) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.channels().iter().map(|c| c.title.as_str()))?;

    for row in 0..table.height() {
        writer.write_record(table.channels().iter().map(|c| {
            c.values
                .get(row)
                .copied()
                .flatten()
                .map(|v| v.to_string())
                .unwrap_or_default()
        }))?;
    }

    writer.flush()?;
    info!(
        path = %path.display(),
        columns = table.width(),
        rows = table.height(),
        "wrote normalized table"
    );
    Ok(())
}
