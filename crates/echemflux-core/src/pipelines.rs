use echemflux_parser::{parse_headers, RawTable, UnitTable};
use tracing::info;

use crate::calculator::{compute_metrics, GcdReport};
use crate::conversion::{normalize, ConversionReport, UnitWarning};
use crate::error::Result;
use crate::experiment::ExperimentSpec;
use crate::unification::unify;

#[derive(Debug, Clone)]
pub enum GcdOutcome {
    Computed(GcdReport),
    /// The export does not separate cycles and levels into column groups.
    UnsupportedLayout,
}

#[derive(Debug, Clone)]
pub struct GcdRun {
    pub warnings: Vec<UnitWarning>,
    pub outcome: GcdOutcome,
}

impl GcdRun {
    pub fn report(&self) -> Option<&GcdReport> {
        match &self.outcome {
            GcdOutcome::Computed(report) => Some(report),
            GcdOutcome::UnsupportedLayout => None,
        }
    }
}

/// Galvanostatic charge/discharge analysis: header parsing, SI normalization,
/// level reconstruction and metrics.
pub fn run_gcd(raw: &RawTable, spec: &ExperimentSpec, units: &UnitTable) -> Result<GcdRun> {
    info!(
        columns = raw.width(),
        rows = raw.height(),
        units = units.name(),
        "starting galvanostatic analysis"
    );

    let ConversionReport { table, warnings } = normalize_with(raw, units)?;
    let unified = unify(&table, spec)?;

    if unified.is_empty() && !spec.supports_unification() {
        info!("export layout is unsupported; skipping metrics");
        return Ok(GcdRun {
            warnings,
            outcome: GcdOutcome::UnsupportedLayout,
        });
    }

    let report = compute_metrics(&unified, spec)?;
    info!(
        levels = report.summaries.len(),
        unit_warnings = warnings.len(),
        "galvanostatic analysis complete"
    );

    Ok(GcdRun {
        warnings,
        outcome: GcdOutcome::Computed(report),
    })
}

/// Cyclic voltammetry exports only need SI normalization.
pub fn run_cv(raw: &RawTable, units: &UnitTable) -> Result<ConversionReport> {
    info!(
        columns = raw.width(),
        rows = raw.height(),
        units = units.name(),
        "normalizing cyclic voltammetry export"
    );
    normalize_with(raw, units)
}

fn normalize_with(raw: &RawTable, units: &UnitTable) -> Result<ConversionReport> {
    let headers = parse_headers(&raw.headers, units)?;
    normalize(raw, &headers)
}
