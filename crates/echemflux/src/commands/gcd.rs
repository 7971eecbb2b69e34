use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use echemflux_core::calculator::GcdReport;
use echemflux_core::outputs::{write_gcd_report, DEFAULT_DETAIL_ROWS};
use echemflux_core::pipelines::{run_gcd, GcdOutcome};
use echemflux_core::{ExperimentSpec, ExperimentSpecConfig};
use echemflux_parser::UnitTable;
use tracing::{info, warn};

use super::{file_stem, load_export};

#[derive(clap::Args, Debug)]
pub struct GcdArgs {
    /// Instrument export (.csv, .tsv, .txt, .xlsx or .xls)
    #[arg(short, long)]
    input: PathBuf,

    /// TOML file holding the experiment specification
    #[arg(long, conflicts_with_all = ["level_number", "level_currents", "level_times", "material_mass"])]
    spec: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true, required_unless_present = "spec")]
    level_number: Option<i64>,

    /// Nominal current of each level in amperes, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required_unless_present = "spec")]
    level_currents: Vec<f64>,

    /// Nominal duration of each level in seconds, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required_unless_present = "spec")]
    level_times: Vec<f64>,

    /// Active material mass in grams
    #[arg(long, allow_negative_numbers = true, required_unless_present = "spec")]
    material_mass: Option<f64>,

    #[arg(long)]
    cycle_separated: bool,

    #[arg(long)]
    level_separated: bool,

    /// Directory receiving the summary and detail files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Maximum number of detail rows written per level
    #[arg(long, default_value_t = DEFAULT_DETAIL_ROWS)]
    detail_rows: usize,
}

impl GcdArgs {
    fn experiment_spec(&self) -> Result<ExperimentSpec> {
        if let Some(path) = &self.spec {
            let config = ExperimentSpecConfig::from_path(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            return ExperimentSpec::try_from(config)
                .with_context(|| format!("invalid experiment specification in {}", path.display()));
        }

        let level_number = self
            .level_number
            .context("--level-number is required without --spec")?;
        let material_mass = self
            .material_mass
            .context("--material-mass is required without --spec")?;

        ExperimentSpec::new(
            level_number,
            self.level_currents.clone(),
            self.level_times.clone(),
            material_mass,
            self.cycle_separated,
            self.level_separated,
        )
        .context("invalid experiment specification")
    }
}

pub fn handle_gcd_command(args: GcdArgs) -> Result<()> {
    let spec = args.experiment_spec()?;
    let Some(raw) = load_export(&args.input)? else {
        return Ok(());
    };

    let run = run_gcd(&raw, &spec, UnitTable::time_voltage())
        .with_context(|| format!("galvanostatic analysis of {} failed", args.input.display()))?;

    let report = match &run.outcome {
        GcdOutcome::Computed(report) => report,
        GcdOutcome::UnsupportedLayout => {
            warn!(
                path = %args.input.display(),
                "only exports separated by cycle and level can be analyzed"
            );
            return Ok(());
        }
    };

    println!("{}", summary_table(report));

    let paths = write_gcd_report(
        &args.out_dir,
        &file_stem(&args.input),
        report,
        args.detail_rows,
    )
    .with_context(|| format!("failed to write report to {}", args.out_dir.display()))?;

    info!(
        summary = %paths.summary_csv.display(),
        details = %paths.details_csv.display(),
        "report written"
    );
    Ok(())
}

fn summary_table(report: &GcdReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Level",
        "Cycle",
        "Step",
        "Current (A)",
        "Time (s)",
        "Capacity (mAh/g)",
        "Energy (Wh/kg)",
        "Power (W/kg)",
    ]);

    for summary in &report.summaries {
        table.add_row(vec![
            summary.id.to_string(),
            summary.cycle_index.to_string(),
            summary.level_index.to_string(),
            format!("{:.6}", summary.final_current),
            format!("{:.1}", summary.final_time),
            format!("{:.3}", summary.final_specific_capacity),
            format!("{:.3}", summary.final_energy_density),
            format!("{:.3}", summary.final_power_density),
        ]);
    }
    table
}
