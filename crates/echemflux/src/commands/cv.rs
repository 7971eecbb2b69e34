use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use echemflux_core::outputs::write_normalized_csv;
use echemflux_core::pipelines::run_cv;
use echemflux_parser::UnitTable;
use tracing::{info, warn};

use super::{file_stem, load_export};

#[derive(clap::Args, Debug)]
pub struct CvArgs {
    /// Instrument export (.csv, .tsv, .txt, .xlsx or .xls)
    #[arg(short, long)]
    input: PathBuf,

    /// Destination CSV; defaults to `<input stem>_normalized.csv` next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn handle_cv_command(args: CvArgs) -> Result<()> {
    let Some(raw) = load_export(&args.input)? else {
        return Ok(());
    };

    let report = run_cv(&raw, UnitTable::amplitude())
        .with_context(|| format!("normalization of {} failed", args.input.display()))?;

    if !report.warnings.is_empty() {
        warn!(
            unscaled_columns = report.warnings.len(),
            "some columns were left in their original units"
        );
    }

    let output = args.output.unwrap_or_else(|| {
        args.input
            .with_file_name(format!("{}_normalized.csv", file_stem(&args.input)))
    });
    write_normalized_csv(&output, &report.table)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Column", "Title", "Rows"]);
    for (index, channel) in report.table.channels().iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            channel.title.clone(),
            channel.values.iter().flatten().count().to_string(),
        ]);
    }
    println!("{table}");

    info!(output = %output.display(), "normalized export written");
    Ok(())
}
