pub mod cv;
pub mod gcd;

use std::path::Path;

use anyhow::{Context, Result};
use echemflux_parser::{load_table, LoadOutcome, RawTable};
use tracing::warn;

/// Loads an export, returning `None` (after logging why) when there is
/// nothing to process.
pub(crate) fn load_export(path: &Path) -> Result<Option<RawTable>> {
    let outcome = load_table(path)
        .with_context(|| format!("failed to load export {}", path.display()))?;

    match outcome {
        LoadOutcome::Loaded(table) => Ok(Some(table)),
        other => {
            warn!(
                path = %path.display(),
                status = other.status_code(),
                message = %other.status_message(),
                "export not processed"
            );
            Ok(None)
        }
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("export")
        .to_string()
}
