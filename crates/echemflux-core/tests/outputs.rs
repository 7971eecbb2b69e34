use std::fs;

use echemflux_core::calculator::compute_metrics;
use echemflux_core::conversion::{Channel, NormalizedTable};
use echemflux_core::outputs::{subsample, write_gcd_report, write_normalized_csv};
use echemflux_core::unification::{LevelOccurrence, UnifiedTable};
use echemflux_core::{ExperimentSpec, PipelineError};
use polars::prelude::*;
use tempfile::tempdir;

fn ramp(rows: usize) -> DataFrame {
    let values: Vec<f64> = (0..rows).map(|i| i as f64).collect();
    df!("x" => values).unwrap()
}

#[test]
fn subsample_keeps_short_frames_intact() {
    let df = ramp(5);
    assert!(subsample(&df, 200).unwrap().equals(&df));
}

#[test]
fn subsample_strides_from_first_row() -> PolarsResult<()> {
    let sampled = subsample(&ramp(10), 4).unwrap();
    // stride = ceil(10 / 4) = 3
    let x = sampled.column("x")?.f64()?;
    let kept: Vec<f64> = x.into_no_null_iter().collect();
    assert_eq!(kept, [0.0, 3.0, 6.0, 9.0]);
    Ok(())
}

#[test]
fn subsample_never_exceeds_cap() {
    for rows in [201, 399, 400, 401, 1000] {
        assert!(subsample(&ramp(rows), 200).unwrap().height() <= 200);
    }
}

#[test]
fn subsample_rejects_zero_cap() {
    let err = subsample(&ramp(3), 0).unwrap_err();
    assert!(matches!(err, PipelineError::Report(_)));
}

fn sample_report() -> echemflux_core::calculator::GcdReport {
    let spec = ExperimentSpec::new(2, vec![0.01, -0.01], vec![1.0, 1.0], 0.01, true, true).unwrap();
    let time: Vec<Option<f64>> = (1..=50).map(|t| Some(t as f64)).collect();
    let rising: Vec<Option<f64>> = (0..50).map(|i| Some(3.0 + i as f64 * 0.01)).collect();
    let falling: Vec<Option<f64>> = rising.iter().rev().copied().collect();
    let unified = UnifiedTable {
        occurrences: vec![
            LevelOccurrence {
                index: 0,
                time: time.clone(),
                current: 0.01,
                potential: rising,
            },
            LevelOccurrence {
                index: 1,
                time,
                current: -0.01,
                potential: falling,
            },
        ],
    };
    compute_metrics(&unified, &spec).unwrap()
}

#[test]
fn gcd_report_writes_summary_and_details() {
    let dir = tempdir().unwrap();
    let report = sample_report();
    let paths = write_gcd_report(dir.path(), "run", &report, 10).expect("write report");

    assert_eq!(paths.summary_csv, dir.path().join("run_summary.csv"));
    let summary = fs::read_to_string(&paths.summary_csv).unwrap();
    let mut lines = summary.lines();
    assert!(lines.next().unwrap().starts_with("id,cycle_index,level_index"));
    assert_eq!(lines.count(), 2);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&paths.summary_json).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[1]["level_index"], 2);

    let details = fs::read_to_string(&paths.details_csv).unwrap();
    // header + 10 sampled rows per level
    assert_eq!(details.lines().count(), 21);
}

#[test]
fn gcd_report_creates_missing_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested").join("out");
    let paths = write_gcd_report(&nested, "run", &sample_report(), 200).unwrap();
    assert!(paths.details_csv.exists());
}

#[test]
fn normalized_csv_keeps_repeated_titles_and_blanks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("normalized.csv");
    let table = NormalizedTable::new(vec![
        Channel {
            title: "Time".into(),
            values: vec![Some(0.5), Some(1.0)],
        },
        Channel {
            title: "Time".into(),
            values: vec![Some(0.25), None],
        },
    ]);
    write_normalized_csv(&path, &table).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, ["Time,Time", "0.5,0.25", "1,"]);
}
