use echemflux_core::calculator::{
    apply_gcd_metrics, compute_metrics, cumulative_trapezoid, retain_finite_rows,
    specific_capacity, ENERGY_DENSITY_COLUMN, POWER_DENSITY_COLUMN, SPECIFIC_CAPACITY_COLUMN,
};
use echemflux_core::unification::{LevelOccurrence, UnifiedTable};
use echemflux_core::{ExperimentSpec, PipelineError};
use polars::prelude::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9 * b.abs().max(1.0)
}

fn occurrence(index: usize, time: &[f64], current: f64, potential: &[f64]) -> LevelOccurrence {
    LevelOccurrence {
        index,
        time: time.iter().copied().map(Some).collect(),
        current,
        potential: potential.iter().copied().map(Some).collect(),
    }
}

#[test]
fn one_hour_at_ten_milliamps_per_ten_milligrams() {
    assert!(approx(specific_capacity(3600.0, 0.01, 0.01), 1000.0));
    assert!(approx(specific_capacity(3600.0, -0.01, 0.01), 1000.0));
}

#[test]
fn cumulative_trapezoid_starts_at_zero() {
    let integral = cumulative_trapezoid(&[1.0, 2.0, 3.0], &[0.0, 1.0, 3.0]);
    assert_eq!(integral, [0.0, 1.5, 6.5]);
    assert!(cumulative_trapezoid(&[], &[]).is_empty());
}

#[test]
fn energy_density_is_magnitude_of_running_integral() -> PolarsResult<()> {
    // Falling potential makes the raw integral negative; the magnitude is reported.
    let df = df!(
        "time_s" => &[1.0f64, 2.0, 3.0],
        "current_a" => &[0.001f64, 0.001, 0.001],
        "potential_v" => &[3.2f64, 3.1, 3.0],
    )?;
    let result = apply_gcd_metrics(&df, 0.002)?;
    let energy = result.column(ENERGY_DENSITY_COLUMN)?.f64()?;

    assert_eq!(energy.get(0), Some(0.0));
    assert!(approx(energy.get(1).unwrap(), 0.1 * 3.0 / 14.4));
    assert!(approx(energy.get(2).unwrap(), 0.8 / 14.4));
    Ok(())
}

#[test]
fn absolute_value_is_applied_after_integration() -> PolarsResult<()> {
    // Potential goes up then comes back down: the integral returns to zero
    // instead of accumulating the absolute increments.
    let df = df!(
        "time_s" => &[3600.0f64, 3600.0, 3600.0],
        "current_a" => &[0.001f64, 0.001, 0.001],
        "potential_v" => &[3.0f64, 3.5, 3.0],
    )?;
    let result = apply_gcd_metrics(&df, 1.0)?;
    let energy = result.column(ENERGY_DENSITY_COLUMN)?.f64()?;
    assert!(approx(energy.get(1).unwrap(), 0.5));
    assert!(energy.get(2).unwrap().abs() < 1e-12);
    Ok(())
}

#[test]
fn zero_time_rows_have_non_finite_power_and_are_dropped() -> PolarsResult<()> {
    let df = df!(
        "time_s" => &[0.0f64, 1.0, 2.0],
        "current_a" => &[0.001f64, 0.001, 0.001],
        "potential_v" => &[3.0f64, 3.1, 3.2],
    )?;
    let derived = apply_gcd_metrics(&df, 0.002)?;
    let power = derived.column(POWER_DENSITY_COLUMN)?.f64()?;
    assert!(power.get(0).unwrap().is_nan());

    let retained = retain_finite_rows(&derived)?;
    assert_eq!(retained.height(), 2);
    let time = retained.column("time_s")?.f64()?;
    assert_eq!(time.get(0), Some(1.0));
    Ok(())
}

#[test]
fn retain_finite_rows_drops_nulls_and_infinities() -> PolarsResult<()> {
    let df = df!(
        "a" => &[Some(1.0f64), None, Some(3.0), Some(4.0)],
        "b" => &[Some(f64::INFINITY), Some(2.0), Some(3.0), Some(4.0)],
        "c" => &[Some(1i32), Some(2), Some(3), None],
    )?;
    let retained = retain_finite_rows(&df)?;
    assert_eq!(retained.height(), 1);
    assert_eq!(retained.column("a")?.f64()?.get(0), Some(3.0));
    Ok(())
}

#[test]
fn missing_potential_poisons_the_rest_of_the_level() {
    let spec = ExperimentSpec::new(1, vec![0.01], vec![3600.0], 0.01, true, true).unwrap();
    let unified = UnifiedTable {
        occurrences: vec![LevelOccurrence {
            index: 0,
            time: vec![Some(0.0), Some(1800.0), Some(3600.0)],
            current: 0.01,
            potential: vec![Some(3.0), None, Some(3.2)],
        }],
    };
    let err = compute_metrics(&unified, &spec).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyLevel { id: 1, .. }));
}

#[test]
fn summary_reads_last_row_after_drop() {
    let spec = ExperimentSpec::new(1, vec![0.01], vec![3600.0], 0.01, true, true).unwrap();
    // The time-zero row has no power density, leaving a single row.
    let unified = UnifiedTable {
        occurrences: vec![occurrence(0, &[0.0, 3600.0], 0.01, &[3.0, 3.2])],
    };
    let report = compute_metrics(&unified, &spec).expect("metrics");
    let summary = &report.summaries[0];
    assert_eq!(report.levels[0].frame.height(), 1);
    assert_eq!(summary.final_time, 3600.0);
    assert!(approx(summary.final_specific_capacity, 1000.0));
    assert!(approx(summary.final_energy_density, 100.0));
    assert!(approx(summary.final_power_density, 100.0));
}

#[test]
fn level_with_no_finite_rows_fails_the_run() {
    let spec = ExperimentSpec::new(2, vec![0.01, -0.01], vec![1.0, 1.0], 0.01, true, true).unwrap();
    let unified = UnifiedTable {
        occurrences: vec![
            occurrence(0, &[1.0, 2.0], 0.01, &[3.0, 3.1]),
            occurrence(1, &[0.0], -0.01, &[3.1]),
        ],
    };
    let err = compute_metrics(&unified, &spec).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::EmptyLevel {
            id: 2,
            cycle_index: 1,
            level_index: 2
        }
    ));
}

#[test]
fn summaries_carry_cycle_and_level_indices() {
    let spec = ExperimentSpec::new(3, vec![0.01, 0.02, -0.01], vec![1.0; 3], 0.01, true, true)
        .unwrap();
    let unified = UnifiedTable {
        occurrences: (0..5)
            .map(|i| occurrence(i, &[1.0, 2.0], spec.nominal_current(i), &[3.0, 3.1]))
            .collect(),
    };
    let report = compute_metrics(&unified, &spec).unwrap();
    let indices: Vec<(usize, usize, usize)> = report
        .summaries
        .iter()
        .map(|s| (s.id, s.cycle_index, s.level_index))
        .collect();
    assert_eq!(
        indices,
        [(1, 1, 1), (2, 1, 2), (3, 1, 3), (4, 2, 1), (5, 2, 2)]
    );
    assert_eq!(report.summaries[2].final_current, -0.01);
}

#[test]
fn metrics_are_deterministic() {
    let spec = ExperimentSpec::new(1, vec![0.002], vec![5.0], 0.003, true, true).unwrap();
    let unified = UnifiedTable {
        occurrences: vec![occurrence(0, &[1.0, 2.0, 4.0, 8.0], 0.002, &[3.0, 3.3, 3.4, 3.9])],
    };
    let first = compute_metrics(&unified, &spec).unwrap();
    let second = compute_metrics(&unified, &spec).unwrap();
    assert_eq!(first.summaries, second.summaries);
    assert!(first.levels[0].frame.equals(&second.levels[0].frame));
}

#[test]
fn empty_unified_table_computes_nothing() {
    let spec = ExperimentSpec::new(1, vec![0.002], vec![5.0], 0.003, true, true).unwrap();
    let report = compute_metrics(&UnifiedTable::default(), &spec).unwrap();
    assert!(report.is_empty());
    assert!(report.levels.is_empty());
}

#[test]
fn report_frames_are_long_form() -> PolarsResult<()> {
    let spec = ExperimentSpec::new(2, vec![0.01, -0.01], vec![1.0, 1.0], 0.01, true, true).unwrap();
    let unified = UnifiedTable {
        occurrences: vec![
            occurrence(0, &[1.0, 2.0, 3.0], 0.01, &[3.0, 3.1, 3.2]),
            occurrence(1, &[1.0, 2.0], -0.01, &[3.2, 3.1]),
        ],
    };
    let report = compute_metrics(&unified, &spec).unwrap();

    let summary = report.summary_frame()?;
    assert_eq!(summary.height(), 2);
    let ids = summary.column("id")?.u32()?;
    assert_eq!(ids.get(1), Some(2));

    let details = report.detail_frame()?;
    assert_eq!(details.height(), 5);
    assert_eq!(details.width(), 9);
    let levels = details.column("level_index")?.u32()?;
    assert_eq!(levels.get(3), Some(2));
    assert!(details.column(SPECIFIC_CAPACITY_COLUMN).is_ok());
    Ok(())
}
