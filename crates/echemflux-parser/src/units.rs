use std::collections::HashMap;

use once_cell::sync::Lazy;

static TIME_VOLTAGE: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "time_voltage",
        [
            ("s", 1e0),
            ("ms", 1e-3),
            ("us", 1e-6),
            ("µs", 1e-6),
            ("V", 1e0),
            ("mV", 1e-3),
            ("uV", 1e-6),
            ("µV", 1e-6),
        ],
    )
});

static AMPLITUDE: Lazy<UnitTable> = Lazy::new(|| {
    UnitTable::new(
        "amplitude",
        [
            ("V", 1e0),
            ("mV", 1e-3),
            ("uV", 1e-6),
            ("µV", 1e-6),
            ("A", 1e0),
            ("mA", 1e-3),
            ("uA", 1e-6),
            ("µA", 1e-6),
            ("nA", 1e-9),
            ("pA", 1e-12),
            ("fA", 1e-15),
        ],
    )
});

/// Maps unit symbols to the factor that converts a value in that unit to its
/// SI base unit. Lookups are case-sensitive (`mA` and `MA` differ).
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTable {
    name: String,
    multipliers: HashMap<String, f64>,
}

impl UnitTable {
    pub fn new<I, S>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            multipliers: entries
                .into_iter()
                .map(|(unit, multiplier)| (unit.into(), multiplier))
                .collect(),
        }
    }

    /// Time and voltage units found in galvanostatic charge/discharge exports.
    pub fn time_voltage() -> &'static UnitTable {
        &TIME_VOLTAGE
    }

    /// Voltage and current amplitude units found in cyclic voltammetry exports.
    pub fn amplitude() -> &'static UnitTable {
        &AMPLITUDE
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn multiplier(&self, unit: &str) -> Option<f64> {
        self.multipliers.get(unit).copied()
    }

    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }
}
