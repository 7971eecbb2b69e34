use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;

/// Violations of the experiment specification invariants, one per check.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("level_separated requires cycle_separated; levels cannot be distinguished unless cycles are")]
    LevelsWithoutCycles,

    #[error("level_number must be a positive integer, got {0}")]
    NonPositiveLevelNumber(i64),

    #[error("material_mass must be a positive number of grams, got {0}")]
    NonPositiveMass(f64),

    #[error("level_current has {current} entries and level_time has {time}; both must have level_number = {expected}")]
    LevelCountMismatch {
        expected: usize,
        current: usize,
        time: usize,
    },

    #[error("level_current[{index}] must be a number, got {value}")]
    NonNumericCurrent { index: usize, value: f64 },

    #[error("level_time[{index}] must be a positive number, got {value}")]
    NonPositiveLevelTime { index: usize, value: f64 },
}

impl SpecError {
    /// Name of the input field the violation refers to.
    pub fn field(&self) -> &'static str {
        match self {
            SpecError::LevelsWithoutCycles => "level_separated",
            SpecError::NonPositiveLevelNumber(_) => "level_number",
            SpecError::NonPositiveMass(_) => "material_mass",
            SpecError::LevelCountMismatch { current, expected, .. } if current != expected => {
                "level_current"
            }
            SpecError::LevelCountMismatch { .. } => "level_time",
            SpecError::NonNumericCurrent { .. } => "level_current",
            SpecError::NonPositiveLevelTime { .. } => "level_time",
        }
    }
}

/// Validated description of a galvanostatic charge/discharge experiment.
///
/// A cycle consists of `level_number` constant-current levels. Only
/// constructible through [`ExperimentSpec::new`], so every instance upholds
/// the invariants checked there.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSpec {
    level_number: usize,
    level_current: Vec<f64>,
    level_time: Vec<f64>,
    material_mass: f64,
    cycle_separated: bool,
    level_separated: bool,
}

impl ExperimentSpec {
    pub fn new(
        level_number: i64,
        level_current: Vec<f64>,
        level_time: Vec<f64>,
        material_mass: f64,
        cycle_separated: bool,
        level_separated: bool,
    ) -> std::result::Result<Self, SpecError> {
        if level_separated && !cycle_separated {
            return Err(SpecError::LevelsWithoutCycles);
        }
        let level_number = usize::try_from(level_number)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(SpecError::NonPositiveLevelNumber(level_number))?;
        if !(material_mass.is_finite() && material_mass > 0.0) {
            return Err(SpecError::NonPositiveMass(material_mass));
        }
        if level_current.len() != level_number || level_time.len() != level_number {
            return Err(SpecError::LevelCountMismatch {
                expected: level_number,
                current: level_current.len(),
                time: level_time.len(),
            });
        }
        if let Some((index, &value)) = level_current
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(SpecError::NonNumericCurrent { index, value });
        }
        if let Some((index, &value)) = level_time
            .iter()
            .enumerate()
            .find(|(_, v)| !(v.is_finite() && **v > 0.0))
        {
            return Err(SpecError::NonPositiveLevelTime { index, value });
        }

        Ok(Self {
            level_number,
            level_current,
            level_time,
            material_mass,
            cycle_separated,
            level_separated,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(ExperimentSpecConfig::from_toml_str(content)?.try_into()?)
    }

    pub fn level_number(&self) -> usize {
        self.level_number
    }

    /// Nominal level currents in amperes; negative values are discharge.
    pub fn level_current(&self) -> &[f64] {
        &self.level_current
    }

    /// Nominal level durations in seconds.
    pub fn level_time(&self) -> &[f64] {
        &self.level_time
    }

    /// Mass of active material in grams.
    pub fn material_mass(&self) -> f64 {
        self.material_mass
    }

    pub fn cycle_separated(&self) -> bool {
        self.cycle_separated
    }

    pub fn level_separated(&self) -> bool {
        self.level_separated
    }

    /// Whether the raw column layout can be reconstructed into level occurrences.
    pub fn supports_unification(&self) -> bool {
        self.cycle_separated && self.level_separated
    }

    /// Declared current for the level occurrence at `occurrence` (0-based).
    pub fn nominal_current(&self, occurrence: usize) -> f64 {
        self.level_current[occurrence % self.level_number]
    }

    /// 1-based cycle containing the occurrence at `occurrence` (0-based).
    pub fn cycle_index(&self, occurrence: usize) -> usize {
        occurrence / self.level_number + 1
    }

    /// 1-based position of the occurrence within its cycle.
    pub fn level_index(&self, occurrence: usize) -> usize {
        occurrence % self.level_number + 1
    }
}

/// Unvalidated experiment specification as read from a TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExperimentSpecConfig {
    pub level_number: i64,
    pub level_current: Vec<f64>,
    pub level_time: Vec<f64>,
    pub material_mass: f64,
    #[serde(default)]
    pub cycle_separated: bool,
    #[serde(default)]
    pub level_separated: bool,
}

impl ExperimentSpecConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl TryFrom<ExperimentSpecConfig> for ExperimentSpec {
    type Error = SpecError;

    fn try_from(config: ExperimentSpecConfig) -> std::result::Result<Self, Self::Error> {
        ExperimentSpec::new(
            config.level_number,
            config.level_current,
            config.level_time,
            config.material_mass,
            config.cycle_separated,
            config.level_separated,
        )
    }
}
