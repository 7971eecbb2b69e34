pub mod calculator;
pub mod conversion;
pub mod error;
pub mod experiment;
pub mod outputs;
pub mod pipelines;
pub mod unification;

pub use error::{PipelineError, Result};
pub use experiment::{ExperimentSpec, ExperimentSpecConfig, SpecError};
