use std::path::Path;

use thiserror::Error;

use crate::config::{OptionKind, OptionValue, SolutionStyle};
use crate::convert::{ColumnBatch, FlatModel, RowBatch};
use crate::domain::solution::Info;
use crate::models::WarmStart;

/// Failure signal from a native call, before the lifecycle layer classifies it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EngineFailure {
    pub message: String,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        EngineFailure {
            message: message.into(),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineFailure>;

/// Dense solution arrays as held by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineSolution {
    pub value_valid: bool,
    pub dual_valid: bool,
    pub col_value: Vec<f64>,
    pub col_dual: Vec<f64>,
    pub row_value: Vec<f64>,
    pub row_dual: Vec<f64>,
}

/// Common interface for native solving engines
///
/// Every call is blocking. `run` is the only one expected to take real time.
pub trait Engine {
    /// Replace the engine's model with flat arrays
    fn pass_model(&mut self, model: &FlatModel) -> EngineResult<()>;

    /// Load a model file (format picked by extension)
    fn read_model(&mut self, path: &Path) -> EngineResult<()>;

    fn write_model(&mut self, path: &Path) -> EngineResult<()>;

    fn write_solution(&mut self, path: &Path, style: SolutionStyle) -> EngineResult<()>;

    /// Append rows to the loaded model
    fn add_rows(&mut self, rows: &RowBatch) -> EngineResult<()>;

    /// Append columns to the loaded model
    fn add_cols(&mut self, cols: &ColumnBatch) -> EngineResult<()>;

    /// Solve the loaded model
    fn run(&mut self) -> EngineResult<()>;

    /// Raw model status code
    fn model_status(&self) -> i32;

    /// Diagnostics; zeroed when the engine holds none
    fn info(&self) -> Info;

    fn solution(&self) -> EngineSolution;

    /// Seed the engine with a starting point. Absent arrays are left untouched.
    fn set_solution(&mut self, start: &WarmStart) -> EngineResult<()>;

    /// Declared type of an option, or a failure for unknown names
    fn option_kind(&self, name: &str) -> EngineResult<OptionKind>;

    fn set_option(&mut self, name: &str, value: &OptionValue) -> EngineResult<()>;

    fn option(&self, name: &str) -> EngineResult<OptionValue>;

    /// Drop solution and basis, keep the model
    fn clear_solver(&mut self) -> EngineResult<()>;

    fn num_cols(&self) -> usize;

    fn num_rows(&self) -> usize;

    /// Get the engine version for logging/debugging
    fn version(&self) -> String;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn pass_model(&mut self, model: &FlatModel) -> EngineResult<()> {
        (**self).pass_model(model)
    }

    fn read_model(&mut self, path: &Path) -> EngineResult<()> {
        (**self).read_model(path)
    }

    fn write_model(&mut self, path: &Path) -> EngineResult<()> {
        (**self).write_model(path)
    }

    fn write_solution(&mut self, path: &Path, style: SolutionStyle) -> EngineResult<()> {
        (**self).write_solution(path, style)
    }

    fn add_rows(&mut self, rows: &RowBatch) -> EngineResult<()> {
        (**self).add_rows(rows)
    }

    fn add_cols(&mut self, cols: &ColumnBatch) -> EngineResult<()> {
        (**self).add_cols(cols)
    }

    fn run(&mut self) -> EngineResult<()> {
        (**self).run()
    }

    fn model_status(&self) -> i32 {
        (**self).model_status()
    }

    fn info(&self) -> Info {
        (**self).info()
    }

    fn solution(&self) -> EngineSolution {
        (**self).solution()
    }

    fn set_solution(&mut self, start: &WarmStart) -> EngineResult<()> {
        (**self).set_solution(start)
    }

    fn option_kind(&self, name: &str) -> EngineResult<OptionKind> {
        (**self).option_kind(name)
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> EngineResult<()> {
        (**self).set_option(name, value)
    }

    fn option(&self, name: &str) -> EngineResult<OptionValue> {
        (**self).option(name)
    }

    fn clear_solver(&mut self) -> EngineResult<()> {
        (**self).clear_solver()
    }

    fn num_cols(&self) -> usize {
        (**self).num_cols()
    }

    fn num_rows(&self) -> usize {
        (**self).num_rows()
    }

    fn version(&self) -> String {
        (**self).version()
    }
}
