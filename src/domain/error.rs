use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::status::ModelStatus;

/// Result type for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;

/// Which warm-start array failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmStartField {
    PrimalColumns,
    PrimalRows,
    DualColumns,
    DualRows,
}

impl fmt::Display for WarmStartField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarmStartField::PrimalColumns => "primal_columns",
            WarmStartField::PrimalRows => "primal_rows",
            WarmStartField::DualColumns => "dual_columns",
            WarmStartField::DualRows => "dual_rows",
        };
        f.write_str(name)
    }
}

/// Discriminant of [`SolverError`], for matching without inspecting payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidWarmStart,
    SolveNonOptimal,
    NativeMethodFailed,
    ReadModelFailed,
    InvalidModel,
}

/// Errors that can occur when driving the solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A warm-start array does not match the loaded model's dimensions
    #[error("invalid warm start: {field} has length {got}, expected {expected}")]
    InvalidWarmStart {
        field: WarmStartField,
        expected: usize,
        got: usize,
    },

    /// The solve finished with a status the caller did not opt into
    #[error("solve finished with non-optimal status: {status}")]
    SolveNonOptimal { status: ModelStatus },

    /// A native engine call reported failure
    #[error("native call {method} failed: {message}")]
    NativeMethodFailed {
        method: &'static str,
        message: String,
    },

    /// A model file could not be read or parsed
    #[error("failed to read model from {}: {message}", .path.display())]
    ReadModelFailed { path: PathBuf, message: String },

    /// Model data references indices outside the current dimensions
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

impl SolverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolverError::InvalidWarmStart { .. } => ErrorKind::InvalidWarmStart,
            SolverError::SolveNonOptimal { .. } => ErrorKind::SolveNonOptimal,
            SolverError::NativeMethodFailed { .. } => ErrorKind::NativeMethodFailed,
            SolverError::ReadModelFailed { .. } => ErrorKind::ReadModelFailed,
            SolverError::InvalidModel(_) => ErrorKind::InvalidModel,
        }
    }

    pub(crate) fn native(method: &'static str, message: impl Into<String>) -> Self {
        SolverError::NativeMethodFailed {
            method,
            message: message.into(),
        }
    }

    /// The status carried by a `SolveNonOptimal` error.
    pub fn status(&self) -> Option<ModelStatus> {
        match self {
            SolverError::SolveNonOptimal { status } => Some(*status),
            _ => None,
        }
    }
}
