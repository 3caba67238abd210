//! Safe, stateful access to the HiGHS optimization engine.
//!
//! Build a [`Model`], load it into a [`Solver`], optionally add rows or
//! columns and seed a warm start, then solve and read back the status,
//! [`Info`] and [`Solution`]. The native engine sits behind the [`Engine`]
//! trait; the HiGHS binding is enabled with the `highs-solver` feature.

pub mod async_solver;
pub mod config;
pub mod convert;
pub mod domain;
pub mod models;

pub use async_solver::AsyncSolver;
pub use config::{OptionKind, OptionValue, SolutionStyle, SolveOptions, SolverConfig};
pub use domain::error::{ErrorKind, Result, SolverError, WarmStartField};
pub use domain::solution::{Info, Solution, SolutionValues};
pub use domain::solve::Solver;
pub use domain::solver::{Engine, EngineFailure, EngineResult, EngineSolution};
pub use domain::sparse::sparse_row;
pub use domain::status::{ModelStatus, SolutionStatus};
pub use models::{
    Column, Constraint, Model, Objective, SparseRow, Variable, VariableType, WarmStart,
};

#[cfg(feature = "highs-solver")]
pub use domain::solver_factory::HighsSolver;
#[cfg(feature = "highs-solver")]
pub use domain::solvers::{highs_version, HighsEngine};
