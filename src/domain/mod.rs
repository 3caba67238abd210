pub mod error;
pub mod solution;
pub mod solve;
pub mod solver;
#[cfg(feature = "highs-solver")]
pub mod solver_factory;
pub mod solvers;
pub mod sparse;
pub mod status;
pub mod validate;
