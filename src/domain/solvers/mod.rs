#[cfg(feature = "highs-solver")]
pub mod highs_solver;

#[cfg(test)]
pub(crate) mod scripted;

#[cfg(feature = "highs-solver")]
pub use highs_solver::{highs_version, HighsEngine};
