//! Native status codes and their classification.
//!
//! The engine reports an open-ended integer model status. Everything above this
//! module works with [`ModelStatus`], built from an explicit mapping table so
//! codes added by newer engine versions land in [`ModelStatus::Unrecognized`].

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::domain::error::{Result, SolverError};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    #[default]
    NotSet,
    LoadError,
    ModelError,
    PresolveError,
    SolveError,
    PostsolveError,
    ModelEmpty,
    Optimal,
    Infeasible,
    UnboundedOrInfeasible,
    Unbounded,
    ObjectiveBound,
    ObjectiveTarget,
    TimeLimit,
    IterationLimit,
    Unknown,
    SolutionLimit,
    Interrupt,
    MemoryLimit,
    /// A code missing from the table, kept for diagnostics.
    Unrecognized(i32),
}

const MODEL_STATUS_TABLE: [(i32, ModelStatus); 19] = [
    (0, ModelStatus::NotSet),
    (1, ModelStatus::LoadError),
    (2, ModelStatus::ModelError),
    (3, ModelStatus::PresolveError),
    (4, ModelStatus::SolveError),
    (5, ModelStatus::PostsolveError),
    (6, ModelStatus::ModelEmpty),
    (7, ModelStatus::Optimal),
    (8, ModelStatus::Infeasible),
    (9, ModelStatus::UnboundedOrInfeasible),
    (10, ModelStatus::Unbounded),
    (11, ModelStatus::ObjectiveBound),
    (12, ModelStatus::ObjectiveTarget),
    (13, ModelStatus::TimeLimit),
    (14, ModelStatus::IterationLimit),
    (15, ModelStatus::Unknown),
    (16, ModelStatus::SolutionLimit),
    (17, ModelStatus::Interrupt),
    (18, ModelStatus::MemoryLimit),
];

impl ModelStatus {
    pub fn from_code(code: i32) -> Self {
        MODEL_STATUS_TABLE
            .iter()
            .find(|(known, _)| *known == code)
            .map(|&(_, status)| status)
            .unwrap_or(ModelStatus::Unrecognized(code))
    }

    pub fn code(self) -> i32 {
        match self {
            ModelStatus::Unrecognized(code) => code,
            status => MODEL_STATUS_TABLE
                .iter()
                .find(|(_, known)| *known == status)
                .map_or(-1, |&(code, _)| code),
        }
    }

    /// Human-readable label, as written in solution reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelStatus::NotSet => "Not Set",
            ModelStatus::LoadError => "Load error",
            ModelStatus::ModelError => "Model error",
            ModelStatus::PresolveError => "Presolve error",
            ModelStatus::SolveError => "Solve error",
            ModelStatus::PostsolveError => "Postsolve error",
            ModelStatus::ModelEmpty => "Empty",
            ModelStatus::Optimal => "Optimal",
            ModelStatus::Infeasible => "Infeasible",
            ModelStatus::UnboundedOrInfeasible => "Primal infeasible or unbounded",
            ModelStatus::Unbounded => "Unbounded",
            ModelStatus::ObjectiveBound => "Bound on objective reached",
            ModelStatus::ObjectiveTarget => "Target for objective reached",
            ModelStatus::TimeLimit => "Time limit reached",
            ModelStatus::IterationLimit => "Iteration limit reached",
            ModelStatus::Unknown => "Unknown",
            ModelStatus::SolutionLimit => "Solution limit reached",
            ModelStatus::Interrupt => "Interrupted by user",
            ModelStatus::MemoryLimit => "Memory limit reached",
            ModelStatus::Unrecognized(_) => "Unrecognized",
        }
    }

    /// Statuses where the engine stopped early and may hold an incumbent.
    pub fn is_limit(self) -> bool {
        matches!(
            self,
            ModelStatus::ObjectiveBound
                | ModelStatus::ObjectiveTarget
                | ModelStatus::TimeLimit
                | ModelStatus::IterationLimit
                | ModelStatus::SolutionLimit
                | ModelStatus::Interrupt
                | ModelStatus::MemoryLimit
        )
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Unrecognized(code) => write!(f, "Unrecognized ({})", code),
            status => f.write_str(status.as_str()),
        }
    }
}

/// Minimal classification of the primal (or dual) point the engine holds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    #[default]
    NoSolution,
    Infeasible,
    Feasible,
}

impl SolutionStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => SolutionStatus::Infeasible,
            2 => SolutionStatus::Feasible,
            _ => SolutionStatus::NoSolution,
        }
    }
}

/// How a finished solve is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    NonOptimal,
}

/// Optimal and empty models are accepted. A limit status is accepted only
/// when the engine holds a feasible incumbent; anything else is non-optimal.
pub fn classify(status: ModelStatus, primal: SolutionStatus) -> Outcome {
    match status {
        ModelStatus::Optimal | ModelStatus::ModelEmpty => Outcome::Accepted,
        status if status.is_limit() && primal == SolutionStatus::Feasible => Outcome::Accepted,
        _ => Outcome::NonOptimal,
    }
}

/// Turn a finished solve into `Ok` or a `SolveNonOptimal` error.
pub fn check_outcome(
    status: ModelStatus,
    primal: SolutionStatus,
    allow_non_optimal: bool,
) -> Result<()> {
    match classify(status, primal) {
        Outcome::Accepted => Ok(()),
        Outcome::NonOptimal if allow_non_optimal => {
            debug!("Tolerating non-optimal status {} (allow_non_optimal)", status);
            Ok(())
        }
        Outcome::NonOptimal => Err(SolverError::SolveNonOptimal { status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    #[test]
    fn test_from_code_given_every_table_entry_should_round_trip() {
        for (code, status) in MODEL_STATUS_TABLE {
            assert_eq!(ModelStatus::from_code(code), status);
            assert_eq!(status.code(), code);
        }
    }

    #[test]
    fn test_from_code_given_unknown_code_should_degrade_to_unrecognized() {
        let status = ModelStatus::from_code(42);
        assert_eq!(status, ModelStatus::Unrecognized(42));
        assert_eq!(status.code(), 42);
        assert_eq!(status.to_string(), "Unrecognized (42)");
        assert_eq!(
            classify(status, SolutionStatus::Feasible),
            Outcome::NonOptimal
        );
    }

    #[test]
    fn test_labels_should_match_report_markers() {
        assert_eq!(ModelStatus::default().to_string(), "Not Set");
        assert_eq!(ModelStatus::Optimal.to_string(), "Optimal");
        assert_eq!(ModelStatus::Infeasible.to_string(), "Infeasible");
        assert_eq!(ModelStatus::Unbounded.to_string(), "Unbounded");
    }

    #[test]
    fn test_classify_given_limit_status_should_depend_on_incumbent() {
        assert_eq!(
            classify(ModelStatus::TimeLimit, SolutionStatus::Feasible),
            Outcome::Accepted
        );
        assert_eq!(
            classify(ModelStatus::TimeLimit, SolutionStatus::NoSolution),
            Outcome::NonOptimal
        );
        assert_eq!(
            classify(ModelStatus::Infeasible, SolutionStatus::Infeasible),
            Outcome::NonOptimal
        );
        assert_eq!(
            classify(ModelStatus::Optimal, SolutionStatus::Feasible),
            Outcome::Accepted
        );
    }

    #[test]
    fn test_check_outcome_given_unbounded_should_fail_unless_allowed() {
        let err = check_outcome(ModelStatus::Unbounded, SolutionStatus::NoSolution, false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SolveNonOptimal);
        assert_eq!(err.status(), Some(ModelStatus::Unbounded));

        assert!(check_outcome(ModelStatus::Unbounded, SolutionStatus::NoSolution, true).is_ok());
    }

    #[test]
    fn test_check_outcome_given_unbounded_or_infeasible_should_keep_it_apart_from_unbounded() {
        let err = check_outcome(
            ModelStatus::UnboundedOrInfeasible,
            SolutionStatus::NoSolution,
            false,
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(ModelStatus::UnboundedOrInfeasible));
        assert_ne!(err.status(), Some(ModelStatus::Unbounded));
        assert_eq!(ModelStatus::from_code(9), ModelStatus::UnboundedOrInfeasible);
        assert_eq!(ModelStatus::from_code(10), ModelStatus::Unbounded);
    }

    #[test]
    fn test_solution_status_from_code_should_default_to_no_solution() {
        assert_eq!(SolutionStatus::from_code(0), SolutionStatus::NoSolution);
        assert_eq!(SolutionStatus::from_code(1), SolutionStatus::Infeasible);
        assert_eq!(SolutionStatus::from_code(2), SolutionStatus::Feasible);
        assert_eq!(SolutionStatus::from_code(-7), SolutionStatus::NoSolution);
    }
}
