use crate::config::SolverConfig;
use crate::domain::error::{Result, SolverError};
use crate::domain::solve::Solver;
use crate::domain::solvers::HighsEngine;

/// Solver backed by a native HiGHS instance.
pub type HighsSolver = Solver<HighsEngine>;

impl Solver<HighsEngine> {
    /// Create a quiet solver with the engine's default options.
    pub fn create() -> Result<Self> {
        Self::create_with_config(&SolverConfig::default())
    }

    /// Create a solver whose log sink and options come from `config`.
    pub fn create_with_config(config: &SolverConfig) -> Result<Self> {
        let engine = HighsEngine::new().map_err(|e| SolverError::native("create", e.message))?;
        Solver::with_engine(engine, config)
    }

    /// Create a solver configured from the process environment.
    pub fn create_from_env() -> Result<Self> {
        Self::create_with_config(&SolverConfig::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptionValue;
    use crate::domain::status::ModelStatus;

    #[test]
    fn test_create_should_return_empty_solver() {
        let solver = HighsSolver::create().unwrap();
        assert_eq!(solver.status(), ModelStatus::NotSet);
        assert_eq!(solver.num_cols(), 0);
        assert_eq!(solver.num_rows(), 0);
        assert!(!solver.version().is_empty());
    }

    #[test]
    fn test_create_with_config_given_quiet_sink_should_apply_it() {
        let config = SolverConfig::new().with_option("presolve", "off");
        let solver = HighsSolver::create_with_config(&config).unwrap();
        assert_eq!(solver.option("output_flag").unwrap(), OptionValue::Bool(false));
        assert_eq!(
            solver.option("presolve").unwrap(),
            OptionValue::String("off".to_string())
        );
    }

    #[test]
    fn test_create_with_config_given_unknown_option_should_fail() {
        let config = SolverConfig::new().with_option("no_such_option", 1);
        let err = HighsSolver::create_with_config(&config).err().unwrap();
        assert_eq!(err.kind(), crate::domain::error::ErrorKind::NativeMethodFailed);
    }
}
