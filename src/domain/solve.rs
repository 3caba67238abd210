use std::path::Path;

use log::{debug, info, warn};

use crate::config::{OptionValue, SolutionStyle, SolveOptions, SolverConfig};
use crate::convert::{to_column_batch, to_flat_model, to_row_batch};
use crate::domain::error::{Result, SolverError};
use crate::domain::solution::{Info, Solution};
use crate::domain::solver::Engine;
use crate::domain::status::{check_outcome, ModelStatus, SolutionStatus};
use crate::domain::validate::validate_warm_start;
use crate::models::{Column, Constraint, Model, WarmStart};

/// Lifecycle around one native engine instance.
///
/// The solver starts with no model and status [`ModelStatus::NotSet`]. Loading
/// a model resets the status; `solve` sets it from the engine. The column and
/// row counts kept here are authoritative for validating later mutations and
/// warm starts. The engine is released when the solver is dropped.
///
/// A solver is not meant for concurrent use; see
/// [`AsyncSolver`](crate::async_solver::AsyncSolver) to run the blocking calls
/// off an async executor.
pub struct Solver<E: Engine> {
    engine: E,
    status: ModelStatus,
    num_cols: usize,
    num_rows: usize,
    solution: Option<Solution>,
}

impl<E: Engine> Solver<E> {
    /// Wrap an engine and apply `config` (log sink first, then options).
    pub fn with_engine(engine: E, config: &SolverConfig) -> Result<Self> {
        let mut solver = Solver {
            num_cols: engine.num_cols(),
            num_rows: engine.num_rows(),
            engine,
            status: ModelStatus::NotSet,
            solution: None,
        };
        solver.update_options(config.to_options())?;
        debug!(
            "Created solver (engine {}, {} options)",
            solver.engine.version(),
            config.options.len()
        );
        Ok(solver)
    }

    /// Replace the loaded model wholesale.
    pub fn set_model(&mut self, model: &Model) -> Result<()> {
        let flat = to_flat_model(model)?;
        if let Err(e) = self.engine.pass_model(&flat) {
            self.resync_after_failed_load();
            return Err(SolverError::native("passModel", e.message));
        }

        self.reset_after_load(flat.num_col, flat.num_row);
        info!(
            "Loaded model with {} columns, {} rows, {} non-zeros",
            flat.num_col,
            flat.num_row,
            flat.a_matrix.num_nz()
        );
        Ok(())
    }

    /// Replace the loaded model with one read from a file.
    pub fn set_model_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Err(e) = self.engine.read_model(path) {
            self.resync_after_failed_load();
            return Err(SolverError::ReadModelFailed {
                path: path.to_path_buf(),
                message: e.message,
            });
        }

        let (num_cols, num_rows) = (self.engine.num_cols(), self.engine.num_rows());
        self.reset_after_load(num_cols, num_rows);
        info!(
            "Read model from {} ({} columns, {} rows)",
            path.display(),
            num_cols,
            num_rows
        );
        Ok(())
    }

    // A rejected load may have cleared the engine's model before failing, so
    // dimensions and status are taken from the engine and any cached solution
    // is dropped.
    fn resync_after_failed_load(&mut self) {
        self.num_cols = self.engine.num_cols();
        self.num_rows = self.engine.num_rows();
        self.status = ModelStatus::from_code(self.engine.model_status());
        self.solution = None;
        warn!(
            "Model load rejected, engine now holds {} columns and {} rows",
            self.num_cols, self.num_rows
        );
    }

    fn reset_after_load(&mut self, num_cols: usize, num_rows: usize) {
        self.num_cols = num_cols;
        self.num_rows = num_rows;
        self.status = ModelStatus::NotSet;
        self.solution = None;
    }

    /// Append constraints to the loaded model.
    pub fn add_rows(&mut self, rows: &[Constraint]) -> Result<()> {
        let batch = to_row_batch(rows, self.num_cols)?;
        if batch.is_empty() {
            return Ok(());
        }
        self.engine
            .add_rows(&batch)
            .map_err(|e| SolverError::native("addRows", e.message))?;

        self.num_rows += batch.len();
        self.sync_after_mutation();
        debug!("Added {} rows, model now has {} rows", batch.len(), self.num_rows);
        Ok(())
    }

    /// Append variables to the loaded model.
    pub fn add_columns(&mut self, columns: &[Column]) -> Result<()> {
        let batch = to_column_batch(columns, self.num_rows)?;
        if batch.is_empty() {
            return Ok(());
        }
        self.engine
            .add_cols(&batch)
            .map_err(|e| SolverError::native("addCols", e.message))?;

        self.num_cols += batch.len();
        self.sync_after_mutation();
        debug!(
            "Added {} columns, model now has {} columns",
            batch.len(),
            self.num_cols
        );
        Ok(())
    }

    // The cached solution survives a mutation only if the engine still
    // considers its own solution valid; it is re-read at the new dimensions.
    fn sync_after_mutation(&mut self) {
        self.status = ModelStatus::from_code(self.engine.model_status());
        if self.solution.is_none() {
            return;
        }
        let raw = self.engine.solution();
        if raw.value_valid || raw.dual_valid {
            self.solution = Some(Solution::from_engine(&raw));
        } else {
            debug!("Engine invalidated its solution, dropping cached values");
            self.solution = None;
        }
    }

    /// Seed the engine with a starting point.
    ///
    /// Every supplied array is checked against the current dimensions before
    /// anything is applied. On success the supplied arrays replace their
    /// counterparts in the provisional solution returned by
    /// [`Solver::solution`] until the next solve; arrays left out keep their
    /// previous values, as they do in the engine.
    pub fn warm_start(&mut self, start: &WarmStart) -> Result<()> {
        validate_warm_start(start, self.num_cols, self.num_rows)?;
        self.engine
            .set_solution(start)
            .map_err(|e| SolverError::native("setSolution", e.message))?;

        self.solution
            .get_or_insert_with(Solution::empty)
            .apply_warm_start(start);
        debug!(
            "Accepted warm start (primal: {}, dual: {})",
            start.has_primal(),
            start.has_dual()
        );
        Ok(())
    }

    /// Solve the loaded model, blocking until the engine returns.
    ///
    /// Unless `options.allow_non_optimal` is set, a status that is not
    /// accepted by [`check_outcome`](crate::domain::status::check_outcome)
    /// is returned as `SolveNonOptimal`. Status and solution are updated
    /// either way.
    pub fn solve(&mut self, options: SolveOptions) -> Result<ModelStatus> {
        self.engine
            .run()
            .map_err(|e| SolverError::native("run", e.message))?;

        self.status = ModelStatus::from_code(self.engine.model_status());
        let info = self.engine.info();
        self.solution = Some(Solution::from_engine(&self.engine.solution()));

        info!(
            "Solve finished: {} (objective {}, {} simplex iterations)",
            self.status, info.objective_function_value, info.simplex_iteration_count
        );

        check_outcome(self.status, info.primal_status(), options.allow_non_optimal)?;
        Ok(self.status)
    }

    pub fn status(&self) -> ModelStatus {
        self.status
    }

    /// Minimal classification of the primal point currently held.
    pub fn solution_status(&self) -> SolutionStatus {
        match self.status {
            ModelStatus::NotSet => SolutionStatus::NoSolution,
            _ => self.engine.info().primal_status(),
        }
    }

    pub fn info(&self) -> Info {
        self.engine.info()
    }

    /// Last known solution: the last solve, or a warm start made since.
    pub fn solution(&self) -> Solution {
        self.solution.clone().unwrap_or_default()
    }

    /// Forward tuning options to the engine.
    ///
    /// Every name and value is checked against the engine's option table
    /// before any is applied. If the engine still rejects a value (out of
    /// range, say), the options already applied are restored to their
    /// previous values.
    pub fn update_options<I, K>(&mut self, options: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: AsRef<str>,
    {
        let mut checked = Vec::new();
        for (name, value) in options {
            let name = name.as_ref();
            let kind = self
                .engine
                .option_kind(name)
                .map_err(|e| SolverError::native("setOption", e.message))?;
            let value = value.coerce(kind).ok_or_else(|| {
                SolverError::native(
                    "setOption",
                    format!("option {} expects a {} value, got {:?}", name, kind, value),
                )
            })?;
            checked.push((name.to_string(), value));
        }

        let mut previous = Vec::with_capacity(checked.len());
        for (name, _) in &checked {
            let value = self
                .engine
                .option(name)
                .map_err(|e| SolverError::native("getOption", e.message))?;
            previous.push(value);
        }

        for (applied, (name, value)) in checked.iter().enumerate() {
            if let Err(e) = self.engine.set_option(name, value) {
                self.restore_options(&checked[..applied], &previous[..applied]);
                return Err(SolverError::native("setOption", e.message));
            }
        }
        Ok(())
    }

    fn restore_options(&mut self, applied: &[(String, OptionValue)], previous: &[OptionValue]) {
        for ((name, _), value) in applied.iter().zip(previous).rev() {
            if let Err(e) = self.engine.set_option(name, value) {
                warn!("Could not restore option {}: {}", name, e.message);
            }
        }
    }

    pub fn option(&self, name: &str) -> Result<OptionValue> {
        self.engine
            .option(name)
            .map_err(|e| SolverError::native("getOption", e.message))
    }

    pub fn write_model(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.engine
            .write_model(path.as_ref())
            .map_err(|e| SolverError::native("writeModel", e.message))
    }

    pub fn write_solution(&mut self, path: impl AsRef<Path>, style: SolutionStyle) -> Result<()> {
        self.engine
            .write_solution(path.as_ref(), style)
            .map_err(|e| SolverError::native("writeSolution", e.message))
    }

    /// Drop the solution and basis, keeping the loaded model.
    pub fn clear_solver(&mut self) -> Result<()> {
        self.engine
            .clear_solver()
            .map_err(|e| SolverError::native("clearSolver", e.message))?;
        self.solution = None;
        self.status = ModelStatus::from_code(self.engine.model_status());
        if self.status != ModelStatus::NotSet {
            warn!("Engine kept status {} after clearing", self.status);
        }
        Ok(())
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn version(&self) -> String {
        self.engine.version()
    }

    /// Release the engine now rather than at end of scope.
    pub fn release(self) {
        debug!("Releasing solver engine");
    }
}
