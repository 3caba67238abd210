//! Async boundary over the blocking solver lifecycle.
//!
//! Long native calls (model load, solve, file output) run on tokio's blocking
//! pool. They borrow the wrapper mutably, so no second call on the same
//! solver can start while one is in flight.
//!
//! A blocking call keeps running if its future is dropped. Until it ends, the
//! fallible synchronous methods fail fast instead of waiting, while the plain
//! accessors (`status`, `info`, `solution`, `num_cols`, `num_rows`) wait for
//! the lock and so block the calling thread.

use std::path::PathBuf;
use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, MutexGuard};
use tokio::task;

use crate::config::{OptionValue, SolutionStyle, SolveOptions};
use crate::domain::error::{Result, SolverError};
use crate::domain::solution::{Info, Solution};
use crate::domain::solve::Solver;
use crate::domain::solver::Engine;
use crate::domain::status::ModelStatus;
use crate::models::{Column, Constraint, Model, WarmStart};

pub struct AsyncSolver<E: Engine + Send + 'static> {
    inner: Arc<Mutex<Solver<E>>>,
}

impl<E: Engine + Send + 'static> AsyncSolver<E> {
    pub fn new(solver: Solver<E>) -> Self {
        AsyncSolver {
            inner: Arc::new(Mutex::new(solver)),
        }
    }

    async fn blocking<T, F>(&mut self, method: &'static str, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Solver<E>) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        debug!("Dispatching {} to the blocking pool", method);
        task::spawn_blocking(move || call(&mut inner.lock()))
            .await
            .map_err(|e| SolverError::native(method, format!("blocking task failed: {}", e)))?
    }

    fn try_solver(&self, method: &'static str) -> Result<MutexGuard<'_, Solver<E>>> {
        self.inner.try_lock().ok_or_else(|| {
            SolverError::native(method, "solver is busy with a cancelled blocking call")
        })
    }

    pub async fn set_model(&mut self, model: Model) -> Result<()> {
        self.blocking("passModel", move |solver| solver.set_model(&model))
            .await
    }

    pub async fn set_model_from_file(&mut self, path: PathBuf) -> Result<()> {
        self.blocking("readModel", move |solver| solver.set_model_from_file(&path))
            .await
    }

    pub async fn solve(&mut self, options: SolveOptions) -> Result<ModelStatus> {
        self.blocking("run", move |solver| solver.solve(options)).await
    }

    pub async fn write_model(&mut self, path: PathBuf) -> Result<()> {
        self.blocking("writeModel", move |solver| solver.write_model(&path))
            .await
    }

    pub async fn write_solution(&mut self, path: PathBuf, style: SolutionStyle) -> Result<()> {
        self.blocking("writeSolution", move |solver| {
            solver.write_solution(&path, style)
        })
        .await
    }

    pub fn add_rows(&mut self, rows: &[Constraint]) -> Result<()> {
        self.try_solver("addRows")?.add_rows(rows)
    }

    pub fn add_columns(&mut self, columns: &[Column]) -> Result<()> {
        self.try_solver("addCols")?.add_columns(columns)
    }

    pub fn warm_start(&mut self, start: &WarmStart) -> Result<()> {
        self.try_solver("setSolution")?.warm_start(start)
    }

    pub fn update_options<I, K>(&mut self, options: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: AsRef<str>,
    {
        self.try_solver("setOption")?.update_options(options)
    }

    pub fn option(&self, name: &str) -> Result<OptionValue> {
        self.try_solver("getOption")?.option(name)
    }

    pub fn clear_solver(&mut self) -> Result<()> {
        self.try_solver("clearSolver")?.clear_solver()
    }

    pub fn status(&self) -> ModelStatus {
        self.inner.lock().status()
    }

    pub fn info(&self) -> Info {
        self.inner.lock().info()
    }

    pub fn solution(&self) -> Solution {
        self.inner.lock().solution()
    }

    pub fn num_cols(&self) -> usize {
        self.inner.lock().num_cols()
    }

    pub fn num_rows(&self) -> usize {
        self.inner.lock().num_rows()
    }

    /// Take the synchronous solver back.
    ///
    /// Returns `None` if a blocking call was cancelled and its task still
    /// holds the solver.
    pub fn into_inner(self) -> Option<Solver<E>> {
        Arc::try_unwrap(self.inner).ok().map(Mutex::into_inner)
    }
}
