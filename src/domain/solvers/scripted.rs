//! In-process engine for exercising the lifecycle without a native library.
//!
//! It never solves anything: `run` reports whatever status and solution were
//! scripted beforehand.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::{OptionKind, OptionValue, SolutionStyle};
use crate::convert::{ColumnBatch, FlatModel, RowBatch};
use crate::domain::solution::Info;
use crate::domain::solver::{Engine, EngineFailure, EngineResult, EngineSolution};
use crate::domain::status::ModelStatus;
use crate::models::WarmStart;

pub struct ScriptedEngine {
    pub passed: Option<FlatModel>,
    pub warm_start: Option<WarmStart>,
    pub keep_solution_on_mutation: bool,
    options: BTreeMap<String, OptionValue>,
    num_cols: usize,
    num_rows: usize,
    status_code: i32,
    info: Info,
    solution: EngineSolution,
    next: Option<(i32, EngineSolution)>,
    reject: Option<&'static str>,
    rejected_option: Option<String>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        let options = [
            ("output_flag", OptionValue::Bool(true)),
            ("log_to_console", OptionValue::Bool(true)),
            ("log_file", OptionValue::String(String::new())),
            ("presolve", OptionValue::String("choose".to_string())),
            ("time_limit", OptionValue::Double(f64::INFINITY)),
            ("threads", OptionValue::Int(0)),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();

        ScriptedEngine {
            passed: None,
            warm_start: None,
            keep_solution_on_mutation: false,
            options,
            num_cols: 0,
            num_rows: 0,
            status_code: 0,
            info: Info::default(),
            solution: EngineSolution::default(),
            next: None,
            reject: None,
            rejected_option: None,
        }
    }

    /// Outcome of the next `run`.
    pub fn script(&mut self, status: ModelStatus, solution: EngineSolution) {
        self.script_code(status.code(), solution);
    }

    pub fn script_code(&mut self, code: i32, solution: EngineSolution) {
        self.next = Some((code, solution));
    }

    /// Make the next call to `method` fail.
    pub fn reject_next(&mut self, method: &'static str) {
        self.reject = Some(method);
    }

    /// Make every `set_option` on `name` fail, as for an out-of-range value.
    pub fn reject_option(&mut self, name: &str) {
        self.rejected_option = Some(name.to_string());
    }

    fn check(&mut self, method: &'static str) -> EngineResult<()> {
        if self.reject == Some(method) {
            self.reject = None;
            return Err(EngineFailure::new("scripted rejection"));
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        self.status_code = 0;
        self.info = Info::default();
        self.solution = EngineSolution::default();
    }

    fn clear_model(&mut self) {
        self.num_cols = 0;
        self.num_rows = 0;
        self.passed = None;
        self.invalidate();
    }

    fn write_text(path: &Path, text: String) -> EngineResult<()> {
        fs::write(path, text).map_err(|e| EngineFailure::new(e.to_string()))
    }
}

impl Engine for ScriptedEngine {
    fn pass_model(&mut self, model: &FlatModel) -> EngineResult<()> {
        if let Err(e) = self.check("passModel") {
            // HiGHS clears its model before assessing the new one.
            self.clear_model();
            return Err(e);
        }
        self.num_cols = model.num_col;
        self.num_rows = model.num_row;
        self.passed = Some(model.clone());
        self.invalidate();
        Ok(())
    }

    fn read_model(&mut self, path: &Path) -> EngineResult<()> {
        self.check("readModel")?;
        if !path.exists() {
            return Err(EngineFailure::new(format!("{} not found", path.display())));
        }
        self.clear_model();
        Ok(())
    }

    fn write_model(&mut self, path: &Path) -> EngineResult<()> {
        self.check("writeModel")?;
        Self::write_text(path, "min\n obj: \nst\nbounds\nend\n".to_string())
    }

    fn write_solution(&mut self, path: &Path, _style: SolutionStyle) -> EngineResult<()> {
        self.check("writeSolution")?;
        let status = ModelStatus::from_code(self.status_code);
        Self::write_text(path, format!("Model status\n{}\n", status))
    }

    fn add_rows(&mut self, rows: &RowBatch) -> EngineResult<()> {
        self.check("addRows")?;
        self.num_rows += rows.len();
        if self.keep_solution_on_mutation && self.solution.value_valid {
            for k in 0..rows.matrix.num_lines() {
                let (indices, values) = rows.matrix.line(k);
                let activity = indices
                    .iter()
                    .zip(values)
                    .map(|(&col, &value)| self.solution.col_value[col] * value)
                    .sum::<f64>();
                self.solution.row_value.push(activity);
                self.solution.row_dual.push(0.0);
            }
        } else {
            self.invalidate();
        }
        Ok(())
    }

    fn add_cols(&mut self, cols: &ColumnBatch) -> EngineResult<()> {
        self.check("addCols")?;
        self.num_cols += cols.len();
        self.invalidate();
        Ok(())
    }

    fn run(&mut self) -> EngineResult<()> {
        self.check("run")?;
        let (code, solution) = self.next.take().unwrap_or_default();
        self.status_code = code;
        self.info = Info {
            valid: true,
            basis_validity: i32::from(solution.value_valid),
            primal_solution_status: if solution.value_valid { 2 } else { 0 },
            dual_solution_status: if solution.dual_valid { 2 } else { 0 },
            ..Info::default()
        };
        self.solution = solution;
        Ok(())
    }

    fn model_status(&self) -> i32 {
        self.status_code
    }

    fn info(&self) -> Info {
        self.info.clone()
    }

    fn solution(&self) -> EngineSolution {
        self.solution.clone()
    }

    fn set_solution(&mut self, start: &WarmStart) -> EngineResult<()> {
        self.check("setSolution")?;
        self.warm_start = Some(start.clone());
        Ok(())
    }

    fn option_kind(&self, name: &str) -> EngineResult<OptionKind> {
        self.options
            .get(name)
            .map(OptionValue::kind)
            .ok_or_else(|| EngineFailure::new(format!("unknown option \"{}\"", name)))
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> EngineResult<()> {
        self.check("setOption")?;
        if self.rejected_option.as_deref() == Some(name) {
            return Err(EngineFailure::new(format!("value {:?} for {} is out of range", value, name)));
        }
        self.options.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn option(&self, name: &str) -> EngineResult<OptionValue> {
        self.options
            .get(name)
            .cloned()
            .ok_or_else(|| EngineFailure::new(format!("unknown option \"{}\"", name)))
    }

    fn clear_solver(&mut self) -> EngineResult<()> {
        self.check("clearSolver")?;
        self.invalidate();
        Ok(())
    }

    fn num_cols(&self) -> usize {
        self.num_cols
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn version(&self) -> String {
        "scripted".to_string()
    }
}
