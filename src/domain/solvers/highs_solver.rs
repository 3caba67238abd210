//! HiGHS engine over the raw `highs-sys` C API.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr::{self, NonNull};

use highs_sys::*;
use log::{debug, warn};

use crate::config::{OptionKind, OptionValue, SolutionStyle};
use crate::convert::{ColumnBatch, FlatModel, RowBatch};
use crate::domain::solution::Info;
use crate::domain::solver::{Engine, EngineFailure, EngineResult, EngineSolution};
use crate::models::WarmStart;

const HESSIAN_FORMAT_TRIANGULAR: HighsInt = 1;
const MAX_STRING_LENGTH: usize = 512;

const OPTION_TYPE_BOOL: HighsInt = 0;
const OPTION_TYPE_INT: HighsInt = 1;
const OPTION_TYPE_DOUBLE: HighsInt = 2;
const OPTION_TYPE_STRING: HighsInt = 3;

/// One HiGHS instance, exclusively owned and destroyed on drop.
pub struct HighsEngine {
    ptr: NonNull<c_void>,
}

// The instance is only reached through `&mut self`/`&self` of its single owner.
unsafe impl Send for HighsEngine {}

impl HighsEngine {
    pub fn new() -> EngineResult<Self> {
        let ptr = unsafe { Highs_create() };
        NonNull::new(ptr)
            .map(|ptr| HighsEngine { ptr })
            .ok_or_else(|| EngineFailure::new("Highs_create returned null"))
    }

    fn raw(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }

    fn int_info(&self, name: &str) -> Option<HighsInt> {
        let name = CString::new(name).ok()?;
        let mut value: HighsInt = 0;
        let status = unsafe { Highs_getIntInfoValue(self.raw(), name.as_ptr(), &mut value) };
        (status == STATUS_OK).then_some(value)
    }

    fn int64_info(&self, name: &str) -> Option<i64> {
        let name = CString::new(name).ok()?;
        let mut value: i64 = 0;
        let status = unsafe { Highs_getInt64InfoValue(self.raw(), name.as_ptr(), &mut value) };
        (status == STATUS_OK).then_some(value)
    }

    fn double_info(&self, name: &str) -> Option<f64> {
        let name = CString::new(name).ok()?;
        let mut value: f64 = 0.0;
        let status = unsafe { Highs_getDoubleInfoValue(self.raw(), name.as_ptr(), &mut value) };
        (status == STATUS_OK).then_some(value)
    }
}

impl Drop for HighsEngine {
    fn drop(&mut self) {
        debug!("Destroying HiGHS instance");
        unsafe { Highs_destroy(self.raw()) }
    }
}

fn check(status: HighsInt, call: &str) -> EngineResult<()> {
    if status == STATUS_ERROR {
        return Err(EngineFailure::new(format!("{} returned an error status", call)));
    }
    if status == STATUS_WARNING {
        warn!("{} returned a warning status", call);
    }
    Ok(())
}

fn c_string(value: &str, what: &str) -> EngineResult<CString> {
    CString::new(value).map_err(|_| EngineFailure::new(format!("{} contains a NUL byte", what)))
}

fn c_path(path: &Path) -> EngineResult<CString> {
    let text = path
        .to_str()
        .ok_or_else(|| EngineFailure::new(format!("path {} is not valid UTF-8", path.display())))?;
    c_string(text, "path")
}

fn highs_int(value: usize) -> EngineResult<HighsInt> {
    HighsInt::try_from(value)
        .map_err(|_| EngineFailure::new(format!("{} does not fit in a HiGHS integer", value)))
}

fn highs_ints(values: &[usize]) -> EngineResult<Vec<HighsInt>> {
    values.iter().map(|&v| highs_int(v)).collect()
}

fn opt_ptr(values: &Option<Vec<f64>>) -> *const f64 {
    values.as_ref().map_or(ptr::null(), |v| v.as_ptr())
}

impl Engine for HighsEngine {
    fn pass_model(&mut self, model: &FlatModel) -> EngineResult<()> {
        let a_start = highs_ints(&model.a_matrix.offsets)?;
        let a_index = highs_ints(&model.a_matrix.indices)?;
        let (q_num_nz, q_start, q_index, q_value) = match &model.hessian {
            Some(hessian) => (
                highs_int(hessian.num_nz())?,
                highs_ints(&hessian.offsets)?,
                highs_ints(&hessian.indices)?,
                hessian.values.clone(),
            ),
            None => (0, Vec::new(), Vec::new(), Vec::new()),
        };
        let integrality = model.integrality.as_ref();

        let status = unsafe {
            Highs_passModel(
                self.raw(),
                highs_int(model.num_col)?,
                highs_int(model.num_row)?,
                highs_int(model.a_matrix.num_nz())?,
                q_num_nz,
                model.a_matrix.format.code(),
                HESSIAN_FORMAT_TRIANGULAR,
                model.sense.code(),
                model.offset,
                model.col_cost.as_ptr(),
                model.col_lower.as_ptr(),
                model.col_upper.as_ptr(),
                model.row_lower.as_ptr(),
                model.row_upper.as_ptr(),
                a_start.as_ptr(),
                a_index.as_ptr(),
                model.a_matrix.values.as_ptr(),
                if q_num_nz > 0 { q_start.as_ptr() } else { ptr::null() },
                if q_num_nz > 0 { q_index.as_ptr() } else { ptr::null() },
                if q_num_nz > 0 { q_value.as_ptr() } else { ptr::null() },
                integrality.map_or(ptr::null(), |v| v.as_ptr()),
            )
        };
        check(status, "Highs_passModel")?;

        if let Some(names) = &model.col_names {
            for (col, name) in names.iter().enumerate() {
                let c_name = c_string(name, "column name")?;
                let status = unsafe { Highs_passColName(self.raw(), highs_int(col)?, c_name.as_ptr()) };
                check(status, "Highs_passColName")?;
            }
        }
        Ok(())
    }

    fn read_model(&mut self, path: &Path) -> EngineResult<()> {
        let path = c_path(path)?;
        let status = unsafe { Highs_readModel(self.raw(), path.as_ptr()) };
        check(status, "Highs_readModel")
    }

    fn write_model(&mut self, path: &Path) -> EngineResult<()> {
        let path = c_path(path)?;
        let status = unsafe { Highs_writeModel(self.raw(), path.as_ptr()) };
        check(status, "Highs_writeModel")
    }

    fn write_solution(&mut self, path: &Path, style: SolutionStyle) -> EngineResult<()> {
        let path = c_path(path)?;
        let status = unsafe {
            match style {
                SolutionStyle::Raw => Highs_writeSolution(self.raw(), path.as_ptr()),
                SolutionStyle::Pretty => Highs_writeSolutionPretty(self.raw(), path.as_ptr()),
            }
        };
        check(status, "Highs_writeSolution")
    }

    fn add_rows(&mut self, rows: &RowBatch) -> EngineResult<()> {
        let starts = highs_ints(&rows.matrix.offsets)?;
        let index = highs_ints(&rows.matrix.indices)?;
        let status = unsafe {
            Highs_addRows(
                self.raw(),
                highs_int(rows.len())?,
                rows.lower.as_ptr(),
                rows.upper.as_ptr(),
                highs_int(rows.matrix.num_nz())?,
                starts.as_ptr(),
                index.as_ptr(),
                rows.matrix.values.as_ptr(),
            )
        };
        check(status, "Highs_addRows")
    }

    fn add_cols(&mut self, cols: &ColumnBatch) -> EngineResult<()> {
        let first_new = highs_int(self.num_cols())?;
        let starts = highs_ints(&cols.matrix.offsets)?;
        let index = highs_ints(&cols.matrix.indices)?;
        let status = unsafe {
            Highs_addCols(
                self.raw(),
                highs_int(cols.len())?,
                cols.costs.as_ptr(),
                cols.lower.as_ptr(),
                cols.upper.as_ptr(),
                highs_int(cols.matrix.num_nz())?,
                starts.as_ptr(),
                index.as_ptr(),
                cols.matrix.values.as_ptr(),
            )
        };
        check(status, "Highs_addCols")?;

        for (offset, &code) in cols.integrality.iter().enumerate() {
            if code == 0 {
                continue;
            }
            let col = first_new + highs_int(offset)?;
            let status = unsafe { Highs_changeColIntegrality(self.raw(), col, code) };
            check(status, "Highs_changeColIntegrality")?;
        }
        Ok(())
    }

    fn run(&mut self) -> EngineResult<()> {
        let status = unsafe { Highs_run(self.raw()) };
        check(status, "Highs_run")
    }

    fn model_status(&self) -> i32 {
        unsafe { Highs_getModelStatus(self.raw()) }
    }

    fn info(&self) -> Info {
        // Reads fail while the engine holds no info; those fields stay zero.
        let Some(basis_validity) = self.int_info("basis_validity") else {
            return Info::default();
        };
        Info {
            valid: true,
            basis_validity,
            primal_solution_status: self.int_info("primal_solution_status").unwrap_or(0),
            dual_solution_status: self.int_info("dual_solution_status").unwrap_or(0),
            objective_function_value: self.double_info("objective_function_value").unwrap_or(0.0),
            mip_dual_bound: self.double_info("mip_dual_bound").unwrap_or(0.0),
            mip_gap: self.double_info("mip_gap").unwrap_or(0.0),
            mip_node_count: self.int64_info("mip_node_count").unwrap_or(0),
            simplex_iteration_count: self.int_info("simplex_iteration_count").unwrap_or(0),
            ipm_iteration_count: self.int_info("ipm_iteration_count").unwrap_or(0),
            crossover_iteration_count: self.int_info("crossover_iteration_count").unwrap_or(0),
            qp_iteration_count: self.int_info("qp_iteration_count").unwrap_or(0),
            num_primal_infeasibilities: self.int_info("num_primal_infeasibilities").unwrap_or(0),
            max_primal_infeasibility: self.double_info("max_primal_infeasibility").unwrap_or(0.0),
            sum_primal_infeasibilities: self.double_info("sum_primal_infeasibilities").unwrap_or(0.0),
            num_dual_infeasibilities: self.int_info("num_dual_infeasibilities").unwrap_or(0),
            max_dual_infeasibility: self.double_info("max_dual_infeasibility").unwrap_or(0.0),
            sum_dual_infeasibilities: self.double_info("sum_dual_infeasibilities").unwrap_or(0.0),
        }
    }

    fn solution(&self) -> EngineSolution {
        let value_valid = self.int_info("primal_solution_status").unwrap_or(0) != 0;
        let dual_valid = self.int_info("dual_solution_status").unwrap_or(0) != 0;
        if !value_valid && !dual_valid {
            return EngineSolution::default();
        }

        let (cols, rows) = (self.num_cols(), self.num_rows());
        let mut solution = EngineSolution {
            value_valid,
            dual_valid,
            col_value: vec![0.0; cols],
            col_dual: vec![0.0; cols],
            row_value: vec![0.0; rows],
            row_dual: vec![0.0; rows],
        };
        let status = unsafe {
            Highs_getSolution(
                self.raw(),
                solution.col_value.as_mut_ptr(),
                solution.col_dual.as_mut_ptr(),
                solution.row_value.as_mut_ptr(),
                solution.row_dual.as_mut_ptr(),
            )
        };
        if status == STATUS_ERROR {
            warn!("Highs_getSolution failed, reporting no solution");
            return EngineSolution::default();
        }
        solution
    }

    fn set_solution(&mut self, start: &WarmStart) -> EngineResult<()> {
        let status = unsafe {
            Highs_setSolution(
                self.raw(),
                opt_ptr(&start.primal_columns),
                opt_ptr(&start.primal_rows),
                opt_ptr(&start.dual_columns),
                opt_ptr(&start.dual_rows),
            )
        };
        check(status, "Highs_setSolution")
    }

    fn option_kind(&self, name: &str) -> EngineResult<OptionKind> {
        let c_name = c_string(name, "option name")?;
        let mut kind: HighsInt = -1;
        let status = unsafe { Highs_getOptionType(self.raw(), c_name.as_ptr(), &mut kind) };
        if status != STATUS_OK {
            return Err(EngineFailure::new(format!("unknown option \"{}\"", name)));
        }
        match kind {
            OPTION_TYPE_BOOL => Ok(OptionKind::Bool),
            OPTION_TYPE_INT => Ok(OptionKind::Int),
            OPTION_TYPE_DOUBLE => Ok(OptionKind::Double),
            OPTION_TYPE_STRING => Ok(OptionKind::String),
            other => Err(EngineFailure::new(format!(
                "option \"{}\" has unsupported type {}",
                name, other
            ))),
        }
    }

    fn set_option(&mut self, name: &str, value: &OptionValue) -> EngineResult<()> {
        let c_name = c_string(name, "option name")?;
        let status = unsafe {
            match value {
                OptionValue::Bool(v) => {
                    Highs_setBoolOptionValue(self.raw(), c_name.as_ptr(), HighsInt::from(*v))
                }
                OptionValue::Int(v) => {
                    let v = HighsInt::try_from(*v).map_err(|_| {
                        EngineFailure::new(format!("value {} for option \"{}\" is out of range", v, name))
                    })?;
                    Highs_setIntOptionValue(self.raw(), c_name.as_ptr(), v)
                }
                OptionValue::Double(v) => Highs_setDoubleOptionValue(self.raw(), c_name.as_ptr(), *v),
                OptionValue::String(v) => {
                    let c_value = c_string(v, "option value")?;
                    Highs_setStringOptionValue(self.raw(), c_name.as_ptr(), c_value.as_ptr())
                }
            }
        };
        if status == STATUS_ERROR {
            return Err(EngineFailure::new(format!(
                "option \"{}\" rejected value {:?}",
                name, value
            )));
        }
        Ok(())
    }

    fn option(&self, name: &str) -> EngineResult<OptionValue> {
        let kind = self.option_kind(name)?;
        let c_name = c_string(name, "option name")?;
        let (status, value) = unsafe {
            match kind {
                OptionKind::Bool => {
                    let mut v: HighsInt = 0;
                    let status = Highs_getBoolOptionValue(self.raw(), c_name.as_ptr(), &mut v);
                    (status, OptionValue::Bool(v != 0))
                }
                OptionKind::Int => {
                    let mut v: HighsInt = 0;
                    let status = Highs_getIntOptionValue(self.raw(), c_name.as_ptr(), &mut v);
                    (status, OptionValue::Int(i64::from(v)))
                }
                OptionKind::Double => {
                    let mut v: f64 = 0.0;
                    let status = Highs_getDoubleOptionValue(self.raw(), c_name.as_ptr(), &mut v);
                    (status, OptionValue::Double(v))
                }
                OptionKind::String => {
                    let mut buffer = vec![0 as c_char; MAX_STRING_LENGTH];
                    let status =
                        Highs_getStringOptionValue(self.raw(), c_name.as_ptr(), buffer.as_mut_ptr());
                    let text = CStr::from_ptr(buffer.as_ptr()).to_string_lossy().into_owned();
                    (status, OptionValue::String(text))
                }
            }
        };
        check(status, "Highs_getOptionValue")?;
        Ok(value)
    }

    fn clear_solver(&mut self) -> EngineResult<()> {
        let status = unsafe { Highs_clearSolver(self.raw()) };
        check(status, "Highs_clearSolver")
    }

    fn num_cols(&self) -> usize {
        let n = unsafe { Highs_getNumCol(self.raw()) };
        usize::try_from(n).unwrap_or(0)
    }

    fn num_rows(&self) -> usize {
        let n = unsafe { Highs_getNumRow(self.raw()) };
        usize::try_from(n).unwrap_or(0)
    }

    fn version(&self) -> String {
        highs_version()
    }
}

/// Return the HiGHS library version string.
pub fn highs_version() -> String {
    unsafe {
        let ptr = Highs_version();
        if ptr.is_null() {
            "unknown".to_string()
        } else {
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }
}
