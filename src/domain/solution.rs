use serde::{Deserialize, Serialize};

use crate::domain::solver::EngineSolution;
use crate::domain::sparse::{sparse_row, SparseRow};
use crate::domain::status::SolutionStatus;
use crate::models::WarmStart;

/// Values attached to variables and constraints, keyed by their position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SolutionValues {
    pub variables: SparseRow,
    pub constraints: SparseRow,
}

impl SolutionValues {
    pub fn from_dense(variables: &[f64], constraints: &[f64]) -> Self {
        SolutionValues {
            variables: SparseRow::from_dense(variables),
            constraints: SparseRow::from_dense(constraints),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.constraints.is_empty()
    }
}

/// Primal values and, when the engine holds a valid dual point, dual values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Solution {
    pub is_value_valid: bool,
    pub is_dual_valid: bool,
    pub primal: SolutionValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dual: Option<SolutionValues>,
}

impl Solution {
    /// The invalid, empty solution reported before any solve.
    pub fn empty() -> Self {
        Solution::default()
    }

    pub fn from_engine(raw: &EngineSolution) -> Self {
        let primal = if raw.value_valid {
            SolutionValues::from_dense(&raw.col_value, &raw.row_value)
        } else {
            SolutionValues::default()
        };
        let dual = raw
            .dual_valid
            .then(|| SolutionValues::from_dense(&raw.col_dual, &raw.row_dual));

        Solution {
            is_value_valid: raw.value_valid,
            is_dual_valid: raw.dual_valid,
            primal,
            dual,
        }
    }

    /// A warm start, taken as the provisional solution until the next solve.
    pub fn from_warm_start(start: &WarmStart) -> Self {
        let mut solution = Solution::empty();
        solution.apply_warm_start(start);
        solution
    }

    /// Overwrite the arrays `start` supplies and keep the others, the way the
    /// engine treats a partial starting point.
    pub fn apply_warm_start(&mut self, start: &WarmStart) {
        let compress = |values: &[f64]| sparse_row(values.iter().copied(), None);

        if let Some(values) = &start.primal_columns {
            self.primal.variables = compress(values);
        }
        if let Some(values) = &start.primal_rows {
            self.primal.constraints = compress(values);
        }
        self.is_value_valid |= start.has_primal();

        if start.has_dual() {
            let dual = self.dual.get_or_insert_with(SolutionValues::default);
            if let Some(values) = &start.dual_columns {
                dual.variables = compress(values);
            }
            if let Some(values) = &start.dual_rows {
                dual.constraints = compress(values);
            }
            self.is_dual_valid = true;
        }
    }
}

/// Diagnostics reported by the engine after a solve. All zero before one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Info {
    pub valid: bool,
    pub basis_validity: i32,
    pub primal_solution_status: i32,
    pub dual_solution_status: i32,
    pub objective_function_value: f64,
    pub mip_dual_bound: f64,
    pub mip_gap: f64,
    pub mip_node_count: i64,
    pub simplex_iteration_count: i32,
    pub ipm_iteration_count: i32,
    pub crossover_iteration_count: i32,
    pub qp_iteration_count: i32,
    pub num_primal_infeasibilities: i32,
    pub max_primal_infeasibility: f64,
    pub sum_primal_infeasibilities: f64,
    pub num_dual_infeasibilities: i32,
    pub max_dual_infeasibility: f64,
    pub sum_dual_infeasibilities: f64,
}

impl Info {
    pub fn primal_status(&self) -> SolutionStatus {
        SolutionStatus::from_code(self.primal_solution_status)
    }

    pub fn dual_status(&self) -> SolutionStatus {
        SolutionStatus::from_code(self.dual_solution_status)
    }
}
