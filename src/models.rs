use serde::{Deserialize, Serialize};

pub use crate::domain::sparse::SparseRow;

// ---------- Model (wire) types: owned & serde-friendly ----------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    #[default]
    Continuous,
    Integer,
    SemiContinuous,
    SemiInteger,
    ImplicitInteger,
}

impl VariableType {
    /// Integrality code understood by the native engine.
    pub fn code(self) -> i32 {
        match self {
            VariableType::Continuous => 0,
            VariableType::Integer => 1,
            VariableType::SemiContinuous => 2,
            VariableType::SemiInteger => 3,
            VariableType::ImplicitInteger => 4,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Objective {
    #[serde(default)]
    pub is_maximization: bool,
    #[serde(default)]
    pub weights: SparseRow,
    #[serde(default)]
    pub offset: f64,
    /// Lower-triangular Hessian, one sparse column per variable that has
    /// quadratic terms. The objective is `c'x + 0.5 x'Qx + offset`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hessian: Vec<SparseRow>,
}

impl Objective {
    pub fn minimize(weights: SparseRow) -> Self {
        Objective {
            is_maximization: false,
            weights,
            offset: 0.0,
            hessian: Vec::new(),
        }
    }

    pub fn maximize(weights: SparseRow) -> Self {
        Objective {
            is_maximization: true,
            ..Objective::minimize(weights)
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Add quadratic monomials `coefficient * x_i * x_j`.
    ///
    /// `x_i^2` contributes `2 * coefficient` to `Q[i][i]`, a cross term
    /// contributes `coefficient` to `Q[max(i,j)][min(i,j)]`. Repeated pairs add up.
    pub fn with_quadratic(mut self, terms: &[(usize, usize, f64)]) -> Self {
        let mut entries: Vec<(usize, usize, f64)> = Vec::new();
        for (col, column) in self.hessian.iter().enumerate() {
            entries.extend(column.iter().map(|(row, value)| (col, row, value)));
        }
        for &(i, j, coefficient) in terms {
            let (col, row) = (i.min(j), i.max(j));
            let value = if i == j { 2.0 * coefficient } else { coefficient };
            entries.push((col, row, value));
        }
        entries.sort_by_key(|&(col, row, _)| (col, row));

        let columns = entries.iter().map(|&(col, _, _)| col + 1).max().unwrap_or(0);
        let mut merged: Vec<Vec<(usize, f64)>> = vec![Vec::new(); columns];
        for (col, row, value) in entries {
            match merged[col].last_mut() {
                Some((last_row, last_value)) if *last_row == row => *last_value += value,
                _ => merged[col].push((row, value)),
            }
        }

        self.hessian = merged.iter().map(|pairs| SparseRow::from_pairs(pairs)).collect();
        self
    }

    pub fn is_quadratic(&self) -> bool {
        self.hessian.iter().any(|column| !column.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Variable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub var_type: VariableType,
    #[serde(default = "bounds::negative_infinity", with = "bounds::lower")]
    pub lower_bound: f64,
    #[serde(default = "bounds::positive_infinity", with = "bounds::upper")]
    pub upper_bound: f64,
}

impl Variable {
    pub fn new(var_type: VariableType) -> Self {
        Variable {
            name: None,
            var_type,
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
        }
    }

    pub fn continuous() -> Self {
        Variable::new(VariableType::Continuous)
    }

    pub fn integer() -> Self {
        Variable::new(VariableType::Integer)
    }

    pub fn with_bounds(mut self, lower_bound: f64, upper_bound: f64) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    /// Name used for the column in written model files.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Default for Variable {
    fn default() -> Self {
        Variable::continuous()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Constraint {
    pub weights: SparseRow,
    #[serde(default = "bounds::negative_infinity", with = "bounds::lower")]
    pub lower_bound: f64,
    #[serde(default = "bounds::positive_infinity", with = "bounds::upper")]
    pub upper_bound: f64,
}

impl Constraint {
    /// A free row: both bounds infinite.
    pub fn new(weights: SparseRow) -> Self {
        Constraint {
            weights,
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
        }
    }

    pub fn with_bounds(mut self, lower_bound: f64, upper_bound: f64) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    pub fn less_eq(weights: SparseRow, rhs: f64) -> Self {
        Constraint::new(weights).with_bounds(f64::NEG_INFINITY, rhs)
    }

    pub fn greater_eq(weights: SparseRow, rhs: f64) -> Self {
        Constraint::new(weights).with_bounds(rhs, f64::INFINITY)
    }

    pub fn equal(weights: SparseRow, rhs: f64) -> Self {
        Constraint::new(weights).with_bounds(rhs, rhs)
    }
}

/// A variable added to an already loaded model, together with its objective
/// cost and its coefficients in existing constraints (indexed by row).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Column {
    pub variable: Variable,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub weights: SparseRow,
}

impl Column {
    pub fn new(variable: Variable, cost: f64, weights: SparseRow) -> Self {
        Column {
            variable,
            cost,
            weights,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Model {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<Objective>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl Model {
    pub fn new() -> Self {
        Model::default()
    }

    /// Append a variable and return its index.
    pub fn add_variable(&mut self, variable: Variable) -> usize {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    /// Append a constraint and return its index.
    pub fn add_constraint(&mut self, constraint: Constraint) -> usize {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.constraints.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Candidate starting point. Each supplied array must match the loaded
/// model's column or row count exactly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WarmStart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primal_columns: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primal_rows: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dual_columns: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dual_rows: Option<Vec<f64>>,
}

impl WarmStart {
    pub fn new() -> Self {
        WarmStart::default()
    }

    pub fn with_primal_columns(mut self, values: Vec<f64>) -> Self {
        self.primal_columns = Some(values);
        self
    }

    pub fn with_primal_rows(mut self, values: Vec<f64>) -> Self {
        self.primal_rows = Some(values);
        self
    }

    pub fn with_dual_columns(mut self, values: Vec<f64>) -> Self {
        self.dual_columns = Some(values);
        self
    }

    pub fn with_dual_rows(mut self, values: Vec<f64>) -> Self {
        self.dual_rows = Some(values);
        self
    }

    pub fn has_primal(&self) -> bool {
        self.primal_columns.is_some() || self.primal_rows.is_some()
    }

    pub fn has_dual(&self) -> bool {
        self.dual_columns.is_some() || self.dual_rows.is_some()
    }
}

// JSON has no infinity; an infinite bound travels as `null`.
mod bounds {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn negative_infinity() -> f64 {
        f64::NEG_INFINITY
    }

    pub fn positive_infinity() -> f64 {
        f64::INFINITY
    }

    fn serialize_bound<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub mod lower {
        use super::*;

        pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_bound(value, serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NEG_INFINITY))
        }
    }

    pub mod upper {
        use super::*;

        pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
            serialize_bound(value, serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_defaults_should_be_continuous_and_free() {
        let variable = Variable::default();
        assert_eq!(variable.var_type, VariableType::Continuous);
        assert_eq!(variable.lower_bound, f64::NEG_INFINITY);
        assert_eq!(variable.upper_bound, f64::INFINITY);
    }

    #[test]
    fn test_with_quadratic_given_monomials_should_build_lower_triangular_hessian() {
        // x^2 + 4xy + 4y^2
        let objective = Objective::minimize(SparseRow::from_dense(&[-2.0, -12.0]))
            .with_offset(26.0)
            .with_quadratic(&[(0, 0, 1.0), (0, 1, 4.0), (1, 1, 4.0)]);

        assert_eq!(objective.hessian.len(), 2);
        assert_eq!(objective.hessian[0].indices, vec![0, 1]);
        assert_eq!(objective.hessian[0].values, vec![2.0, 4.0]);
        assert_eq!(objective.hessian[1].indices, vec![1]);
        assert_eq!(objective.hessian[1].values, vec![8.0]);
        assert!(objective.is_quadratic());
    }

    #[test]
    fn test_with_quadratic_given_repeated_and_swapped_pairs_should_merge() {
        let objective = Objective::minimize(SparseRow::new())
            .with_quadratic(&[(1, 0, 1.0)])
            .with_quadratic(&[(0, 1, 2.0)]);
        assert_eq!(objective.hessian[0].indices, vec![1]);
        assert_eq!(objective.hessian[0].values, vec![3.0]);
    }

    #[test]
    fn test_model_builder_should_return_positional_indices() {
        let mut model = Model::new();
        assert!(model.is_empty());
        let x = model.add_variable(Variable::continuous().with_bounds(0.0, 1.0));
        let y = model.add_variable(Variable::integer());
        let row = model.add_constraint(Constraint::less_eq(
            SparseRow::from_pairs(&[(x, 1.0), (y, 1.0)]),
            4.0,
        ));
        assert_eq!((x, y, row), (0, 1, 0));
        assert_eq!(model.num_variables(), 2);
        assert_eq!(model.num_constraints(), 1);
    }

    #[test]
    fn test_model_json_given_infinite_bounds_should_round_trip_through_null() {
        let mut model = Model::new();
        model.add_variable(Variable::continuous().with_bounds(0.0, f64::INFINITY));
        model.add_constraint(Constraint::greater_eq(SparseRow::from_dense(&[1.0]), 2.0));
        model.set_objective(Objective::maximize(SparseRow::from_dense(&[3.0])));

        let json = model.to_json().unwrap();
        assert!(json.contains("\"upper_bound\":null"));
        assert_eq!(Model::from_json(&json).unwrap(), model);
    }

    #[test]
    fn test_model_json_given_missing_fields_should_use_defaults() {
        let model = Model::from_json(
            r#"{"variables":[{"type":"integer","lower_bound":0}],
                "constraints":[{"weights":{"indices":[0],"values":[1.0]},"upper_bound":5}]}"#,
        )
        .unwrap();
        assert!(model.objective.is_none());
        assert_eq!(model.variables[0].var_type, VariableType::Integer);
        assert_eq!(model.variables[0].upper_bound, f64::INFINITY);
        assert_eq!(model.constraints[0].lower_bound, f64::NEG_INFINITY);
        assert_eq!(model.constraints[0].upper_bound, 5.0);
    }

    #[test]
    fn test_warm_start_builder_should_track_supplied_parts() {
        let start = WarmStart::new().with_dual_rows(vec![1.0]);
        assert!(!start.has_primal());
        assert!(start.has_dual());
    }
}
