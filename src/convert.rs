use crate::domain::error::{Result, SolverError};
use crate::domain::validate::validate_sparse_row;
use crate::models::{Column, Constraint, Model, Objective, SparseRow, VariableType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    ColumnWise,
    RowWise,
}

impl MatrixFormat {
    pub fn code(self) -> i32 {
        match self {
            MatrixFormat::ColumnWise => 1,
            MatrixFormat::RowWise => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjectiveSense {
    pub fn code(self) -> i32 {
        match self {
            ObjectiveSense::Minimize => 1,
            ObjectiveSense::Maximize => -1,
        }
    }
}

/// Compressed sparse matrix: entries of line `k` (a row or a column,
/// depending on `format`) live in `indices[offsets[k]..offsets[k + 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedMatrix {
    pub format: MatrixFormat,
    pub offsets: Vec<usize>,
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl CompressedMatrix {
    pub fn empty(format: MatrixFormat) -> Self {
        CompressedMatrix {
            format,
            offsets: vec![0],
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Stack sparse lines, checking each index against `bound`.
    pub fn from_lines<'a, I>(format: MatrixFormat, lines: I, bound: usize, what: &str) -> Result<Self>
    where
        I: IntoIterator<Item = &'a SparseRow>,
    {
        let mut matrix = CompressedMatrix::empty(format);
        for (line, row) in lines.into_iter().enumerate() {
            validate_sparse_row(row, bound, &format!("{} {}", what, line))?;
            matrix.indices.extend_from_slice(&row.indices);
            matrix.values.extend_from_slice(&row.values);
            matrix.offsets.push(matrix.indices.len());
        }
        Ok(matrix)
    }

    /// Number of rows (row-wise) or columns (column-wise).
    pub fn num_lines(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn num_nz(&self) -> usize {
        self.values.len()
    }

    pub fn line(&self, k: usize) -> (&[usize], &[f64]) {
        let range = self.offsets[k]..self.offsets[k + 1];
        (&self.indices[range.clone()], &self.values[range])
    }
}

/// A model flattened into the arrays a native engine consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatModel {
    pub num_col: usize,
    pub num_row: usize,
    pub sense: ObjectiveSense,
    pub offset: f64,
    pub col_cost: Vec<f64>,
    pub col_lower: Vec<f64>,
    pub col_upper: Vec<f64>,
    pub row_lower: Vec<f64>,
    pub row_upper: Vec<f64>,
    /// Constraint matrix, row-wise.
    pub a_matrix: CompressedMatrix,
    /// Lower triangle of the Hessian, column-wise. `None` for linear objectives.
    pub hessian: Option<CompressedMatrix>,
    /// Column names. `None` when no variable is named; unnamed columns of a
    /// partly named model get `c<index>`.
    pub col_names: Option<Vec<String>>,
    /// Integrality codes. `None` when every variable is continuous.
    pub integrality: Option<Vec<i32>>,
}

/// Constraints appended to a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBatch {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub matrix: CompressedMatrix,
}

impl RowBatch {
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }
}

/// Variables appended to a loaded model.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBatch {
    pub costs: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub matrix: CompressedMatrix,
    pub integrality: Vec<i32>,
}

impl ColumnBatch {
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

/// Convert a Model into flat arrays, validating every index on the way.
pub fn to_flat_model(model: &Model) -> Result<FlatModel> {
    let num_col = model.variables.len();
    let num_row = model.constraints.len();

    let (sense, offset, col_cost, hessian) = match &model.objective {
        Some(objective) => {
            let hessian = to_hessian(objective, num_col)?;
            validate_sparse_row(&objective.weights, num_col, "objective")?;
            (
                sense_of(objective),
                objective.offset,
                objective.weights.to_dense(num_col),
                hessian,
            )
        }
        None => (ObjectiveSense::Minimize, 0.0, vec![0.0; num_col], None),
    };

    let a_matrix = CompressedMatrix::from_lines(
        MatrixFormat::RowWise,
        model.constraints.iter().map(|c| &c.weights),
        num_col,
        "constraint",
    )?;

    let integrality = model
        .variables
        .iter()
        .any(|v| v.var_type != VariableType::Continuous)
        .then(|| model.variables.iter().map(|v| v.var_type.code()).collect());

    let col_names = model.variables.iter().any(|v| v.name.is_some()).then(|| {
        model
            .variables
            .iter()
            .enumerate()
            .map(|(col, v)| v.name.clone().unwrap_or_else(|| format!("c{}", col)))
            .collect()
    });

    Ok(FlatModel {
        num_col,
        num_row,
        sense,
        offset,
        col_cost,
        col_lower: model.variables.iter().map(|v| v.lower_bound).collect(),
        col_upper: model.variables.iter().map(|v| v.upper_bound).collect(),
        row_lower: model.constraints.iter().map(|c| c.lower_bound).collect(),
        row_upper: model.constraints.iter().map(|c| c.upper_bound).collect(),
        a_matrix,
        hessian,
        col_names,
        integrality,
    })
}

/// Flatten constraints to append to a model with `num_cols` columns.
pub fn to_row_batch(rows: &[Constraint], num_cols: usize) -> Result<RowBatch> {
    let matrix = CompressedMatrix::from_lines(
        MatrixFormat::RowWise,
        rows.iter().map(|c| &c.weights),
        num_cols,
        "new constraint",
    )?;
    Ok(RowBatch {
        lower: rows.iter().map(|c| c.lower_bound).collect(),
        upper: rows.iter().map(|c| c.upper_bound).collect(),
        matrix,
    })
}

/// Flatten columns to append to a model with `num_rows` rows.
pub fn to_column_batch(columns: &[Column], num_rows: usize) -> Result<ColumnBatch> {
    let matrix = CompressedMatrix::from_lines(
        MatrixFormat::ColumnWise,
        columns.iter().map(|c| &c.weights),
        num_rows,
        "new column",
    )?;
    Ok(ColumnBatch {
        costs: columns.iter().map(|c| c.cost).collect(),
        lower: columns.iter().map(|c| c.variable.lower_bound).collect(),
        upper: columns.iter().map(|c| c.variable.upper_bound).collect(),
        matrix,
        integrality: columns.iter().map(|c| c.variable.var_type.code()).collect(),
    })
}

fn sense_of(objective: &Objective) -> ObjectiveSense {
    if objective.is_maximization {
        ObjectiveSense::Maximize
    } else {
        ObjectiveSense::Minimize
    }
}

fn to_hessian(objective: &Objective, num_col: usize) -> Result<Option<CompressedMatrix>> {
    if !objective.is_quadratic() {
        return Ok(None);
    }
    if objective.hessian.len() > num_col {
        return Err(SolverError::InvalidModel(format!(
            "hessian has {} columns but the model has {} variables",
            objective.hessian.len(),
            num_col
        )));
    }

    let padding = vec![SparseRow::default(); num_col - objective.hessian.len()];
    let hessian = CompressedMatrix::from_lines(
        MatrixFormat::ColumnWise,
        objective.hessian.iter().chain(padding.iter()),
        num_col,
        "hessian column",
    )?;

    for col in 0..hessian.num_lines() {
        let (rows, _) = hessian.line(col);
        if let Some(&row) = rows.iter().find(|&&row| row < col) {
            return Err(SolverError::InvalidModel(format!(
                "hessian entry ({}, {}) is above the diagonal",
                row, col
            )));
        }
    }

    Ok(Some(hessian))
}
