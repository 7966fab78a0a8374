//! Linear-program capability backing the solve operation.
//!
//! The lot lifecycle never depends on anything in here; optimization is an
//! external concern delegated to the simplex backend. The model shape is
//! fixed: minimize `c·x` subject to `A·x >= b` with `x >= 0`.
use super::error::TransferError;
use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};

/// A dense minimization model over non-negative variables.
#[derive(Debug, Clone, PartialEq)]
pub struct LpModel {
    objective: Vec<f64>,
    constraints: Vec<Vec<f64>>,
    rhs: Vec<f64>,
}

impl LpModel {
    pub fn new(
        objective: Vec<f64>,
        constraints: Vec<Vec<f64>>,
        rhs: Vec<f64>,
    ) -> Result<Self, TransferError> {
        if objective.is_empty() {
            return Err(TransferError::invalid("model has no variables"));
        }
        if constraints.is_empty() {
            return Err(TransferError::invalid("model has no constraints"));
        }
        if constraints.len() != rhs.len() {
            return Err(TransferError::invalid(format!(
                "{} constraint rows but {} right-hand sides",
                constraints.len(),
                rhs.len()
            )));
        }
        for (i, row) in constraints.iter().enumerate() {
            if row.len() != objective.len() {
                return Err(TransferError::invalid(format!(
                    "constraint row {i} has {} coefficients, expected {}",
                    row.len(),
                    objective.len()
                )));
            }
        }
        Ok(Self {
            objective,
            constraints,
            rhs,
        })
    }

    /// Build a model from the wire encoding: a comma-separated objective
    /// vector (`"41,35,96"`), a brace-delimited constraint matrix
    /// (`"{{2, 3, 7}, {1, 1, 0}}"`) and a comma-separated right-hand side.
    /// `vars` and `constraints` are the declared dimensions and must match
    /// the parsed data.
    pub fn parse(
        vars: usize,
        constraints: usize,
        objective: &str,
        matrix: &str,
        rhs: &str,
    ) -> Result<Self, TransferError> {
        let objective = parse_vector(objective)?;
        if objective.len() != vars {
            return Err(TransferError::invalid(format!(
                "objective has {} coefficients, expected {vars}",
                objective.len()
            )));
        }

        let matrix = parse_matrix(matrix)?;
        if matrix.len() != constraints {
            return Err(TransferError::invalid(format!(
                "matrix has {} rows, expected {constraints}",
                matrix.len()
            )));
        }

        let rhs = parse_vector(rhs)?;
        Self::new(objective, matrix, rhs)
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Vec<f64>] {
        &self.constraints
    }

    pub fn rhs(&self) -> &[f64] {
        &self.rhs
    }
}

/// Optimal value and variable assignment for a solved model.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub objective: f64,
    pub values: Vec<f64>,
}

#[derive(thiserror::Error, Debug)]
pub enum SolveError {
    #[error("model is infeasible")]
    Infeasible,
    #[error("model is unbounded")]
    Unbounded,
}

impl From<minilp::Error> for SolveError {
    fn from(err: minilp::Error) -> Self {
        match err {
            minilp::Error::Infeasible => SolveError::Infeasible,
            minilp::Error::Unbounded => SolveError::Unbounded,
        }
    }
}

/// Capability interface over an optimization engine.
pub trait Solver {
    fn solve(&self, model: &LpModel) -> Result<LpSolution, SolveError>;
}

/// Default backend, a pure-Rust simplex implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimplexSolver;

impl Solver for SimplexSolver {
    fn solve(&self, model: &LpModel) -> Result<LpSolution, SolveError> {
        let mut problem = Problem::new(OptimizationDirection::Minimize);

        let vars: Vec<_> = model
            .objective
            .iter()
            .map(|&coeff| problem.add_var(coeff, (0.0, f64::INFINITY)))
            .collect();

        for (row, &rhs) in model.constraints.iter().zip(&model.rhs) {
            let mut expr = LinearExpr::empty();
            for (&var, &coeff) in vars.iter().zip(row) {
                expr.add(var, coeff);
            }
            problem.add_constraint(expr, ComparisonOp::Ge, rhs);
        }

        let solution = problem.solve()?;
        Ok(LpSolution {
            objective: solution.objective(),
            values: vars.iter().map(|&var| solution[var]).collect(),
        })
    }
}

fn parse_vector(s: &str) -> Result<Vec<f64>, TransferError> {
    s.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f64>()
                .map_err(|_| TransferError::invalid(format!("\"{part}\" is not a number")))
        })
        .collect()
}

fn parse_matrix(s: &str) -> Result<Vec<Vec<f64>>, TransferError> {
    let body = s
        .trim()
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .ok_or_else(|| TransferError::invalid("matrix must be wrapped in braces"))?;

    let mut rows = Vec::new();
    for chunk in body.split('}') {
        let row = chunk
            .trim()
            .trim_start_matches(',')
            .trim()
            .trim_start_matches('{');
        if row.trim().is_empty() {
            continue;
        }
        rows.push(parse_vector(row)?);
    }
    Ok(rows)
}
