use std::time::Instant;

use log::{debug, trace};

use crate::error::SolveError;
use crate::problem::{LpProblem, Relation};
use crate::solution::{Solution, Variable, VariableKind};

/// Default penalty for artificial variables.
///
/// Must stay several orders of magnitude above any feasible objective value,
/// yet small enough that `M * coefficient` keeps integer resolution in an
/// `f64` (below about 1e15 / max |coefficient|). Inputs with coefficients and
/// right-hand sides up to roughly 1e3 are safe with the default.
pub const DEFAULT_BIG_M: f64 = 1e11;

/// Default tolerance for every comparison against zero.
pub const DEFAULT_EPSILON: f64 = 1e-7;

/// Big-M simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Penalty coefficient for artificial variables
    big_m: f64,
    /// Tolerance for floating point comparisons
    epsilon: f64,
    /// Maximum pivots before giving up
    max_iterations: usize,
    /// Wall-clock limit checked between pivots
    deadline: Option<Instant>,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            big_m: DEFAULT_BIG_M,
            epsilon: DEFAULT_EPSILON,
            max_iterations: 10000,
            deadline: None,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_big_m(mut self, big_m: f64) -> Self {
        self.big_m = big_m;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub(crate) fn check_deadline(&self) -> Result<(), SolveError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(SolveError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Solve the LP relaxation of `problem`.
    ///
    /// The tableau always maximizes; minimization negates the objective.
    /// Fails with [`SolveError::Infeasible`] when an artificial variable is
    /// still basic with a positive value once no column improves.
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, SolveError> {
        self.validate(problem)?;

        let mut tableau = self.build_tableau(problem);
        debug!(
            "simplex: {} rows, {} columns ({} structural)",
            tableau.rhs.len(),
            tableau.columns.len(),
            problem.num_variables()
        );

        let mut iterations = 0;
        loop {
            tableau.compute_reduced_costs();

            let Some(pivot_col) = tableau.pivot_column(self.epsilon) else {
                break;
            };
            if iterations >= self.max_iterations {
                return Err(SolveError::DidNotConverge { iterations });
            }
            self.check_deadline()?;

            let entering = tableau.columns[pivot_col];
            let Some(pivot_row) = tableau.pivot_row(pivot_col, self.epsilon) else {
                return Err(SolveError::Unbounded {
                    kind: entering.kind,
                    index: entering.index,
                });
            };

            trace!(
                "simplex: pivot {} enters {:?}#{} at row {}, {:?}#{} leaves",
                iterations,
                entering.kind,
                entering.index,
                pivot_row,
                tableau.basis[pivot_row].kind,
                tableau.basis[pivot_row].index
            );
            tableau.pivot(pivot_row, pivot_col);
            iterations += 1;
        }

        let stuck = tableau
            .basis
            .iter()
            .zip(&tableau.rhs)
            .any(|(v, b)| v.is_artificial() && b.abs() > self.epsilon);
        if stuck {
            debug!("simplex: infeasible after {} iterations", iterations);
            return Err(SolveError::Infeasible);
        }

        debug!("simplex: optimal after {} iterations", iterations);
        Ok(Solution {
            basis: tableau.basis,
            rhs: tableau.rhs,
            iterations,
        })
    }

    fn validate(&self, problem: &LpProblem) -> Result<(), SolveError> {
        let n_vars = problem.num_variables();

        if problem.objective.coefficients.len() != n_vars {
            return Err(SolveError::DimensionMismatch {
                constraint: "objective".to_string(),
                expected: n_vars,
                found: problem.objective.coefficients.len(),
            });
        }
        if problem.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SolveError::NonFinite {
                location: "objective".to_string(),
            });
        }

        for c in &problem.constraints {
            if c.coefficients.len() != n_vars {
                return Err(SolveError::DimensionMismatch {
                    constraint: c.name.clone(),
                    expected: n_vars,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|x| !x.is_finite()) {
                return Err(SolveError::NonFinite {
                    location: c.name.clone(),
                });
            }
        }

        Ok(())
    }

    fn build_tableau(&self, problem: &LpProblem) -> Tableau {
        let n_vars = problem.num_variables();
        let sign = if problem.objective.minimize { -1.0 } else { 1.0 };

        let mut columns: Vec<Variable> = problem
            .objective
            .coefficients
            .iter()
            .enumerate()
            .map(|(j, &c)| Variable::structural(j, if c == 0.0 { 0.0 } else { sign * c }))
            .collect();
        let mut matrix = Vec::with_capacity(problem.num_constraints());
        let mut rhs = Vec::with_capacity(problem.num_constraints());
        let mut basis = Vec::with_capacity(problem.num_constraints());

        for (i, c) in problem.constraints.iter().enumerate() {
            // Keep every initial basic value non-negative
            let (row, relation, b) = if c.rhs < 0.0 {
                let negated = c
                    .coefficients
                    .iter()
                    .map(|&x| if x == 0.0 { 0.0 } else { -x })
                    .collect();
                (negated, c.relation.flipped(), -c.rhs)
            } else {
                (c.coefficients.clone(), c.relation, c.rhs)
            };
            matrix.push(row);
            rhs.push(b);

            match relation {
                Relation::Le => {
                    let s = Variable::slack(i);
                    columns.push(s);
                    basis.push(s);
                }
                Relation::Ge => {
                    let a = Variable::artificial(i, self.big_m);
                    columns.push(Variable::surplus(i));
                    columns.push(a);
                    basis.push(a);
                }
                Relation::Eq => {
                    let a = Variable::artificial(i, self.big_m);
                    columns.push(a);
                    basis.push(a);
                }
            }
        }

        // Auxiliary columns are unit columns in their own row
        for (i, row) in matrix.iter_mut().enumerate() {
            row.extend(columns[n_vars..].iter().map(|v| {
                if v.index != i {
                    0.0
                } else if v.kind == VariableKind::Surplus {
                    -1.0
                } else {
                    1.0
                }
            }));
        }

        Tableau {
            columns,
            matrix,
            rhs,
            basis,
            zj: Vec::new(),
            reduced_costs: Vec::new(),
        }
    }
}

/// Working state of a single solve. Built fresh per call.
struct Tableau {
    /// Live columns, in lockstep with the matrix columns
    columns: Vec<Variable>,
    matrix: Vec<Vec<f64>>,
    rhs: Vec<f64>,
    /// One basic variable per row
    basis: Vec<Variable>,
    zj: Vec<f64>,
    /// c_j - z_j per column
    reduced_costs: Vec<f64>,
}

impl Tableau {
    fn compute_reduced_costs(&mut self) {
        self.zj.clear();
        self.reduced_costs.clear();

        for (col, var) in self.columns.iter().enumerate() {
            let z: f64 = self
                .basis
                .iter()
                .zip(&self.matrix)
                .map(|(b, row)| b.coefficient * row[col])
                .sum();
            self.zj.push(z);
            self.reduced_costs.push(var.coefficient - z);
        }
    }

    /// Column with the largest positive reduced cost, leftmost on ties.
    fn pivot_column(&self, epsilon: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (j, &r) in self.reduced_costs.iter().enumerate() {
            if r > epsilon && best.is_none_or(|(_, max)| r > max) {
                best = Some((j, r));
            }
        }
        best.map(|(j, _)| j)
    }

    /// Minimum ratio test over rows with a positive entry in `col`.
    fn pivot_row(&self, col: usize, epsilon: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, (row, &b)) in self.matrix.iter().zip(&self.rhs).enumerate() {
            let entry = row[col];
            if entry <= epsilon {
                continue;
            }
            let ratio = (b / entry).abs();
            if best.is_none_or(|(_, min)| ratio < min) {
                best = Some((i, ratio));
            }
        }
        best.map(|(i, _)| i)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        // Scale pivot row
        let pivot_value = self.matrix[row][col];
        if pivot_value != 1.0 {
            for (j, entry) in self.matrix[row].iter_mut().enumerate() {
                if j == col {
                    *entry = 1.0;
                } else if *entry != 0.0 {
                    *entry /= pivot_value;
                }
            }
            if self.rhs[row] != 0.0 {
                self.rhs[row] /= pivot_value;
            }
        }

        // Eliminate column in other rows
        let pivot_row = self.matrix[row].clone();
        let pivot_rhs = self.rhs[row];
        for i in 0..self.matrix.len() {
            let factor = self.matrix[i][col];
            if i == row || factor == 0.0 {
                continue;
            }
            let multiplier = -factor;
            for (entry, &p) in self.matrix[i].iter_mut().zip(&pivot_row) {
                if p != 0.0 {
                    *entry += p * multiplier;
                }
            }
            self.matrix[i][col] = 0.0;
            if pivot_rhs != 0.0 {
                self.rhs[i] += pivot_rhs * multiplier;
            }
        }

        let entering = self.columns[col];
        let leaving = std::mem::replace(&mut self.basis[row], entering);

        // An artificial that leaves never comes back
        if leaving.is_artificial() {
            self.remove_column(&leaving);
        }
    }

    fn remove_column(&mut self, var: &Variable) {
        let Some(col) = self.columns.iter().position(|v| v.same_column(var)) else {
            return;
        };
        self.columns.remove(col);
        for row in &mut self.matrix {
            row.remove(col);
        }
    }
}
