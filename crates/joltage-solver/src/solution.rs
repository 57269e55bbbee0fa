use crate::problem::Objective;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// An original decision variable
    Structural,
    /// Added for `<=` rows
    Slack,
    /// Added for `>=` rows
    Surplus,
    /// Added for `=` and `>=` rows, penalized with Big-M
    Artificial,
}

/// A tableau column.
///
/// `index` is the decision variable's position for structural variables and
/// the owning constraint row for auxiliary ones, so `(kind, index)` identifies
/// a column uniquely for the lifetime of a solve.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub kind: VariableKind,
    pub index: usize,
    /// Objective coefficient in the internal (maximizing) form
    pub coefficient: f64,
}

impl Variable {
    pub fn structural(index: usize, coefficient: f64) -> Self {
        Self { kind: VariableKind::Structural, index, coefficient }
    }

    pub fn slack(row: usize) -> Self {
        Self { kind: VariableKind::Slack, index: row, coefficient: 0.0 }
    }

    pub fn surplus(row: usize) -> Self {
        Self { kind: VariableKind::Surplus, index: row, coefficient: 0.0 }
    }

    pub fn artificial(row: usize, big_m: f64) -> Self {
        Self { kind: VariableKind::Artificial, index: row, coefficient: -big_m }
    }

    pub fn is_structural(&self) -> bool {
        self.kind == VariableKind::Structural
    }

    pub fn is_artificial(&self) -> bool {
        self.kind == VariableKind::Artificial
    }

    /// Same column, ignoring the coefficient.
    pub fn same_column(&self, other: &Variable) -> bool {
        self.kind == other.kind && self.index == other.index
    }
}

/// Optimal basic feasible solution of an LP relaxation.
///
/// `basis[i]` is the variable solved by row `i` and `rhs[i]` its value.
/// Non-basic variables are zero.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub basis: Vec<Variable>,
    pub rhs: Vec<f64>,
    /// Number of pivots performed
    pub iterations: usize,
}

impl Solution {
    /// Value of a decision variable, zero if it is non-basic.
    pub fn value_of(&self, variable: usize) -> f64 {
        self.basis
            .iter()
            .zip(&self.rhs)
            .find(|(v, _)| v.is_structural() && v.index == variable)
            .map(|(_, &value)| value)
            .unwrap_or(0.0)
    }

    /// Dense assignment of the first `num_variables` decision variables.
    pub fn values(&self, num_variables: usize) -> Vec<f64> {
        let mut values = vec![0.0; num_variables];
        for (v, &value) in self.basis.iter().zip(&self.rhs) {
            if v.is_structural() && v.index < num_variables {
                values[v.index] = value;
            }
        }
        values
    }

    pub fn objective_value(&self, objective: &Objective) -> f64 {
        self.basis
            .iter()
            .zip(&self.rhs)
            .filter(|(v, _)| v.is_structural())
            .map(|(v, value)| objective.coefficients.get(v.index).copied().unwrap_or(0.0) * value)
            .sum()
    }
}

/// Result of branch-and-bound.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerSolution {
    /// Decision variable values, rounded to the nearest integer
    pub values: Vec<f64>,
    pub objective_value: f64,
    /// Number of relaxations solved, including pruned ones
    pub nodes_explored: usize,
}
