use thiserror::Error;

use crate::solution::VariableKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Problem is infeasible: an artificial variable remains positive at optimality")]
    Infeasible,
    #[error("Problem is unbounded: no row limits entering {kind:?} variable {index}")]
    Unbounded { kind: VariableKind, index: usize },
    #[error("Simplex did not converge after {iterations} iterations")]
    DidNotConverge { iterations: usize },
    #[error("Solver deadline exceeded")]
    DeadlineExceeded,
    #[error("No feasible integer solution exists")]
    NoIntegerSolution,
    #[error("Branch-and-bound node limit of {nodes} reached")]
    NodeLimitExceeded { nodes: usize },
    #[error("Constraint {constraint} has {found} coefficients, expected {expected}")]
    DimensionMismatch {
        constraint: String,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite value in {location}")]
    NonFinite { location: String },
}

impl SolveError {
    /// Whether a relaxation has no feasible point, which branch-and-bound
    /// treats as a pruned branch.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveError::Infeasible)
    }
}
