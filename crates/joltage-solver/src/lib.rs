mod branch;
mod error;
mod problem;
mod simplex;
mod solution;

pub use branch::BranchAndBound;
pub use error::SolveError;
pub use problem::{Constraint, LpProblem, Objective, Relation};
pub use simplex::{DEFAULT_BIG_M, DEFAULT_EPSILON, Solver};
pub use solution::{IntegerSolution, Solution, Variable, VariableKind};
