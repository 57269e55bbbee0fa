use log::{debug, info};

use crate::error::SolveError;
use crate::problem::{LpProblem, Relation};
use crate::simplex::Solver;
use crate::solution::{IntegerSolution, Solution};

/// Depth-first branch-and-bound over the simplex relaxation.
///
/// Each node re-solves its relaxation from scratch; no state is shared
/// between nodes. There is no bound-based pruning, only infeasible branches
/// are cut.
#[derive(Debug, Clone, Default)]
pub struct BranchAndBound {
    solver: Solver,
    /// Relaxations to solve before giving up
    max_nodes: Option<usize>,
}

impl BranchAndBound {
    pub fn new(solver: Solver) -> Self {
        Self { solver, max_nodes: None }
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = Some(max);
        self
    }

    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Best integer-feasible objective value of `problem`.
    ///
    /// Returns the minimum when the objective minimizes and the maximum
    /// otherwise. An infeasible root relaxation is reported as
    /// [`SolveError::Infeasible`]; a feasible root whose branches are all
    /// infeasible as [`SolveError::NoIntegerSolution`].
    ///
    /// A feasible relaxation over an unbounded region with no integer point
    /// (e.g. `2x - 2y = 1`) branches forever. Bound the search with a solver
    /// deadline or [`BranchAndBound::with_max_nodes`].
    pub fn find_integer_optimum(&self, problem: &LpProblem) -> Result<IntegerSolution, SolveError> {
        let n_vars = problem.num_variables();
        let minimize = problem.objective.minimize;

        // Floor child is pushed last so it is explored first
        let mut stack = vec![problem.clone()];
        let mut incumbent: Option<(Vec<f64>, f64)> = None;
        let mut nodes = 0;

        while let Some(node) = stack.pop() {
            self.solver.check_deadline()?;
            if self.max_nodes.is_some_and(|max| nodes >= max) {
                return Err(SolveError::NodeLimitExceeded { nodes });
            }
            nodes += 1;

            let relaxation = match self.solver.solve(&node) {
                Ok(solution) => solution,
                Err(e) if e.is_infeasible() && nodes > 1 => {
                    debug!("branch: node {} pruned ({} bounds)", nodes, node.num_constraints() - problem.num_constraints());
                    continue;
                }
                Err(e) => return Err(e),
            };

            match self.branching_variable(&relaxation) {
                None => {
                    let values: Vec<f64> = relaxation.values(n_vars).iter().map(|v| v.round()).collect();
                    let objective = problem.objective_value(&values);
                    debug!("branch: node {} integral with objective {}", nodes, objective);

                    let improves = match &incumbent {
                        None => true,
                        Some((_, best)) if minimize => objective < *best,
                        Some((_, best)) => objective > *best,
                    };
                    if improves {
                        incumbent = Some((values, objective));
                    }
                }
                Some((variable, value)) => {
                    debug!("branch: node {} splits {} = {}", nodes, problem.variable_name(variable), value);
                    stack.push(node.with_bound(variable, Relation::Ge, value.ceil()));
                    stack.push(node.with_bound(variable, Relation::Le, value.floor()));
                }
            }
        }

        let (values, objective_value) = incumbent.ok_or(SolveError::NoIntegerSolution)?;
        info!("branch: integer optimum {} after {} nodes", objective_value, nodes);

        Ok(IntegerSolution {
            values,
            objective_value,
            nodes_explored: nodes,
        })
    }

    /// Basic structural variable with the largest fractional part, first on
    /// ties. `None` when every structural value is integral within epsilon.
    fn branching_variable(&self, solution: &Solution) -> Option<(usize, f64)> {
        let epsilon = self.solver.epsilon();
        let mut best: Option<(usize, f64, f64)> = None;

        for (v, &value) in solution.basis.iter().zip(&solution.rhs) {
            if !v.is_structural() || (value - value.round()).abs() <= epsilon {
                continue;
            }
            let fraction = value - value.floor();
            if best.is_none_or(|(_, _, max)| fraction > max) {
                best = Some((v.index, value, fraction));
            }
        }

        best.map(|(index, value, _)| (index, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::Variable;
    use std::time::Instant;

    #[test]
    fn test_integral_relaxation_needs_one_node() {
        let mut problem = LpProblem::with_unnamed_variables(2);
        problem.set_objective(vec![1.0, 1.0], true);
        problem.add_constraint("c0", vec![1.0, 0.0], Relation::Eq, 2.0);
        problem.add_constraint("c1", vec![0.0, 1.0], Relation::Eq, 3.0);

        let result = BranchAndBound::default().find_integer_optimum(&problem).unwrap();

        assert_eq!(result.objective_value, 5.0);
        assert_eq!(result.values, vec![2.0, 3.0]);
        assert_eq!(result.nodes_explored, 1);
    }

    #[test]
    fn test_fractional_relaxation_branches() {
        // Minimize x subject to 2x >= 3; relaxation gives 1.5
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("half", vec![2.0], Relation::Ge, 3.0);

        let result = BranchAndBound::default().find_integer_optimum(&problem).unwrap();

        assert_eq!(result.objective_value, 2.0);
        assert_eq!(result.values, vec![2.0]);
        // root, pruned floor child, integral ceiling child
        assert_eq!(result.nodes_explored, 3);
    }

    #[test]
    fn test_maximization_keeps_largest() {
        // Maximize x + y subject to 2x + 2y <= 7
        let mut problem = LpProblem::with_unnamed_variables(2);
        problem.set_objective(vec![1.0, 1.0], false);
        problem.add_constraint("cap", vec![2.0, 2.0], Relation::Le, 7.0);

        let result = BranchAndBound::default().find_integer_optimum(&problem).unwrap();

        assert_eq!(result.objective_value, 3.0);
    }

    #[test]
    fn test_root_infeasible() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("five", vec![1.0], Relation::Eq, 5.0);
        problem.add_constraint("ten", vec![1.0], Relation::Eq, 10.0);

        let err = BranchAndBound::default().find_integer_optimum(&problem).unwrap_err();
        assert_eq!(err, SolveError::Infeasible);
    }

    #[test]
    fn test_no_integer_point() {
        // 2x = 3 has only x = 1.5
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("odd", vec![2.0], Relation::Eq, 3.0);

        let err = BranchAndBound::default().find_integer_optimum(&problem).unwrap_err();
        assert_eq!(err, SolveError::NoIntegerSolution);
    }

    #[test]
    fn test_branching_variable_picks_largest_fraction() {
        let solution = Solution {
            basis: vec![
                Variable::structural(0, 1.0),
                Variable::slack(0),
                Variable::structural(2, 1.0),
                Variable::structural(1, 1.0),
            ],
            rhs: vec![1.25, 0.9, 3.75, 2.75],
            iterations: 0,
        };

        let bb = BranchAndBound::default();
        assert_eq!(bb.branching_variable(&solution), Some((2, 3.75)));
    }

    #[test]
    fn test_branching_ignores_near_integers() {
        let solution = Solution {
            basis: vec![Variable::structural(0, 1.0)],
            rhs: vec![3.99999999],
            iterations: 0,
        };

        assert_eq!(BranchAndBound::default().branching_variable(&solution), None);
    }

    #[test]
    fn test_deadline_stops_search() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("half", vec![2.0], Relation::Ge, 3.0);

        let bb = BranchAndBound::new(Solver::new().with_deadline(Instant::now()));
        assert_eq!(bb.find_integer_optimum(&problem), Err(SolveError::DeadlineExceeded));
    }

    #[test]
    fn test_equal_optima_keep_floor_branch_point() {
        // Minimize x + y subject to x + y >= 1.5; relaxation gives x = 1.5.
        // (0, 2), (1, 1) and (2, 0) all cost 2; the x <= 1 subtree reaches
        // (0, 2) first.
        let mut problem = LpProblem::with_unnamed_variables(2);
        problem.set_objective(vec![1.0, 1.0], true);
        problem.add_constraint("demand", vec![1.0, 1.0], Relation::Ge, 1.5);

        let relaxation = Solver::new().solve(&problem).unwrap();
        assert!((relaxation.value_of(0) - 1.5).abs() < 1e-9);

        let result = BranchAndBound::default().find_integer_optimum(&problem).unwrap();

        assert_eq!(result.objective_value, 2.0);
        assert_eq!(result.values, vec![0.0, 2.0]);
        assert_eq!(result.nodes_explored, 9);
    }

    #[test]
    fn test_node_limit_stops_endless_branching() {
        // 2x - 2y = 1 has no integer point but every branch stays feasible
        let mut problem = LpProblem::with_unnamed_variables(2);
        problem.set_objective(vec![1.0, 0.0], true);
        problem.add_constraint("odd", vec![2.0, -2.0], Relation::Eq, 1.0);

        let bb = BranchAndBound::default().with_max_nodes(25);
        assert_eq!(
            bb.find_integer_optimum(&problem),
            Err(SolveError::NodeLimitExceeded { nodes: 25 })
        );
    }

    #[test]
    fn test_node_limit_allows_small_searches() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("half", vec![2.0], Relation::Ge, 3.0);

        let result = BranchAndBound::default()
            .with_max_nodes(3)
            .find_integer_optimum(&problem)
            .unwrap();
        assert_eq!(result.objective_value, 2.0);
    }
}
