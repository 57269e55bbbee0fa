use std::collections::{HashSet, VecDeque};

use joltage_solver::{BranchAndBound, LpProblem, Relation, SolveError};
use log::{debug, info};
use thiserror::Error;

use crate::ast::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MachineError {
    #[error("Machine {0}: indicator pattern cannot be reached")]
    UnreachableLights(usize),
    #[error("Machine {machine}: {source}")]
    Solve {
        machine: usize,
        #[source]
        source: SolveError,
    },
}

impl Machine {
    /// Fewest presses that turn the all-off indicators into `lights`.
    ///
    /// Each press toggles the lights a button is wired to. Returns `None` when
    /// the pattern is unreachable.
    pub fn fewest_presses_for_lights(&self) -> Option<usize> {
        let start = vec![false; self.lights.len()];
        if start == self.lights {
            return Some(0);
        }

        let mut seen = HashSet::from([start.clone()]);
        let mut queue = VecDeque::from([(start, 0)]);

        while let Some((state, presses)) = queue.pop_front() {
            for button in &self.buttons {
                let mut next = state.clone();
                for &i in &button.wiring {
                    next[i] = !next[i];
                }

                if next == self.lights {
                    return Some(presses + 1);
                }
                if seen.insert(next.clone()) {
                    queue.push_back((next, presses + 1));
                }
            }
        }

        None
    }

    /// Integer program for the joltage counters.
    ///
    /// One variable per button (its press count), minimizing total presses,
    /// with one equality per counter: presses of the buttons wired to it sum
    /// to its target.
    pub fn to_lp_problem(&self) -> LpProblem {
        let names = (0..self.buttons.len()).map(|b| format!("button{}", b)).collect();
        let mut problem = LpProblem::new(names);
        problem.set_objective(vec![1.0; self.buttons.len()], true);

        for (counter, &target) in self.joltage.iter().enumerate() {
            let coefficients = self
                .buttons
                .iter()
                .map(|b| if b.affects(counter) { 1.0 } else { 0.0 })
                .collect();
            problem.add_constraint(format!("counter{}", counter), coefficients, Relation::Eq, target as f64);
        }

        problem
    }

    /// Fewest presses that bring every joltage counter from zero to its target.
    pub fn fewest_presses_for_joltage(&self, solver: &BranchAndBound) -> Result<u64, SolveError> {
        let problem = self.to_lp_problem();
        let solution = solver.find_integer_optimum(&problem)?;
        debug!(
            "machine at {:?}: {} presses over {} nodes",
            self.span, solution.objective_value, solution.nodes_explored
        );
        Ok(solution.objective_value.round() as u64)
    }
}

impl Program {
    pub fn total_light_presses(&self) -> Result<usize, MachineError> {
        let mut total = 0;
        for (i, machine) in self.machines.iter().enumerate() {
            total += machine
                .fewest_presses_for_lights()
                .ok_or(MachineError::UnreachableLights(i))?;
        }
        info!("{} machines need {} light presses", self.machines.len(), total);
        Ok(total)
    }

    pub fn total_joltage_presses(&self, solver: &BranchAndBound) -> Result<u64, MachineError> {
        let mut total = 0;
        for (i, machine) in self.machines.iter().enumerate() {
            total += machine
                .fewest_presses_for_joltage(solver)
                .map_err(|source| MachineError::Solve { machine: i, source })?;
        }
        info!("{} machines need {} joltage presses", self.machines.len(), total);
        Ok(total)
    }
}
