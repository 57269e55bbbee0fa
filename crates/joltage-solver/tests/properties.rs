use joltage_solver::{BranchAndBound, LpProblem, Relation, SolveError, Solver};

const EPS: f64 = 1e-7;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Minimize total presses where each button adds one to the listed counters.
fn press_problem(buttons: &[&[usize]], targets: &[f64]) -> LpProblem {
    let mut problem = LpProblem::with_unnamed_variables(buttons.len());
    problem.set_objective(vec![1.0; buttons.len()], true);
    for (counter, &target) in targets.iter().enumerate() {
        let coefficients = buttons
            .iter()
            .map(|b| if b.contains(&counter) { 1.0 } else { 0.0 })
            .collect();
        problem.add_constraint(format!("counter{}", counter), coefficients, Relation::Eq, target);
    }
    problem
}

fn mixed_problem() -> LpProblem {
    let mut problem = LpProblem::with_unnamed_variables(3);
    problem.set_objective(vec![2.0, 3.0, 1.0], true);
    problem.add_constraint("demand", vec![1.0, 1.0, 1.0], Relation::Ge, 6.0);
    problem.add_constraint("mix", vec![1.0, -1.0, 0.0], Relation::Eq, 1.0);
    problem.add_constraint("cap", vec![0.0, 0.0, 1.0], Relation::Le, 2.0);
    problem
}

#[test]
fn repeated_solves_are_identical() {
    init_logger();
    let problem = mixed_problem();
    let solver = Solver::new();

    let first = solver.solve(&problem).unwrap();
    for _ in 0..5 {
        assert_eq!(solver.solve(&problem).unwrap(), first);
    }
}

#[test]
fn optimal_solution_satisfies_every_constraint() {
    init_logger();
    let problem = mixed_problem();

    let solution = Solver::new().solve(&problem).unwrap();
    let values = solution.values(problem.num_variables());

    assert!(values.iter().all(|&v| v >= -EPS), "negative value in {:?}", values);
    for c in &problem.constraints {
        assert!(c.is_satisfied(&values, EPS), "{} violated by {:?}", c.name, values);
    }
    // x = 2.5, y = 1.5, z = 2
    let obj = solution.objective_value(&problem.objective);
    assert!((obj - 11.5).abs() < 1e-6, "obj = {}", obj);
}

#[test]
fn integer_optimum_is_integral_and_feasible() {
    init_logger();
    let problem = mixed_problem();

    let result = BranchAndBound::default().find_integer_optimum(&problem).unwrap();

    for &v in &result.values {
        assert!((v - v.round()).abs() < EPS);
    }
    for c in &problem.constraints {
        assert!(c.is_satisfied(&result.values, EPS), "{} violated by {:?}", c.name, result.values);
    }
    // x = 3, y = 2, z = 1
    assert_eq!(result.objective_value, 13.0);
}

#[test]
fn disjoint_buttons_sum_targets() {
    init_logger();
    let problem = press_problem(&[&[0], &[1]], &[2.0, 3.0]);

    let result = BranchAndBound::default().find_integer_optimum(&problem).unwrap();

    assert_eq!(result.objective_value, 5.0);
    assert_eq!(result.values, vec![2.0, 3.0]);
}

#[test]
fn overlapping_buttons_find_fewest_presses() {
    init_logger();
    let buttons: &[&[usize]] = &[&[3], &[1, 3], &[2], &[2, 3], &[0, 2], &[0, 1]];
    let problem = press_problem(buttons, &[3.0, 5.0, 4.0, 7.0]);

    let result = BranchAndBound::default().find_integer_optimum(&problem).unwrap();

    assert_eq!(result.objective_value, 10.0);
    for c in &problem.constraints {
        assert!(c.is_satisfied(&result.values, EPS));
    }
}

#[test]
fn integral_relaxation_matches_branch_and_bound() {
    init_logger();
    let problem = press_problem(&[&[0, 1], &[1], &[2]], &[4.0, 6.0, 1.0]);

    let relaxation = Solver::new().solve(&problem).unwrap();
    let relaxed = relaxation.objective_value(&problem.objective);
    let integer = BranchAndBound::default().find_integer_optimum(&problem).unwrap();

    assert!((relaxed - integer.objective_value).abs() < EPS);
    assert_eq!(integer.nodes_explored, 1);
}

#[test]
fn conflicting_equalities_are_infeasible() {
    init_logger();
    let mut problem = LpProblem::new(vec!["x".to_string()]);
    problem.set_objective(vec![1.0], true);
    problem.add_constraint("five", vec![1.0], Relation::Eq, 5.0);
    problem.add_constraint("ten", vec![1.0], Relation::Eq, 10.0);

    assert_eq!(Solver::new().solve(&problem), Err(SolveError::Infeasible));
    assert_eq!(
        BranchAndBound::default().find_integer_optimum(&problem),
        Err(SolveError::Infeasible)
    );
}
