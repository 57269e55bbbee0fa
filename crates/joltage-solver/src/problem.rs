/// Represents a linear programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints, in the order their auxiliary variables are created
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Relation between the left-hand side and `rhs`
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Equal (=)
    Eq,
    /// Greater than or equal (>=)
    Ge,
}

impl Relation {
    /// The relation obtained by multiplying both sides by -1.
    pub fn flipped(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Eq => Relation::Eq,
            Relation::Ge => Relation::Le,
        }
    }
}

impl Constraint {
    /// Left-hand side evaluated at `values`. Missing values count as zero.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64], epsilon: f64) -> bool {
        let lhs = self.evaluate(values);
        match self.relation {
            Relation::Le => lhs <= self.rhs + epsilon,
            Relation::Eq => (lhs - self.rhs).abs() <= epsilon,
            Relation::Ge => lhs >= self.rhs - epsilon,
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
        }
    }

    /// Creates a problem with variables named `x0`, `x1`, ...
    pub fn with_unnamed_variables(n: usize) -> Self {
        Self::new((0..n).map(|i| format!("x{}", i)).collect())
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        coefficients: Vec<f64>,
        relation: Relation,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            relation,
            rhs,
        });
    }

    /// Returns a copy of this problem with one extra single-variable bound
    /// appended after the existing constraints.
    pub fn with_bound(&self, variable: usize, relation: Relation, rhs: f64) -> Self {
        let mut coefficients = vec![0.0; self.num_variables()];
        if let Some(c) = coefficients.get_mut(variable) {
            *c = 1.0;
        }
        let op = match relation {
            Relation::Le => "<=",
            Relation::Eq => "=",
            Relation::Ge => ">=",
        };
        let name = format!("{} {} {}", self.variable_name(variable), op, rhs);

        let mut bounded = self.clone();
        bounded.add_constraint(name, coefficients, relation, rhs);
        bounded
    }

    pub fn variable_name(&self, variable: usize) -> String {
        self.variables
            .get(variable)
            .cloned()
            .unwrap_or_else(|| format!("x{}", variable))
    }

    /// Objective value at `values`, using the caller's (un-negated) coefficients.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
