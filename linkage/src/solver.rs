use crate::{Constraint, PointId, SceneError, constraints::Component, point::Point};

/// Damped Gauss-Newton, i.e. repeated linear-system solves.
mod newton;
/// Penalty minimization by numerical gradient descent.
mod penalty;
/// Gauss-Seidel relaxation, one constraint correction at a time.
mod relaxation;

/// How the solver should satisfy the constraints.
/// Every strategy reports convergence the same way: all constraints within tolerance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum Strategy {
    /// Sweep the constraints in order, nudging each toward satisfaction.
    #[default]
    Relaxation,
    /// Solve the linearized system `(JᵀJ + λI) d = -Jᵀr` each iteration.
    GaussNewton,
    /// Minimize the sum of squared residuals by gradient descent.
    Penalty,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Relaxation => "relaxation",
            Strategy::GaussNewton => "gauss-newton",
            Strategy::Penalty => "penalty",
        };
        f.write_str(name)
    }
}

/// Configuration for the solver.
/// Change it between solves with [`crate::Scene::set_config`], never during one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Give up after this many iterations (relaxation passes, or descent steps).
    pub max_iterations: usize,
    /// A constraint is satisfied once its residual is at most this.
    /// Same units as the coordinates.
    pub tolerance: f64,
    /// Fraction of a distance error corrected per relaxation pass, in (0, 1].
    pub distance_stiffness: f64,
    /// Fraction of a pin error corrected per relaxation pass, in (0, 1].
    /// 1 snaps the point onto its anchor.
    pub pin_stiffness: f64,
    /// Which algorithm to run.
    pub strategy: Strategy,
    /// Gauss-Newton Tikhonov damping, the λ in `JᵀJ + λI`.
    pub damping: f64,
    /// Gauss-Newton stops once a step is this small relative to the coordinates.
    pub step_tolerance: f64,
    /// Penalty strategy's central-difference step for numerical gradients.
    pub gradient_step: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-3,
            distance_stiffness: 0.5,
            pin_stiffness: 1.0,
            strategy: Strategy::Relaxation,
            damping: 1e-6,
            step_tolerance: 1e-12,
            gradient_step: 1e-6,
        }
    }
}

impl Config {
    /// Use this strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Give up after this many iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the distance constraints' stiffness.
    pub fn with_distance_stiffness(mut self, stiffness: f64) -> Self {
        self.distance_stiffness = stiffness;
        self
    }

    /// Set the pins' stiffness.
    pub fn with_pin_stiffness(mut self, stiffness: f64) -> Self {
        self.pin_stiffness = stiffness;
        self
    }

    /// Check every setting is usable.
    pub fn validate(&self) -> Result<(), SceneError> {
        let invalid = |reason: String| Err(SceneError::InvalidConfig { reason });
        if self.max_iterations == 0 {
            return invalid("max_iterations must be at least 1".to_owned());
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return invalid(format!(
                "tolerance must be positive and finite, not {}",
                self.tolerance
            ));
        }
        for (which, stiffness) in [
            ("distance_stiffness", self.distance_stiffness),
            ("pin_stiffness", self.pin_stiffness),
        ] {
            if !(stiffness > 0.0 && stiffness <= 1.0) {
                return invalid(format!("{which} must be in (0, 1], not {stiffness}"));
            }
        }
        for (which, value) in [
            ("damping", self.damping),
            ("step_tolerance", self.step_tolerance),
            ("gradient_step", self.gradient_step),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{which} must be positive and finite, not {value}"));
            }
        }
        Ok(())
    }
}

/// Maps the points that constraints actually touch onto solver variables.
/// Points no constraint refers to never get a variable, so no strategy can move them.
pub(crate) struct Layout {
    /// Referenced points, in scene order. Point `variables[i]` owns columns `2i` and `2i + 1`.
    variables: Vec<PointId>,
    /// For each scene point, its index into `variables`.
    slot_of: Vec<Option<usize>>,
}

impl Layout {
    pub fn new(num_points: usize, constraints: &[Constraint]) -> Self {
        let mut referenced = vec![None; num_points];
        for id in constraints.iter().flat_map(Constraint::points) {
            referenced[id.index()] = Some(id);
        }
        let mut slot_of = vec![None; num_points];
        let mut variables = Vec::new();
        for (index, id) in referenced.into_iter().enumerate() {
            if let Some(id) = id {
                slot_of[index] = Some(variables.len());
                variables.push(id);
            }
        }
        Self { variables, slot_of }
    }

    /// Number of columns, i.e. scalar unknowns.
    pub fn num_columns(&self) -> usize {
        2 * self.variables.len()
    }

    /// Which column holds this coordinate?
    pub fn column(&self, point: PointId, component: Component) -> Option<usize> {
        let slot = self.slot_of.get(point.index()).copied().flatten()?;
        Some(match component {
            Component::X => 2 * slot,
            Component::Y => 2 * slot + 1,
        })
    }

    /// Points that own columns, in column order.
    pub fn points(&self) -> &[PointId] {
        &self.variables
    }
}

/// What a strategy reports back.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Outcome {
    pub converged: bool,
    pub iterations: usize,
    /// Constraints that were skipped at least once because their points coincided.
    pub degenerate: Vec<usize>,
}

/// Tracks which constraints went degenerate, without duplicates, in constraint order.
#[derive(Debug, Default)]
pub(crate) struct DegenerateSet {
    seen: Vec<bool>,
}

impl DegenerateSet {
    pub fn new(num_constraints: usize) -> Self {
        Self {
            seen: vec![false; num_constraints],
        }
    }

    pub fn mark(&mut self, constraint_id: usize) {
        self.seen[constraint_id] = true;
    }

    pub fn into_ids(self) -> Vec<usize> {
        self.seen
            .into_iter()
            .enumerate()
            .filter_map(|(i, seen)| seen.then_some(i))
            .collect()
    }
}

/// Are all constraints within tolerance?
pub(crate) fn all_satisfied(constraints: &[Constraint], points: &[Point], tolerance: f64) -> bool {
    constraints.iter().all(|c| c.is_satisfied(points, tolerance))
}

/// Largest residual over all constraints, 0 if there are none.
pub(crate) fn max_residual(constraints: &[Constraint], points: &[Point]) -> f64 {
    constraints
        .iter()
        .map(|c| c.residual(points))
        .fold(0.0, libm::fmax)
}

/// Sum of squared residual rows, the quantity least-squares strategies minimize.
/// `scratch` is reused between calls to avoid allocating.
pub(crate) fn sum_of_squares(
    constraints: &[Constraint],
    points: &[Point],
    scratch: &mut Vec<f64>,
) -> f64 {
    scratch.clear();
    for constraint in constraints {
        constraint.residual_rows(points, scratch);
    }
    scratch.iter().map(|r| r * r).sum()
}

/// Run the configured strategy until every constraint is satisfied or the budget runs out.
/// Only points referenced by some constraint are moved.
pub(crate) fn run(points: &mut [Point], constraints: &[Constraint], config: &Config) -> Outcome {
    let mut outcome = match config.strategy {
        Strategy::Relaxation => relaxation::solve(points, constraints, config),
        Strategy::GaussNewton => newton::solve(points, constraints, config),
        Strategy::Penalty => penalty::solve(points, constraints, config),
    };
    if !outcome.converged {
        // Whatever else failed, pins hold after every solve.
        for constraint in constraints {
            constraint.settle(points);
        }
        outcome.converged = all_satisfied(constraints, points, config.tolerance);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdGenerator;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_config() {
        let bad = [
            Config::default().with_max_iterations(0),
            Config::default().with_tolerance(0.0),
            Config::default().with_tolerance(f64::NAN),
            Config::default().with_distance_stiffness(0.0),
            Config::default().with_distance_stiffness(1.5),
            Config::default().with_pin_stiffness(-1.0),
            Config {
                damping: 0.0,
                ..Default::default()
            },
        ];
        for config in bad {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, SceneError::InvalidConfig { .. }), "{config:?}");
        }
    }

    #[test]
    fn layout_skips_unreferenced_points() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let lonely = ids.next_id();
        let c = ids.next_id();
        let constraints = [Constraint::Distance(c, a, 1.0)];
        let layout = Layout::new(3, &constraints);
        assert_eq!(layout.points(), &[a, c]);
        assert_eq!(layout.num_columns(), 4);
        assert_eq!(layout.column(a, Component::X), Some(0));
        assert_eq!(layout.column(c, Component::Y), Some(3));
        assert_eq!(layout.column(lonely, Component::X), None);
    }

    #[test]
    fn strategies_display_kebab_case() {
        assert_eq!(Strategy::GaussNewton.to_string(), "gauss-newton");
        let parsed: Strategy = serde_json::from_str("\"gauss-newton\"").unwrap();
        assert_eq!(parsed, Strategy::GaussNewton);
    }
}
