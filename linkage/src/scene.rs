use indexmap::IndexMap;

use crate::{
    Config, Constraint, PointId, SceneError, SolveReport, Warning, WarningContent,
    datatypes::{ConstraintState, Position, SceneState},
    id::IdGenerator,
    point::Point,
    solver, warnings,
};

/// Largest coordinate, anchor or length a scene accepts.
/// Squared distances between points this far out still fit comfortably in an `f64`.
pub const MAX_COORDINATE: f64 = 1e12;

/// Named points, the constraints between them, and the solver configuration.
/// Dragging a point re-solves the whole scene so the links keep their lengths.
#[derive(Debug, Clone)]
pub struct Scene {
    /// In creation order. A point's [`PointId`] is its index here.
    points: Vec<Point>,
    /// Point name to ID.
    index: IndexMap<String, PointId>,
    /// In creation order, which is also the order they're corrected in.
    constraints: Vec<Constraint>,
    config: Config,
    ids: IdGenerator,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            index: IndexMap::new(),
            constraints: Vec::new(),
            config: Config::default(),
            ids: IdGenerator::default(),
        }
    }
}

impl Scene {
    /// An empty scene that solves with the given configuration.
    pub fn new(config: Config) -> Result<Self, SceneError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Build a scene from a caller-supplied description.
    /// Distances without a length keep the length their points start at.
    pub fn from_state(state: &SceneState, config: Config) -> Result<Self, SceneError> {
        let mut scene = Self::new(config)?;
        for point in &state.points {
            scene.add_point(&point.name, point.x, point.y)?;
        }
        for constraint in &state.constraints {
            let constraint_id = scene.constraints.len();
            let lookup = |scene: &Self, name: &str| {
                scene
                    .index
                    .get(name)
                    .copied()
                    .ok_or_else(|| SceneError::UnknownPoint {
                        constraint_id,
                        name: name.to_owned(),
                    })
            };
            let constraint = match constraint {
                ConstraintState::Fixed {
                    point,
                    anchor_x,
                    anchor_y,
                } => Constraint::fixed(lookup(&scene, point)?, *anchor_x, *anchor_y),
                ConstraintState::Distance {
                    point1,
                    point2,
                    length,
                } => {
                    let p1 = lookup(&scene, point1)?;
                    let p2 = lookup(&scene, point2)?;
                    match length {
                        Some(length) => Constraint::Distance(p1, p2, *length),
                        None => Constraint::rest_length(&scene.points, p1, p2),
                    }
                }
            };
            scene.add_constraint(constraint)?;
        }
        Ok(scene)
    }

    /// Add a point. Names must be unique within the scene.
    pub fn add_point(&mut self, name: &str, x: f64, y: f64) -> Result<PointId, SceneError> {
        if self.index.contains_key(name) {
            return Err(SceneError::DuplicatePoint {
                name: name.to_owned(),
            });
        }
        check_coordinates(|| format!("Point {name}"), x, y)?;
        let id = self.ids.next_id();
        self.points.push(Point::new(name, x, y));
        self.index.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Add a constraint, returning its index in the constraint list.
    /// Constraints are corrected in the order they were added.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<usize, SceneError> {
        let constraint_id = self.constraints.len();
        // IDs from other scenes are rejected even when their index happens to be in range here.
        if let Some(foreign) = constraint.points().find(|&p| !self.ids.issued(p)) {
            return Err(SceneError::unknown_id(constraint_id, foreign));
        }
        match constraint {
            Constraint::FixedPosition(_, anchor) => {
                check_coordinates(
                    || format!("The anchor of constraint {constraint_id}"),
                    anchor.x,
                    anchor.y,
                )?;
            }
            Constraint::Distance(_, _, length) => {
                if !(length.is_finite() && (0.0..=MAX_COORDINATE).contains(&length)) {
                    return Err(SceneError::InvalidLength {
                        constraint_id,
                        length,
                    });
                }
            }
        }
        self.constraints.push(constraint);
        Ok(constraint_id)
    }

    /// Pin the named point where it currently is.
    pub fn pin(&mut self, name: &str) -> Result<usize, SceneError> {
        let id = self.id_of(name)?;
        self.add_constraint(Constraint::pin_in_place(&self.points, id))
    }

    /// Pin the named point to an anchor.
    pub fn pin_at(&mut self, name: &str, x: f64, y: f64) -> Result<usize, SceneError> {
        let id = self.id_of(name)?;
        self.add_constraint(Constraint::fixed(id, x, y))
    }

    /// Keep two points as far apart as they are now.
    pub fn link(&mut self, a: &str, b: &str) -> Result<usize, SceneError> {
        let p1 = self.id_of(a)?;
        let p2 = self.id_of(b)?;
        self.add_constraint(Constraint::rest_length(&self.points, p1, p2))
    }

    /// Keep two points `length` apart.
    pub fn link_with_length(&mut self, a: &str, b: &str, length: f64) -> Result<usize, SceneError> {
        let p1 = self.id_of(a)?;
        let p2 = self.id_of(b)?;
        self.add_constraint(Constraint::Distance(p1, p2, length))
    }

    /// Look up a point's ID by name.
    pub fn id_of(&self, name: &str) -> Result<PointId, SceneError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::NotFound {
                name: name.to_owned(),
            })
    }

    /// Move the named point by `(dx, dy)`, then re-solve the scene.
    /// If the point doesn't exist, or the move isn't finite, nothing changes.
    pub fn displace(&mut self, name: &str, dx: f64, dy: f64) -> Result<SolveReport, SceneError> {
        let id = self.id_of(name)?;
        let point = &self.points[id.index()];
        let (x, y) = (point.x + dx, point.y + dy);
        if !(dx.is_finite() && dy.is_finite()) {
            return Err(SceneError::NonFiniteDisplacement {
                name: name.to_owned(),
                dx,
                dy,
            });
        }
        check_coordinates(|| format!("Point {name}"), x, y)?;
        tracing::debug!(point = name, dx, dy, "displacing point");
        self.points[id.index()].move_by(dx, dy);
        Ok(self.solve())
    }

    /// Move the named point onto `(x, y)`, then re-solve the scene.
    /// If the point doesn't exist, or the target isn't finite, nothing changes.
    pub fn drag_to(&mut self, name: &str, x: f64, y: f64) -> Result<SolveReport, SceneError> {
        let id = self.id_of(name)?;
        if !(x.is_finite() && y.is_finite()) {
            return Err(SceneError::NonFiniteCoordinate {
                what: format!("The drag target for {name}"),
                x,
                y,
            });
        }
        let current = self.points[id.index()].position();
        self.displace(name, x - current.x, y - current.y)
    }

    /// Re-solve the scene without moving anything first.
    pub fn solve(&mut self) -> SolveReport {
        let mut warnings = self.lints();
        tracing::debug!(
            strategy = %self.config.strategy,
            points = self.points.len(),
            constraints = self.constraints.len(),
            "solving scene"
        );
        let outcome = solver::run(&mut self.points, &self.constraints, &self.config);
        warnings.extend(outcome.degenerate.iter().map(|&i| Warning {
            about_constraint: Some(i),
            content: WarningContent::Degenerate,
        }));
        let residuals: Vec<f64> = self
            .constraints
            .iter()
            .map(|c| c.residual(&self.points))
            .collect();
        if !outcome.converged {
            tracing::warn!(
                iterations = outcome.iterations,
                max_residual = residuals.iter().copied().fold(0.0, libm::fmax),
                "Constraint solver did not converge"
            );
        }
        tracing::debug!(
            converged = outcome.converged,
            iterations = outcome.iterations,
            "finished solving scene"
        );
        SolveReport {
            positions: self.positions(),
            converged: outcome.converged,
            iterations: outcome.iterations,
            residuals,
            warnings,
        }
    }

    /// Every point's current position, in scene order.
    pub fn positions(&self) -> IndexMap<String, Position> {
        self.points
            .iter()
            .map(|p| (p.name.clone(), p.position()))
            .collect()
    }

    /// The named point, if it exists.
    pub fn point(&self, name: &str) -> Option<&Point> {
        let id = self.index.get(name)?;
        self.points.get(id.index())
    }

    /// All points, in scene order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// All constraints, in correction order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The solver configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Use a different solver configuration from the next solve onward.
    pub fn set_config(&mut self, config: Config) -> Result<(), SceneError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Problems that can be spotted without solving.
    pub fn lints(&self) -> Vec<Warning> {
        warnings::lint(&self.constraints, &self.points, &self.config)
    }
}

/// Coordinates must be finite, and at most [`MAX_COORDINATE`] from the origin along each axis.
fn check_coordinates(what: impl FnOnce() -> String, x: f64, y: f64) -> Result<(), SceneError> {
    if !(x.is_finite() && y.is_finite()) {
        return Err(SceneError::NonFiniteCoordinate { what: what(), x, y });
    }
    if x.abs() > MAX_COORDINATE || y.abs() > MAX_COORDINATE {
        return Err(SceneError::CoordinateOutOfRange { what: what(), x, y });
    }
    Ok(())
}
