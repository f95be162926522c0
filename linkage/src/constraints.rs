use crate::{Config, PointId, datatypes::Position, point::Point, vector::V};

/// Constructors for constraints which capture the scene's current geometry.
mod capture;

/// Two points closer than this are treated as coincident,
/// so the direction between them is undefined.
pub(crate) const DEGENERATE_LENGTH: f64 = 1e-12;

/// Each geometric constraint we support.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum Constraint {
    /// This point must sit on the given anchor.
    FixedPosition(PointId, Position),
    /// These two points should be a given distance apart.
    Distance(PointId, PointId, f64),
}

/// Component of a 2D point.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub(crate) enum Component {
    /// Horizontal (X) component.
    X,
    /// Vertical (Y) component.
    Y,
}

/// Describes one value in one row of the Jacobian matrix.
#[derive(Clone, Copy, Debug)]
pub(crate) struct JacobianVar {
    /// Which point's coordinate are we talking about?
    pub point: PointId,
    /// And which of its coordinates?
    pub component: Component,
    /// What value is its partial derivative?
    pub partial_derivative: f64,
}

/// What a single correction step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Correction {
    Applied,
    /// The constraint's direction was undefined (coincident points), so nothing moved.
    Degenerate,
}

impl Constraint {
    /// Which points does this constraint relate?
    pub fn points(&self) -> impl Iterator<Item = PointId> {
        let ids = match *self {
            Constraint::FixedPosition(p, _) => [Some(p), None],
            Constraint::Distance(p1, p2, _) => [Some(p1), Some(p2)],
        };
        ids.into_iter().flatten()
    }

    /// How far is this constraint from being satisfied?
    /// Always non-negative. For a distance, it's how far the length is off.
    /// For a fixed position, it's how far the point is from its anchor.
    pub(crate) fn residual(&self, points: &[Point]) -> f64 {
        match *self {
            Constraint::FixedPosition(p, anchor) => {
                let anchor = V::new(anchor.x, anchor.y);
                points[p.index()].v().euclidean_distance(anchor)
            }
            Constraint::Distance(p1, p2, length) => {
                let current = points[p1.index()].v().euclidean_distance(points[p2.index()].v());
                (current - length).abs()
            }
        }
    }

    /// Is the residual within tolerance?
    pub(crate) fn is_satisfied(&self, points: &[Point], tolerance: f64) -> bool {
        self.residual(points) <= tolerance
    }

    /// Take one damped relaxation step toward satisfying this constraint,
    /// moving the point(s) it relates.
    pub(crate) fn correct(&self, points: &mut [Point], config: &Config) -> Correction {
        match *self {
            Constraint::FixedPosition(p, anchor) => {
                let anchor = V::new(anchor.x, anchor.y);
                let point = &mut points[p.index()];
                if config.pin_stiffness >= 1.0 {
                    // A full-strength pin snaps, so it holds exactly.
                    point.set(anchor);
                } else {
                    let towards = anchor - point.v();
                    point.shift(towards * config.pin_stiffness);
                }
                Correction::Applied
            }
            Constraint::Distance(p1, p2, length) => {
                let delta = points[p1.index()].v() - points[p2.index()].v();
                let current = delta.magnitude();
                if current <= DEGENERATE_LENGTH {
                    return Correction::Degenerate;
                }
                let diff = length - current;
                // Scale the unit direction rather than `delta * (diff / current)`,
                // so tiny separations can't overflow the intermediate ratio.
                let direction = delta * current.recip();
                let half_step = direction * (0.5 * config.distance_stiffness * diff);
                // Spread the correction evenly; positive `diff` pushes the points apart.
                points[p1.index()].shift(half_step);
                points[p2.index()].shift(-half_step);
                Correction::Applied
            }
        }
    }

    /// Put a pinned point exactly on its anchor. Other constraints are untouched.
    pub(crate) fn settle(&self, points: &mut [Point]) {
        if let Constraint::FixedPosition(p, anchor) = *self {
            points[p.index()].set(V::new(anchor.x, anchor.y));
        }
    }

    /// Is this a distance whose points currently coincide?
    pub(crate) fn is_degenerate(&self, points: &[Point]) -> bool {
        match *self {
            Constraint::FixedPosition(..) => false,
            Constraint::Distance(p1, p2, _) => {
                let delta = points[p1.index()].v() - points[p2.index()].v();
                delta.magnitude() <= DEGENERATE_LENGTH
            }
        }
    }

    /// Signed residuals, one per row: two for a pin, one for a distance.
    /// For performance reasons (avoiding allocations), this doesn't return a `Vec<f64>`,
    /// instead it appends to one.
    pub(crate) fn residual_rows(&self, points: &[Point], out: &mut Vec<f64>) {
        match *self {
            Constraint::FixedPosition(p, anchor) => {
                let point = &points[p.index()];
                out.push(point.x - anchor.x);
                out.push(point.y - anchor.y);
            }
            Constraint::Distance(p1, p2, length) => {
                let current = points[p1.index()].v().euclidean_distance(points[p2.index()].v());
                out.push(current - length);
            }
        }
    }

    /// Partial derivatives of each residual row.
    /// Returns false if the rows are degenerate (all zero because the direction is undefined).
    pub(crate) fn jacobian_rows(
        &self,
        points: &[Point],
        row0: &mut Vec<JacobianVar>,
        row1: &mut Vec<JacobianVar>,
    ) -> bool {
        match *self {
            Constraint::FixedPosition(point, _) => {
                row0.push(JacobianVar {
                    point,
                    component: Component::X,
                    partial_derivative: 1.0,
                });
                row1.push(JacobianVar {
                    point,
                    component: Component::Y,
                    partial_derivative: 1.0,
                });
                true
            }
            Constraint::Distance(p1, p2, _) => {
                // d/dp1 |p1 - p2| = (p1 - p2) / |p1 - p2|, and the negation for p2.
                let delta = points[p1.index()].v() - points[p2.index()].v();
                let current = delta.magnitude();
                if current <= DEGENERATE_LENGTH {
                    return false;
                }
                let u = delta * current.recip();
                row0.extend([
                    JacobianVar {
                        point: p1,
                        component: Component::X,
                        partial_derivative: u.x,
                    },
                    JacobianVar {
                        point: p1,
                        component: Component::Y,
                        partial_derivative: u.y,
                    },
                    JacobianVar {
                        point: p2,
                        component: Component::X,
                        partial_derivative: -u.x,
                    },
                    JacobianVar {
                        point: p2,
                        component: Component::Y,
                        partial_derivative: -u.y,
                    },
                ]);
                true
            }
        }
    }
}
