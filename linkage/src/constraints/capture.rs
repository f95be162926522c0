use crate::{PointId, datatypes::Position, point::Point};

use super::Constraint;

impl Constraint {
    /// Pin this point where it currently is.
    pub(crate) fn pin_in_place(points: &[Point], point: PointId) -> Self {
        Self::FixedPosition(point, points[point.index()].position())
    }

    /// Keep these points as far apart as they currently are.
    /// The rest length is captured now and never recomputed.
    pub(crate) fn rest_length(points: &[Point], p1: PointId, p2: PointId) -> Self {
        let a = points[p1.index()].position();
        let b = points[p2.index()].position();
        Self::Distance(p1, p2, a.euclidean_distance(b))
    }

    /// Pin this point to an arbitrary anchor.
    pub fn fixed(point: PointId, x: f64, y: f64) -> Self {
        Self::FixedPosition(point, Position { x, y })
    }
}
