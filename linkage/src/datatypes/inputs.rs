//! Scene descriptions supplied by callers (renderers, HTTP handlers, test harnesses).
//! These are plain data: validating them and resolving point names happens in
//! [`crate::Scene::from_state`].

use serde::{Deserialize, Serialize};

/// Everything needed to build a scene: its points and the constraints between them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct SceneState {
    /// Points, in draw/report order.
    pub points: Vec<PointState>,
    /// Constraints, in correction pass order.
    #[serde(default)]
    pub constraints: Vec<ConstraintState>,
}

/// A named point and its initial position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct PointState {
    /// Unique within the scene.
    pub name: String,
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
}

impl PointState {
    /// Describe a point.
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }
}

/// A constraint between named points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum ConstraintState {
    /// The point must stay on the anchor.
    Fixed {
        /// Name of the pinned point.
        point: String,
        #[allow(missing_docs)]
        anchor_x: f64,
        #[allow(missing_docs)]
        anchor_y: f64,
    },
    /// The two points must stay `length` apart.
    Distance {
        /// Name of one end.
        point1: String,
        /// Name of the other end.
        point2: String,
        /// Rest length. If omitted, it's captured from the points' initial positions.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<f64>,
    },
}
