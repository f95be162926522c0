use crate::datatypes::Position;

use super::Label;

/// A statement from the `# constraints` section.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Pin a point.
    Fix(Fix),
    /// Keep two points apart.
    Distance(Distance),
}

/// `fixed(p)` or `fixed(p) at (x, y)`
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    /// The pinned point.
    pub point: Label,
    /// If not given, the point is pinned where it was declared.
    pub at: Option<Position>,
}

/// `distance(p, q)` or `distance(p, q) = 300`
#[derive(Debug, Clone, PartialEq)]
pub struct Distance {
    /// The two ends.
    pub label: (Label, Label),
    /// If not given, the points' declared separation is used.
    pub length: Option<f64>,
}

/// A statement from the `# points` section: `p = (x, y)`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarePoint {
    /// Name of the point.
    pub label: Label,
    /// Where it starts.
    pub at: Position,
}

/// A statement from the `# drags` section.
#[derive(Debug, Clone, PartialEq)]
pub enum Drag {
    /// `p by (dx, dy)`
    By {
        /// The dragged point.
        point: Label,
        #[allow(missing_docs)]
        dx: f64,
        #[allow(missing_docs)]
        dy: f64,
    },
    /// `p to (x, y)`
    To {
        /// The dragged point.
        point: Label,
        #[allow(missing_docs)]
        x: f64,
        #[allow(missing_docs)]
        y: f64,
    },
}

impl Drag {
    /// Which point is being dragged?
    pub fn point(&self) -> &Label {
        match self {
            Drag::By { point, .. } | Drag::To { point, .. } => point,
        }
    }
}
