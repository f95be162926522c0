use crate::{datatypes::Position, vector::V};

/// A named 2D position, the only mutable entity in a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub(crate) name: String,
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Point {
    pub(crate) fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
        }
    }

    /// Translate the point. No constraints are checked.
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Where the point currently is.
    pub fn position(&self) -> Position {
        Position {
            x: self.x,
            y: self.y,
        }
    }

    /// The point's name, unique within its scene.
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub(crate) fn v(&self) -> V {
        V::new(self.x, self.y)
    }

    #[inline(always)]
    pub(crate) fn shift(&mut self, delta: V) {
        self.move_by(delta.x, delta.y);
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, to: V) {
        self.x = to.x;
        self.y = to.y;
    }
}
