//! Positions reported back to the caller after a solve.

/// A 2D position that linkage solved for.
#[derive(Clone, Copy, PartialEq, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Position {
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
}

/// Positions can be easily converted to/from an (x, y) pair.
impl From<(f64, f64)> for Position {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Positions can be easily converted to/from an (x, y) pair.
impl From<Position> for (f64, f64) {
    fn from(Position { x, y }: Position) -> Self {
        (x, y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl Position {
    /// Euclidean distance between two positions.
    pub fn euclidean_distance(&self, r: Position) -> f64 {
        use crate::vector::V;
        V::new(self.x, self.y).euclidean_distance(V::new(r.x, r.y))
    }

    /// Are both components finite numbers?
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_str() {
        let p = Position { x: 1.0, y: 2.5 };
        assert_eq!(p.to_string(), "(1,2.5)");
    }

    #[test]
    fn test_distance() {
        let p = Position::from((0.0, 0.0));
        let q = Position::from((3.0, 4.0));
        assert!((p.euclidean_distance(q) - 5.0).abs() < 1e-12);
        let (x, y) = q.into();
        assert!((x - 3.0).abs() < 1e-12 && (y - 4.0).abs() < 1e-12);
    }
}
