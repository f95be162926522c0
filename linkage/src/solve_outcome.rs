use indexmap::IndexMap;

use crate::{Warning, datatypes::Position};

/// What happened when a scene was re-stabilized.
/// Non-convergence isn't an error, so check [`SolveReport::converged`].
#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub struct SolveReport {
    /// Every point's final position, in scene order.
    pub(crate) positions: IndexMap<String, Position>,
    /// Did every constraint end up within tolerance?
    pub(crate) converged: bool,
    /// How many iterations the solver ran.
    pub(crate) iterations: usize,
    /// Each constraint's final residual, in constraint order.
    pub(crate) residuals: Vec<f64>,
    /// Lints about the scene, and anything that went wrong while solving.
    pub(crate) warnings: Vec<Warning>,
}

impl SolveReport {
    /// Every point's final position, in scene order.
    pub fn positions(&self) -> &IndexMap<String, Position> {
        &self.positions
    }

    /// Final position of the named point, if it exists.
    pub fn position(&self, name: &str) -> Option<Position> {
        self.positions.get(name).copied()
    }

    /// Did every constraint end up within tolerance?
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// How many iterations the solver ran.
    /// 0 if the scene was already satisfied.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Each constraint's final residual, in constraint order.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Largest final residual, 0 if there are no constraints.
    pub fn max_residual(&self) -> f64 {
        self.residuals.iter().copied().fold(0.0, libm::fmax)
    }

    /// Lints about the scene, and anything that went wrong while solving.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_residual() {
        let report = SolveReport {
            positions: IndexMap::new(),
            converged: false,
            iterations: 3,
            residuals: vec![0.1, 2.0, 0.5],
            warnings: Vec::new(),
        };
        assert_eq!(report.max_residual(), 2.0);
        assert!(report.position("a").is_none());
    }

    #[test]
    fn serializes_positions_as_a_map() {
        let mut positions = IndexMap::new();
        positions.insert("b".to_owned(), Position { x: 1.0, y: 2.0 });
        positions.insert("a".to_owned(), Position { x: 3.0, y: 4.0 });
        let report = SolveReport {
            positions,
            converged: true,
            iterations: 0,
            residuals: Vec::new(),
            warnings: Vec::new(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"positions":{"b":{"x":1.0,"y":2.0},"a":{"x":3.0,"y":4.0}},"converged":true,"iterations":0,"residuals":[],"warnings":[]}"#
        );
    }
}
