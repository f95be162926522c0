//! Positional constraint solver for 2D point-and-link sketches.
//!
//! A [`Scene`] holds named points, plus constraints that pin points to anchors or keep
//! pairs of points a fixed distance apart. Dragging a point re-solves the scene, so the
//! shape keeps its links.
//!
//! ```
//! use linkage::{Config, Scene};
//!
//! let mut scene = Scene::new(Config::default()).unwrap();
//! scene.add_point("a", 200.0, 100.0).unwrap();
//! scene.add_point("b", 200.0, 300.0).unwrap();
//! scene.link("a", "b").unwrap();
//! scene.pin("a").unwrap();
//! let report = scene.displace("b", 50.0, 0.0).unwrap();
//! assert!(report.converged());
//! ```

pub use crate::constraints::Constraint;
pub use crate::error::{SceneError, TextualError};
pub use crate::id::PointId;
pub use crate::point::Point;
pub use crate::scene::{MAX_COORDINATE, Scene};
pub use crate::solve_outcome::SolveReport;
pub use crate::solver::{Config, Strategy};
pub use crate::warnings::{Warning, WarningContent};

/// Each kind of constraint we support.
mod constraints;
/// Geometric data crossing the library boundary.
pub mod datatypes;
mod error;
/// IDs of points.
mod id;
mod point;
mod scene;
/// Results of solving a scene.
mod solve_outcome;
/// Iterative solvers.
mod solver;
/// Parser for textual representation of these problems.
pub mod textual;
mod vector;
/// Lints and solve-time warnings.
mod warnings;

/// Build a scene from `state`, displace `point_name` by `(dx, dy)`, and re-solve it.
/// This is the entry point for callers that don't keep a [`Scene`] between drags,
/// e.g. a stateless HTTP handler.
pub fn solve(
    state: &datatypes::SceneState,
    point_name: &str,
    dx: f64,
    dy: f64,
    config: Config,
) -> Result<SolveReport, SceneError> {
    let mut scene = Scene::from_state(state, config)?;
    scene.displace(point_name, dx, dy)
}
