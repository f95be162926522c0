//! Geometric data crossing the library boundary.

/// Scene descriptions that callers hand to linkage.
pub mod inputs;
/// The final solved positions.
pub mod outputs;

pub use inputs::{ConstraintState, PointState, SceneState};
pub use outputs::Position;
