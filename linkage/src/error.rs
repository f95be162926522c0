use crate::PointId;

/// Errors from building, configuring or dragging a scene.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum SceneError {
    /// You referred to a point that isn't in the scene.
    #[error("There is no point called {name} in this scene")]
    NotFound {
        /// The missing point's name.
        name: String,
    },
    /// Two points were given the same name.
    #[error("The point {name} was defined more than once")]
    DuplicatePoint {
        /// The repeated name.
        name: String,
    },
    /// A constraint refers to a point that isn't in the scene.
    #[error("Constraint {constraint_id} refers to the point {name}, which isn't in this scene")]
    UnknownPoint {
        /// Which constraint (by position in the constraint list) was invalid.
        constraint_id: usize,
        /// The missing point's name (or ID, if it was referenced by ID).
        name: String,
    },
    /// Distance constraints need a non-negative length no bigger than [`crate::MAX_COORDINATE`].
    #[error(
        "Constraint {constraint_id} has length {length}, but lengths must be between 0 and {}",
        crate::MAX_COORDINATE
    )]
    InvalidLength {
        /// Which constraint (by position in the constraint list) was invalid.
        constraint_id: usize,
        /// The invalid length.
        length: f64,
    },
    /// A point or anchor was placed at NaN or infinity.
    #[error("{what} has a non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate {
        /// Which point or anchor.
        what: String,
        #[allow(missing_docs)]
        x: f64,
        #[allow(missing_docs)]
        y: f64,
    },
    /// A point or anchor was placed further from the origin than [`crate::MAX_COORDINATE`]
    /// along some axis.
    #[error(
        "{what} would be at ({x}, {y}), but coordinates must be within {} of the origin",
        crate::MAX_COORDINATE
    )]
    CoordinateOutOfRange {
        /// Which point or anchor.
        what: String,
        #[allow(missing_docs)]
        x: f64,
        #[allow(missing_docs)]
        y: f64,
    },
    /// A drag must move by a finite amount.
    #[error("Cannot move {name} by ({dx}, {dy}), displacements must be finite")]
    NonFiniteDisplacement {
        /// The point being dragged.
        name: String,
        #[allow(missing_docs)]
        dx: f64,
        #[allow(missing_docs)]
        dy: f64,
    },
    /// The solver configuration can't be used.
    #[error("Invalid solver configuration: {reason}")]
    InvalidConfig {
        /// What's wrong with it.
        reason: String,
    },
}

impl SceneError {
    pub(crate) fn unknown_id(constraint_id: usize, id: PointId) -> Self {
        Self::UnknownPoint {
            constraint_id,
            name: id.to_string(),
        }
    }
}

/// Errors from parsing and executing linkage's textual scene format.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum TextualError {
    /// A line couldn't be parsed.
    #[error("Line {line}: {message}")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// What the parser expected.
        message: String,
    },
    /// A statement appeared before any `# section` header.
    #[error("Line {line}: expected a section header like `# points` before any statements")]
    MissingSection {
        /// 1-based line number.
        line: usize,
    },
    /// You referred to a point that was never declared.
    #[error("You referred to the point {label} but it was never defined")]
    UndefinedPoint {
        /// The undefined point.
        label: String,
    },
    /// The parsed scene was invalid.
    #[error(transparent)]
    Scene(#[from] SceneError),
}
