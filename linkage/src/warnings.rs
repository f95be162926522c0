use std::collections::HashMap;

use crate::{Config, Constraint, PointId, datatypes::Position, point::Point};

/// Stiffness below this barely moves anything per pass, so solves crawl
/// until they run out of iterations.
const NEGLIGIBLE_STIFFNESS: f64 = 1e-3;

/// Something suspicious about a scene, or something that went wrong while solving it.
#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Warning {
    /// Index of the constraint this is about, if any.
    pub about_constraint: Option<usize>,
    /// What's wrong.
    pub content: WarningContent,
}

/// Each kind of warning.
#[derive(Debug, Clone, serde::Serialize)]
#[cfg_attr(test, derive(PartialEq))]
#[non_exhaustive]
pub enum WarningContent {
    /// The two points of a distance constraint coincided during the solve,
    /// so its correction was skipped.
    Degenerate,
    /// This point was already pinned somewhere else.
    ConflictingPins {
        /// The point pinned twice.
        point: String,
    },
    /// This pair of points was already given a different length.
    ContradictoryLengths {
        /// The length from the earlier constraint.
        first: f64,
        /// The length from this constraint.
        second: f64,
    },
    /// Both ends are pinned, but the anchors aren't the required distance apart.
    PinnedLengthMismatch {
        /// How far apart the anchors are.
        anchors_apart: f64,
        /// The length the constraint requires.
        length: f64,
    },
    /// A distance constraint from a point to itself with a non-zero length.
    SelfLink,
    /// The configured stiffness is so small that corrections barely move anything.
    NegligibleStiffness {
        /// Which stiffness setting.
        which: &'static str,
        /// Its value.
        stiffness: f64,
    },
}

/// Look for problems that can be spotted before solving.
pub(crate) fn lint(constraints: &[Constraint], points: &[Point], config: &Config) -> Vec<Warning> {
    let mut warnings = Vec::default();

    let mut pins: HashMap<PointId, Position> = HashMap::new();
    for (i, constraint) in constraints.iter().enumerate() {
        let Constraint::FixedPosition(p, anchor) = *constraint else {
            continue;
        };
        match pins.get(&p) {
            Some(earlier) if earlier.euclidean_distance(anchor) > config.tolerance => {
                warnings.push(Warning {
                    about_constraint: Some(i),
                    content: WarningContent::ConflictingPins {
                        point: points[p.index()].name.clone(),
                    },
                });
            }
            Some(_) => {}
            None => {
                pins.insert(p, anchor);
            }
        }
    }

    let mut lengths: HashMap<(PointId, PointId), f64> = HashMap::new();
    for (i, constraint) in constraints.iter().enumerate() {
        let Constraint::Distance(p1, p2, length) = *constraint else {
            continue;
        };
        if p1 == p2 {
            if length > config.tolerance {
                warnings.push(Warning {
                    about_constraint: Some(i),
                    content: WarningContent::SelfLink,
                });
            }
            continue;
        }
        let pair = (p1.min(p2), p1.max(p2));
        match lengths.get(&pair) {
            Some(&first) if (first - length).abs() > 2.0 * config.tolerance => {
                warnings.push(Warning {
                    about_constraint: Some(i),
                    content: WarningContent::ContradictoryLengths {
                        first,
                        second: length,
                    },
                });
            }
            Some(_) => {}
            None => {
                lengths.insert(pair, length);
            }
        }
        if let (Some(a), Some(b)) = (pins.get(&p1), pins.get(&p2)) {
            let anchors_apart = a.euclidean_distance(*b);
            if (anchors_apart - length).abs() > config.tolerance {
                warnings.push(Warning {
                    about_constraint: Some(i),
                    content: WarningContent::PinnedLengthMismatch {
                        anchors_apart,
                        length,
                    },
                });
            }
        }
    }

    for (which, stiffness) in [
        ("distance", config.distance_stiffness),
        ("pin", config.pin_stiffness),
    ] {
        if stiffness < NEGLIGIBLE_STIFFNESS {
            warnings.push(Warning {
                about_constraint: None,
                content: WarningContent::NegligibleStiffness { which, stiffness },
            });
        }
    }
    warnings
}

impl std::fmt::Display for WarningContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningContent::Degenerate => write!(
                f,
                "The two points of this distance constraint landed on top of each other, so there was no direction to push them apart in. Its corrections were skipped while they overlapped."
            ),
            WarningContent::ConflictingPins { point } => {
                write!(
                    f,
                    "{point} is pinned to two different places, so this scene can never converge"
                )
            }
            WarningContent::ContradictoryLengths { first, second } => write!(
                f,
                "These points must be both {first} and {second} apart, so this scene can never converge"
            ),
            WarningContent::PinnedLengthMismatch {
                anchors_apart,
                length,
            } => write!(
                f,
                "Both ends are pinned {anchors_apart} apart, but must be {length} apart"
            ),
            WarningContent::SelfLink => {
                write!(f, "This distance constraint links a point to itself")
            }
            WarningContent::NegligibleStiffness { which, stiffness } => write!(
                f,
                "The {which} stiffness {stiffness} is so small that corrections will barely move anything, try something around 0.5"
            ),
        }
    }
}
