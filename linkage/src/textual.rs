//! A line-based textual format for scenes and the drags to apply to them.
//!
//! ```text
//! # points
//! a = (200, 100)
//! b = (200, 300)
//! # constraints
//! fixed(a)
//! fixed(b) at (200, 300)
//! distance(a, b)
//! # drags
//! b by (50, 0)
//! ```

mod executor;
mod instruction;
mod parser;

use std::str::FromStr;

pub use executor::Outcome;
pub use instruction::{DeclarePoint, Distance, Drag, Fix, Instruction};

use crate::TextualError;

/// A parsed scene, plus the drags to perform on it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Problem {
    /// Every point, in declaration order.
    pub points: Vec<DeclarePoint>,
    /// Every constraint, in declaration order.
    pub instructions: Vec<Instruction>,
    /// Drags to perform, in order.
    pub drags: Vec<Drag>,
}

impl FromStr for Problem {
    type Err = TextualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Name of a point.
#[derive(Debug, Eq, PartialEq, Clone, Hash)]
pub struct Label(String);

impl Label {
    /// The name as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        &self.0 == other
    }
}

impl PartialEq<String> for Label {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
