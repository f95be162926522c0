//! Parse the linkage text format, which describes a scene and some drags,
//! then perform those drags.
use linkage::{Config, datatypes::Position, textual::Problem};
use std::str::FromStr;

const EPSILON: f64 = 1e-2;

fn main() {
    let file = "\
# points
p = (0, 0)
q = (3, 4)

# constraints
fixed(p)
distance(p, q) = 5

# drags
q to (10, 0)
";
    let problem = Problem::from_str(file).unwrap();
    let outcome = problem.run(Config::default()).unwrap();

    // Check the outcome.
    let report = outcome.last_report().unwrap();
    assert!(report.converged());
    assert_points_eq(outcome.get_point("p").unwrap(), Position { x: 0.0, y: 0.0 });
    assert_points_eq(outcome.get_point("q").unwrap(), Position { x: 5.0, y: 0.0 });
}

#[track_caller]
fn assert_points_eq(l: Position, r: Position) {
    let dist = l.euclidean_distance(r);
    assert!(dist < EPSILON, "LHS was {l}, RHS was {r}, dist was {dist}");
}
