use crate::{Config, Constraint, point::Point};

use super::{DegenerateSet, Layout, Outcome, all_satisfied, sum_of_squares as penalty};

/// Sufficient-decrease constant for the Armijo condition.
const ARMIJO: f64 = 1e-4;
/// Give up on a line search after halving the step this many times.
const MAX_BACKTRACKS: usize = 40;

/// The coordinate stored in this layout column.
fn coordinate<'a>(points: &'a mut [Point], layout: &Layout, column: usize) -> &'a mut f64 {
    let point = &mut points[layout.points()[column / 2].index()];
    if column % 2 == 0 {
        &mut point.x
    } else {
        &mut point.y
    }
}

/// Minimize the total penalty by gradient descent, with numerical (central-difference)
/// gradients and a backtracking line search.
pub(super) fn solve(points: &mut [Point], constraints: &[Constraint], config: &Config) -> Outcome {
    let layout = Layout::new(points.len(), constraints);
    let n = layout.num_columns();
    let h = config.gradient_step;
    let mut degenerate = DegenerateSet::new(constraints.len());
    let mut scratch = Vec::new();
    let mut gradient = vec![0.0; n];
    let mut start = vec![0.0; n];

    let mut iterations = 0;
    loop {
        for (i, constraint) in constraints.iter().enumerate() {
            if constraint.is_degenerate(points) {
                degenerate.mark(i);
            }
        }
        if all_satisfied(constraints, points, config.tolerance) {
            return Outcome {
                converged: true,
                iterations,
                degenerate: degenerate.into_ids(),
            };
        }
        if iterations == config.max_iterations || n == 0 {
            break;
        }

        let f = penalty(constraints, points, &mut scratch);
        for (column, g) in gradient.iter_mut().enumerate() {
            let original = *coordinate(points, &layout, column);
            *coordinate(points, &layout, column) = original + h;
            let f_plus = penalty(constraints, points, &mut scratch);
            *coordinate(points, &layout, column) = original - h;
            let f_minus = penalty(constraints, points, &mut scratch);
            *coordinate(points, &layout, column) = original;
            *g = (f_plus - f_minus) / (2.0 * h);
        }
        let gradient_norm_sq: f64 = gradient.iter().map(|g| g * g).sum();
        if !(gradient_norm_sq.is_finite() && gradient_norm_sq > 0.0) {
            tracing::debug!(iterations, "penalty gradient vanished, stopping");
            break;
        }

        for (column, s) in start.iter_mut().enumerate() {
            *s = *coordinate(points, &layout, column);
        }
        // The minimum penalty is 0, so f / |g|² is a step that would reach it
        // if the penalty were linear along the gradient.
        let mut alpha = f / gradient_norm_sq;
        let mut accepted = false;
        for _ in 0..MAX_BACKTRACKS {
            for column in 0..n {
                *coordinate(points, &layout, column) = start[column] - alpha * gradient[column];
            }
            let candidate = penalty(constraints, points, &mut scratch);
            if candidate.is_finite() && candidate <= f - ARMIJO * alpha * gradient_norm_sq {
                accepted = true;
                break;
            }
            alpha *= 0.5;
        }
        if !accepted {
            for column in 0..n {
                *coordinate(points, &layout, column) = start[column];
            }
            tracing::debug!(iterations, "penalty line search found no descent, stopping");
            break;
        }
        iterations += 1;
        tracing::trace!(iterations, alpha, penalty = f, "penalty descent step");
    }
    Outcome {
        converged: all_satisfied(constraints, points, config.tolerance),
        iterations,
        degenerate: degenerate.into_ids(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Strategy, id::IdGenerator};

    #[test]
    fn stretches_a_pinned_link() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        let mut points = vec![Point::new("a", 0.0, 0.0), Point::new("b", 3.0, 0.0)];
        let constraints = [
            Constraint::fixed(a, 0.0, 0.0),
            Constraint::Distance(a, b, 5.0),
        ];
        let config = Config::default().with_strategy(Strategy::Penalty);
        let outcome = solve(&mut points, &constraints, &config);
        assert!(outcome.converged);
        assert!(constraints[1].is_satisfied(&points, config.tolerance));
        assert!(points[0].position().euclidean_distance((0.0, 0.0).into()) <= config.tolerance);
    }

    #[test]
    fn penalty_sums_squared_rows() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        let points = vec![Point::new("a", 1.0, 2.0), Point::new("b", 1.0, 0.0)];
        let constraints = [
            Constraint::fixed(a, 0.0, 0.0),
            Constraint::Distance(a, b, 5.0),
        ];
        let mut scratch = Vec::new();
        // Pin rows are 1 and 2; the distance row is 2 - 5.
        let f = penalty(&constraints, &points, &mut scratch);
        assert!((f - (1.0 + 4.0 + 9.0)).abs() < 1e-12);
    }

    #[test]
    fn nothing_to_do_when_satisfied() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let mut points = vec![Point::new("a", 1.0, 1.0)];
        let constraints = [Constraint::fixed(a, 1.0, 1.0)];
        let outcome = solve(&mut points, &constraints, &Config::default());
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 0);
    }
}
