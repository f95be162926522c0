use faer::{Col, Mat, prelude::Solve};

use crate::{Config, Constraint, constraints::JacobianVar, point::Point, vector::V};

use super::{DegenerateSet, Layout, Outcome, all_satisfied, max_residual, sum_of_squares};

/// Give up on a step after halving it this many times.
const MAX_BACKTRACKS: usize = 30;

/// Damped Gauss-Newton over every referenced point at once.
/// Unlike relaxation, each step considers all constraints together, so it
/// doesn't depend on constraint order (beyond floating-point summation order).
/// Steps that would increase the sum of squared residuals are halved until they don't,
/// so a near-singular system can't fling points away.
pub(super) fn solve(points: &mut [Point], constraints: &[Constraint], config: &Config) -> Outcome {
    let layout = Layout::new(points.len(), constraints);
    let n = layout.num_columns();
    let mut degenerate = DegenerateSet::new(constraints.len());

    // Scratch space, reused between iterations.
    let mut residuals = Vec::with_capacity(2);
    let mut row0: Vec<JacobianVar> = Vec::with_capacity(4);
    let mut row1: Vec<JacobianVar> = Vec::with_capacity(4);
    let mut entries: Vec<(usize, f64)> = Vec::with_capacity(4);
    let mut scratch = Vec::new();
    let mut start: Vec<V> = Vec::with_capacity(layout.points().len());

    let mut iterations = 0;
    loop {
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

        /* Solve for the damped Gauss-Newton step d:
           (JᵀJ + λI) d = -Jᵀr
           J has one row per residual, but it's never stored.
           Each row's contribution is accumulated into A = JᵀJ + λI and b = -Jᵀr directly.
        */
        let mut a = Mat::<f64>::zeros(n, n);
        let mut b = Col::<f64>::zeros(n);
        for i in 0..n {
            a[(i, i)] = config.damping;
        }
        for (constraint_id, constraint) in constraints.iter().enumerate() {
            residuals.clear();
            row0.clear();
            row1.clear();
            constraint.residual_rows(points, &mut residuals);
            if !constraint.jacobian_rows(points, &mut row0, &mut row1) {
                degenerate.mark(constraint_id);
                continue;
            }
            for (row, r) in [&row0, &row1].into_iter().zip(residuals.iter().copied()) {
                entries.clear();
                entries.extend(row.iter().filter_map(|var| {
                    layout
                        .column(var.point, var.component)
                        .map(|col| (col, var.partial_derivative))
                }));
                for &(ci, pi) in &entries {
                    b[ci] -= pi * r;
                    for &(cj, pj) in &entries {
                        a[(ci, cj)] += pi * pj;
                    }
                }
            }
        }

        let d = a.partial_piv_lu().solve(&b);
        if !d.iter().all(|x| x.is_finite()) {
            tracing::debug!(iterations, "Gauss-Newton step was not finite, stopping");
            break;
        }

        let f0 = sum_of_squares(constraints, points, &mut scratch);
        start.clear();
        start.extend(layout.points().iter().map(|p| points[p.index()].v()));
        let mut alpha = 1.0;
        let mut accepted = false;
        for _ in 0..MAX_BACKTRACKS {
            for (slot, p) in layout.points().iter().enumerate() {
                let step = V::new(d[2 * slot], d[2 * slot + 1]) * alpha;
                points[p.index()].set(start[slot] + step);
            }
            let f = sum_of_squares(constraints, points, &mut scratch);
            if f.is_finite() && f <= f0 {
                accepted = true;
                break;
            }
            alpha *= 0.5;
        }
        if !accepted {
            for (slot, p) in layout.points().iter().enumerate() {
                points[p.index()].set(start[slot]);
            }
            tracing::debug!(iterations, "Gauss-Newton step made things worse, stopping");
            break;
        }

        let current_inf_norm = start
            .iter()
            .map(|v| libm::fmax(v.x.abs(), v.y.abs()))
            .fold(0.0, libm::fmax);
        let step_inf_norm = alpha * d.iter().map(|x| x.abs()).fold(0.0, libm::fmax);
        iterations += 1;
        tracing::trace!(
            iterations,
            step = step_inf_norm,
            max_residual = max_residual(constraints, points),
            "Gauss-Newton step"
        );

        // A negligible step means this is a least-squares minimum. If the constraints
        // are inconsistent, it's the best we'll get.
        let step_threshold = config.step_tolerance * (current_inf_norm + config.step_tolerance);
        if step_inf_norm <= step_threshold {
            break;
        }
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

    fn config() -> Config {
        Config::default().with_strategy(Strategy::GaussNewton)
    }

    #[test]
    fn closes_a_triangle() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        let mut points = vec![
            Point::new("a", 0.0, 0.0),
            Point::new("b", 4.0, 0.0),
            Point::new("c", 1.0, 1.0),
        ];
        let constraints = [
            Constraint::fixed(a, 0.0, 0.0),
            Constraint::fixed(b, 4.0, 0.0),
            Constraint::Distance(a, c, 3.0),
            Constraint::Distance(b, c, 3.0),
        ];
        let config = config();
        let outcome = solve(&mut points, &constraints, &config);
        assert!(outcome.converged);
        assert!(outcome.iterations < 50);
        // c lands on the perpendicular bisector of ab, on the side it started.
        assert!((points[2].x - 2.0).abs() < 1e-2);
        assert!((points[2].y - 5f64.sqrt()).abs() < 1e-2);
        assert!(outcome.degenerate.is_empty());
    }

    #[test]
    fn unreferenced_points_stay_put() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let _lonely = ids.next_id();
        let c = ids.next_id();
        let mut points = vec![
            Point::new("a", 0.0, 0.0),
            Point::new("lonely", 7.0, 7.0),
            Point::new("c", 2.0, 0.0),
        ];
        let constraints = [
            Constraint::fixed(a, 0.0, 0.0),
            Constraint::Distance(a, c, 1.0),
        ];
        let outcome = solve(&mut points, &constraints, &config());
        assert!(outcome.converged);
        assert_eq!(points[1], Point::new("lonely", 7.0, 7.0));
    }

    #[test]
    fn coincident_points_do_not_poison_the_step() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        let mut points = vec![Point::new("a", 3.0, 3.0), Point::new("b", 3.0, 3.0)];
        let constraints = [Constraint::Distance(a, b, 1.0)];
        let outcome = solve(&mut points, &constraints, &config().with_max_iterations(5));
        assert!(!outcome.converged);
        assert_eq!(outcome.degenerate, vec![0]);
        assert!(points.iter().all(|p| p.position().is_finite()));
    }
}
