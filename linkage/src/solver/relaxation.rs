use crate::{Config, Constraint, constraints::Correction, point::Point};

use super::{DegenerateSet, Outcome, all_satisfied, max_residual};

/// Gauss-Seidel relaxation.
/// Each pass corrects every constraint once, in list order, and later constraints
/// see the corrections made by earlier ones in the same pass. That makes the result
/// depend on constraint order, so the order is never changed here.
pub(super) fn solve(points: &mut [Point], constraints: &[Constraint], config: &Config) -> Outcome {
    let mut degenerate = DegenerateSet::new(constraints.len());
    let mut iterations = 0;
    loop {
        if all_satisfied(constraints, points, config.tolerance) {
            return Outcome {
                converged: true,
                iterations,
                degenerate: degenerate.into_ids(),
            };
        }
        if iterations == config.max_iterations {
            break;
        }
        for (i, constraint) in constraints.iter().enumerate() {
            if constraint.correct(points, config) == Correction::Degenerate {
                degenerate.mark(i);
            }
        }
        iterations += 1;
        tracing::trace!(
            iterations,
            max_residual = max_residual(constraints, points),
            "relaxation pass"
        );
    }
    Outcome {
        converged: false,
        iterations,
        degenerate: degenerate.into_ids(),
    }
}
