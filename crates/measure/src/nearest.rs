//! Bounded nearest-point search between two trimmed curves.
//!
//! Minimises `|A(s) - B(t)|^2` over both parameter ranges with a damped Newton
//! method. Steps that the Hessian cannot support fall back to projected
//! gradient descent, and a backtracking line search keeps every accepted step
//! downhill. The loop is capped by `ResolveConfig::max_iterations`.

use cad_kernel::CurveEval;
use cad_kernel::geometry::domain::ParamRange;
use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::vector::Vec3;
use nalgebra::{Matrix2, Vector2};
use tracing::trace;

use crate::config::ResolveConfig;
use crate::error::RelationFailure;

/// Result of a converged nearest-point search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPair {
    pub s: f64,
    pub t: f64,
    pub point_a: Point3d,
    pub point_b: Point3d,
    pub distance: f64,
    pub iterations: usize,
}

struct Objective<'a, A: ?Sized, B: ?Sized> {
    a: &'a A,
    b: &'a B,
    range_a: ParamRange,
    range_b: ParamRange,
}

impl<A: CurveEval + ?Sized, B: CurveEval + ?Sized> Objective<'_, A, B> {
    fn value(&self, x: &Vector2<f64>) -> f64 {
        self.a.point_at(x[0]).distance_squared_to(&self.b.point_at(x[1]))
    }

    fn clamp(&self, x: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(self.range_a.clamp(x[0]), self.range_b.clamp(x[1]))
    }

    /// Gradient and Hessian of the squared distance. Second derivatives of
    /// the curves come from central differences of their tangents.
    fn derivatives(&self, x: &Vector2<f64>) -> (Vector2<f64>, Matrix2<f64>) {
        let (s, t) = (x[0], x[1]);
        let d = self.a.point_at(s) - self.b.point_at(t);
        let da = self.a.tangent_at(s);
        let db = self.b.tangent_at(t);
        let dda = second_derivative(self.a, &self.range_a, s);
        let ddb = second_derivative(self.b, &self.range_b, t);

        let grad = Vector2::new(2.0 * d.dot(&da), -2.0 * d.dot(&db));
        let h_ss = 2.0 * (da.dot(&da) + d.dot(&dda));
        let h_tt = 2.0 * (db.dot(&db) - d.dot(&ddb));
        let h_st = -2.0 * da.dot(&db);
        (grad, Matrix2::new(h_ss, h_st, h_st, h_tt))
    }

    /// Gradient with the components that push against an active bound
    /// removed.
    fn projected(&self, x: &Vector2<f64>, grad: &Vector2<f64>) -> Vector2<f64> {
        let mut pg = *grad;
        for (i, range) in [self.range_a, self.range_b].iter().enumerate() {
            let at_start = x[i] <= range.start && grad[i] > 0.0;
            let at_end = x[i] >= range.end && grad[i] < 0.0;
            if at_start || at_end {
                pg[i] = 0.0;
            }
        }
        pg
    }
}

fn second_derivative<C: CurveEval + ?Sized>(curve: &C, range: &ParamRange, t: f64) -> Vec3 {
    let h = (range.length() * 1e-5).max(1e-9);
    let t0 = (t - h).max(range.start);
    let t1 = (t + h).min(range.end);
    if t1 - t0 < 1e-300 {
        return Vec3::ZERO;
    }
    (curve.tangent_at(t1) - curve.tangent_at(t0)) / (t1 - t0)
}

/// Descent direction for the free variables: the Newton step when the
/// reduced Hessian is positive definite, steepest descent otherwise.
fn descent_step(grad: &Vector2<f64>, hess: &Matrix2<f64>, free: [bool; 2]) -> Vector2<f64> {
    match free {
        [true, true] => hess
            .cholesky()
            .map(|c| c.solve(&(-grad)))
            .unwrap_or(-grad),
        [true, false] | [false, true] => {
            let i = if free[0] { 0 } else { 1 };
            let mut step = Vector2::zeros();
            step[i] = if hess[(i, i)] > 1e-300 {
                -grad[i] / hess[(i, i)]
            } else {
                -grad[i]
            };
            step
        }
        [false, false] => Vector2::zeros(),
    }
}

/// Local search from a single seed.
fn descend<A, B>(
    obj: &Objective<'_, A, B>,
    seed: Vector2<f64>,
    cfg: &ResolveConfig,
) -> Result<(Vector2<f64>, usize), RelationFailure>
where
    A: CurveEval + ?Sized,
    B: CurveEval + ?Sized,
{
    let step_tol = cfg.tolerance.parametric;
    let mut x = obj.clamp(seed);
    let mut fx = obj.value(&x);
    let mut gradient_norm = f64::INFINITY;

    for iteration in 0..cfg.max_iterations {
        let (grad, hess) = obj.derivatives(&x);
        let pg = obj.projected(&x, &grad);
        gradient_norm = pg.norm();
        if gradient_norm <= 1e-14 {
            return Ok((x, iteration));
        }

        let free = [pg[0] != 0.0, pg[1] != 0.0];
        let step = descent_step(&pg, &hess, free);

        // Backtracking line search.
        let mut alpha = 1.0_f64;
        let mut accepted = None;
        for _ in 0..40 {
            let candidate = obj.clamp(x + step * alpha);
            let fc = obj.value(&candidate);
            if fc < fx {
                accepted = Some((candidate, fc));
                break;
            }
            alpha *= 0.5;
        }

        let Some((next, f_next)) = accepted else {
            // No downhill step left at working precision.
            return Ok((x, iteration));
        };

        let moved = (next - x).norm();
        x = next;
        fx = f_next;
        trace!(iteration, distance_sq = fx, gradient = gradient_norm, "nearest-point step");
        if moved <= step_tol * (1.0 + x.norm()) {
            return Ok((x, iteration + 1));
        }
    }

    Err(RelationFailure::NotConverged {
        iterations: cfg.max_iterations,
        gradient: gradient_norm,
    })
}

/// Closest pair of points between two bounded curves.
///
/// Seeds the search at the mid-parameters and at the best pair of a coarse
/// `seed_samples` grid, and keeps the nearest converged result.
pub fn nearest_points<A, B>(a: &A, b: &B, cfg: &ResolveConfig) -> Result<NearestPair, RelationFailure>
where
    A: CurveEval + ?Sized,
    B: CurveEval + ?Sized,
{
    let obj = Objective {
        a,
        b,
        range_a: a.domain(),
        range_b: b.domain(),
    };

    let mut seeds = vec![Vector2::new(obj.range_a.mid(), obj.range_b.mid())];
    let grid_best = obj
        .range_a
        .samples(cfg.seed_samples)
        .flat_map(|s| obj.range_b.samples(cfg.seed_samples).map(move |t| Vector2::new(s, t)))
        .min_by(|p, q| obj.value(p).total_cmp(&obj.value(q)));
    if let Some(seed) = grid_best {
        seeds.push(seed);
    }

    let mut best: Option<NearestPair> = None;
    let mut last_failure = None;
    for seed in seeds {
        match descend(&obj, seed, cfg) {
            Ok((x, iterations)) => {
                let point_a = a.point_at(x[0]);
                let point_b = b.point_at(x[1]);
                let candidate = NearestPair {
                    s: x[0],
                    t: x[1],
                    point_a,
                    point_b,
                    distance: point_a.distance_to(&point_b),
                    iterations,
                };
                if best.is_none_or(|current| candidate.distance < current.distance) {
                    best = Some(candidate);
                }
            }
            Err(failure) => last_failure = Some(failure),
        }
    }

    best.ok_or(last_failure.unwrap_or(RelationFailure::NotConverged {
        iterations: 0,
        gradient: f64::NAN,
    }))
}
