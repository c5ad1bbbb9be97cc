use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::ParamRange;
use super::point::Point3d;
use super::surfaces::Plane;
use super::vector::Vec3;

#[derive(Debug, Error, PartialEq)]
pub enum NurbsError {
    #[error("Knot vector has {actual} entries, expected {expected} (n + p + 1)")]
    KnotCount { expected: usize, actual: usize },
    #[error("Weight count {weights} does not match control point count {points}")]
    WeightCount { weights: usize, points: usize },
    #[error("Degree {degree} needs at least {} control points", .degree + 1)]
    TooFewControlPoints { degree: usize },
    #[error("Knot vector is not non-decreasing")]
    UnsortedKnots,
}

/// A (possibly rational) B-spline curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NurbsCurve {
    pub degree: usize,
    pub control_points: Vec<Point3d>,
    /// Empty means non-rational (all weights 1).
    pub weights: Vec<f64>,
    pub knots: Vec<f64>,
}

impl NurbsCurve {
    pub fn try_new(
        degree: usize,
        control_points: Vec<Point3d>,
        weights: Vec<f64>,
        knots: Vec<f64>,
    ) -> Result<Self, NurbsError> {
        if control_points.len() <= degree {
            return Err(NurbsError::TooFewControlPoints { degree });
        }
        let expected = control_points.len() + degree + 1;
        if knots.len() != expected {
            return Err(NurbsError::KnotCount {
                expected,
                actual: knots.len(),
            });
        }
        if !weights.is_empty() && weights.len() != control_points.len() {
            return Err(NurbsError::WeightCount {
                weights: weights.len(),
                points: control_points.len(),
            });
        }
        if knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(NurbsError::UnsortedKnots);
        }
        Ok(Self {
            degree,
            control_points,
            weights,
            knots,
        })
    }

    /// Clamped uniform B-spline over `[0, 1]`.
    pub fn clamped_uniform(degree: usize, control_points: Vec<Point3d>) -> Result<Self, NurbsError> {
        let n = control_points.len();
        if n <= degree {
            return Err(NurbsError::TooFewControlPoints { degree });
        }
        let interior = n - degree - 1;
        let mut knots = vec![0.0; degree + 1];
        knots.extend((1..=interior).map(|i| i as f64 / (interior + 1) as f64));
        knots.extend(std::iter::repeat_n(1.0, degree + 1));
        Self::try_new(degree, control_points, vec![], knots)
    }

    fn weight(&self, i: usize) -> f64 {
        self.weights.get(i).copied().unwrap_or(1.0)
    }

    pub fn domain(&self) -> ParamRange {
        ParamRange::new(self.knots[self.degree], self.knots[self.knots.len() - self.degree - 1])
    }

    fn find_span(&self, t: f64) -> usize {
        let n = self.control_points.len() - 1;
        let p = self.degree;
        if t >= self.knots[n + 1] {
            return n;
        }
        if t <= self.knots[p] {
            return p;
        }
        // Last span whose start knot is <= t.
        let idx = self.knots[p..=n + 1].partition_point(|&k| k <= t);
        p + idx - 1
    }

    fn basis_functions(&self, span: usize, t: f64) -> Vec<f64> {
        let p = self.degree;
        let mut n_vals = vec![0.0; p + 1];
        let mut left = vec![0.0; p + 1];
        let mut right = vec![0.0; p + 1];

        n_vals[0] = 1.0;
        for j in 1..=p {
            left[j] = t - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                let denom = right[r + 1] + left[j - r];
                let temp = if denom.abs() < 1e-300 { 0.0 } else { n_vals[r] / denom };
                n_vals[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n_vals[j] = saved;
        }
        n_vals
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        let t = self.domain().clamp(t);
        let span = self.find_span(t);
        let basis = self.basis_functions(span, t);

        let mut acc = Vec3::ZERO;
        let mut w_sum = 0.0;
        for (i, b) in basis.iter().enumerate() {
            let idx = span - self.degree + i;
            let w = b * self.weight(idx);
            acc = acc + self.control_points[idx].to_vec3() * w;
            w_sum += w;
        }
        if w_sum.abs() < 1e-300 {
            return self.control_points[span];
        }
        Point3d::ORIGIN + acc / w_sum
    }

    /// First derivative by central differences, one-sided at the domain ends.
    pub fn derivative(&self, t: f64) -> Vec3 {
        let dom = self.domain();
        let h = (dom.length() * 1e-6).max(1e-12);
        let t0 = (t - h).max(dom.start);
        let t1 = (t + h).min(dom.end);
        if t1 - t0 < 1e-300 {
            return Vec3::ZERO;
        }
        (self.evaluate(t1) - self.evaluate(t0)) / (t1 - t0)
    }

    /// Plane through all control points, if they are coplanar and not collinear.
    ///
    /// Coplanar control points imply a planar curve (convex-hull property).
    pub fn plane(&self, tol: f64) -> Option<Plane> {
        let origin = *self.control_points.first()?;
        let u = self
            .control_points
            .iter()
            .map(|p| *p - origin)
            .find(|v| v.length() > tol)?;
        let normal = self
            .control_points
            .iter()
            .map(|p| u.cross(&(*p - origin)))
            .find(|n| n.length() > tol * u.length())?;
        let plane = Plane::from_axes(origin, u, normal.cross(&u));
        self.control_points
            .iter()
            .all(|p| plane.signed_distance(p).abs() <= tol)
            .then_some(plane)
    }

    /// Sign changes of `tangent . direction` found by sampling, refined by
    /// bisection.
    pub fn critical_params_along(&self, direction: &Vec3, range: &ParamRange, samples: usize) -> Vec<f64> {
        let g = |t: f64| self.derivative(t).dot(direction);
        let params: Vec<f64> = range.samples(samples.max(2)).collect();
        let mut roots = Vec::new();

        for pair in params.windows(2) {
            let (mut a, mut b) = (pair[0], pair[1]);
            let (mut ga, gb) = (g(a), g(b));
            if ga == 0.0 {
                roots.push(a);
                continue;
            }
            if ga.signum() == gb.signum() {
                continue;
            }
            for _ in 0..60 {
                let m = 0.5 * (a + b);
                let gm = g(m);
                if gm.signum() == ga.signum() {
                    a = m;
                    ga = gm;
                } else {
                    b = m;
                }
            }
            roots.push(0.5 * (a + b));
        }
        roots.dedup_by(|x, y| (*x - *y).abs() < 1e-9);
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn quadratic_arch() -> NurbsCurve {
        NurbsCurve::clamped_uniform(
            2,
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 2.0, 0.0),
                Point3d::new(2.0, 0.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_endpoints_interpolated() {
        let c = quadratic_arch();
        assert_abs_diff_eq!(c.evaluate(0.0), Point3d::ORIGIN, epsilon = 1e-12);
        assert_abs_diff_eq!(c.evaluate(1.0), Point3d::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(c.evaluate(0.5), Point3d::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_knots_rejected() {
        let err = NurbsCurve::try_new(2, vec![Point3d::ORIGIN; 3], vec![], vec![0.0; 5]).unwrap_err();
        assert_eq!(err, NurbsError::KnotCount { expected: 6, actual: 5 });
        let err = NurbsCurve::try_new(3, vec![Point3d::ORIGIN; 3], vec![], vec![]).unwrap_err();
        assert_eq!(err, NurbsError::TooFewControlPoints { degree: 3 });
    }

    #[test]
    fn test_planar_control_polygon() {
        let plane = quadratic_arch().plane(1e-9).unwrap();
        assert!(plane.normal.cross(&Vec3::Z).length() < 1e-12);

        let twisted = NurbsCurve::clamped_uniform(
            2,
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(1.0, 1.0, 0.0),
                Point3d::new(1.0, 1.0, 1.0),
            ],
        )
        .unwrap();
        assert!(twisted.plane(1e-9).is_none());
    }

    #[test]
    fn test_arch_apex_is_critical_along_y() {
        let c = quadratic_arch();
        let roots = c.critical_params_along(&Vec3::Y, &c.domain(), 16);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 0.5).abs() < 1e-6);
    }
}
