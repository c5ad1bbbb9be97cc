//! Parameter ranges for trimmed curves and rectangular `(u, v)` domains for
//! trimmed faces.

use serde::{Deserialize, Serialize};

use super::point::Point2d;

/// A closed 1D parameter interval `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub start: f64,
    pub end: f64,
}

impl ParamRange {
    /// Build a range, ordering the bounds.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn mid(&self) -> f64 {
        0.5 * (self.start + self.end)
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64, tol: f64) -> bool {
        t >= self.start - tol && t <= self.end + tol
    }

    pub fn clamp(&self, t: f64) -> f64 {
        t.clamp(self.start, self.end)
    }

    /// `n + 1` evenly spaced parameters covering the range.
    pub fn samples(&self, n: usize) -> impl Iterator<Item = f64> + '_ {
        let n = n.max(1);
        (0..=n).map(move |i| self.start + self.length() * (i as f64 / n as f64))
    }

    /// Shift a periodic parameter by whole periods so it lands in this range,
    /// if any representative does.
    pub fn wrap_periodic(&self, t: f64, period: f64, tol: f64) -> Option<f64> {
        let k = ((self.start - t) / period).ceil();
        let candidate = t + k * period;
        if self.contains(candidate, tol) {
            return Some(candidate);
        }
        // `start` itself may sit a hair above a representative.
        let below = candidate - period;
        self.contains(below, tol).then_some(below)
    }
}

/// A rectangular patch of a surface's parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvDomain {
    pub u: ParamRange,
    pub v: ParamRange,
}

impl UvDomain {
    pub fn new(u0: f64, u1: f64, v0: f64, v1: f64) -> Self {
        Self {
            u: ParamRange::new(u0, u1),
            v: ParamRange::new(v0, v1),
        }
    }

    pub fn center(&self) -> Point2d {
        Point2d::new(self.u.mid(), self.v.mid())
    }

    pub fn contains(&self, p: &Point2d, tol: f64) -> bool {
        self.u.contains(p.x, tol) && self.v.contains(p.y, tol)
    }

    /// Clip the segment `a -> b` against the domain (Liang-Barsky).
    ///
    /// Returns the surviving sub-segment, or `None` if it lies fully outside.
    pub fn clip_segment(&self, a: Point2d, b: Point2d) -> Option<(Point2d, Point2d)> {
        let d = b - a;
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;

        let edges = [
            (-d.x, a.x - self.u.start),
            (d.x, self.u.end - a.x),
            (-d.y, a.y - self.v.start),
            (d.y, self.v.end - a.y),
        ];

        for (p, q) in edges {
            if p.abs() < 1e-15 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        Some((a.lerp(&b, t0), a.lerp(&b, t1)))
    }
}
