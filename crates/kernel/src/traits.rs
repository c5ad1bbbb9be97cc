//! Evaluation traits consumed by measurement code.
//!
//! Callers outside the kernel only need to evaluate curves and surfaces and to
//! recognise the analytic special cases; these traits are that seam.

use crate::geometry::curves::{Line3d, TrimmedCurve};
use crate::geometry::domain::ParamRange;
use crate::geometry::point::{Point2d, Point3d};
use crate::geometry::surfaces::{Cylinder, Plane, Surface};
use crate::geometry::vector::Vec3;

/// Evaluation of a bounded 3D curve.
pub trait CurveEval {
    fn point_at(&self, t: f64) -> Point3d;

    fn tangent_at(&self, t: f64) -> Vec3;

    /// Parameter range the curve is trimmed to.
    fn domain(&self) -> ParamRange;

    /// Parameters inside the domain where the curve is extremal along
    /// `direction`. `samples` bounds the search for non-analytic curves.
    fn critical_params_along(&self, direction: &Vec3, samples: usize) -> Vec<f64>;

    /// Supporting plane of a planar curve. Lines report none.
    fn plane(&self, tol: f64) -> Option<Plane>;

    fn as_line(&self) -> Option<&Line3d>;

    fn start_point(&self) -> Point3d {
        self.point_at(self.domain().start)
    }

    fn end_point(&self) -> Point3d {
        self.point_at(self.domain().end)
    }

    fn mid_point(&self) -> Point3d {
        self.point_at(self.domain().mid())
    }
}

/// Evaluation of a parametric surface.
pub trait SurfaceEval {
    fn point_at(&self, uv: Point2d) -> Point3d;

    fn normal_at(&self, uv: Point2d) -> Vec3;

    /// Inverse evaluation, where the surface supports it.
    fn params_of(&self, p: &Point3d) -> Option<Point2d>;

    fn as_plane(&self) -> Option<&Plane>;

    fn as_cylinder(&self) -> Option<&Cylinder>;
}

// ── Implementations ────────────────────────────────────────────────────────

impl CurveEval for TrimmedCurve {
    fn point_at(&self, t: f64) -> Point3d {
        self.curve.evaluate(t)
    }

    fn tangent_at(&self, t: f64) -> Vec3 {
        self.curve.derivative(t)
    }

    fn domain(&self) -> ParamRange {
        self.range
    }

    fn critical_params_along(&self, direction: &Vec3, samples: usize) -> Vec<f64> {
        self.curve.critical_params_along(direction, &self.range, samples)
    }

    fn plane(&self, tol: f64) -> Option<Plane> {
        self.curve.plane(tol)
    }

    fn as_line(&self) -> Option<&Line3d> {
        TrimmedCurve::as_line(self)
    }
}

impl SurfaceEval for Surface {
    fn point_at(&self, uv: Point2d) -> Point3d {
        self.evaluate(uv.x, uv.y)
    }

    fn normal_at(&self, uv: Point2d) -> Vec3 {
        Surface::normal_at(self, uv.x, uv.y)
    }

    fn params_of(&self, p: &Point3d) -> Option<Point2d> {
        self.parameters_of(p)
    }

    fn as_plane(&self) -> Option<&Plane> {
        match self {
            Surface::Plane(p) => Some(p),
            _ => None,
        }
    }

    fn as_cylinder(&self) -> Option<&Cylinder> {
        match self {
            Surface::Cylinder(c) => Some(c),
            _ => None,
        }
    }
}
