use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::domain::ParamRange;
use super::nurbs::NurbsCurve;
use super::point::Point3d;
use super::surfaces::Plane;
use super::vector::Vec3;

/// Analytic and parametric curve representations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Curve {
    Line(Line3d),
    Circle(Circle3d),
    Ellipse(Ellipse3d),
    Nurbs(NurbsCurve),
}

/// An infinite line through `origin` with unit `direction`, parameterised by
/// arc length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Line3d {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Line3d {
    pub fn new(origin: Point3d, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn from_points(a: Point3d, b: Point3d) -> Self {
        Self::new(a, b - a)
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }

    /// Perpendicular foot of `p` and its parameter.
    pub fn closest_point(&self, p: &Point3d) -> (Point3d, f64) {
        let t = (*p - self.origin).dot(&self.direction);
        (self.evaluate(t), t)
    }

    pub fn distance_to_point(&self, p: &Point3d) -> f64 {
        let (foot, _) = self.closest_point(p);
        p.distance_to(&foot)
    }
}

/// A circle in 3D space, `t` in radians from `x_axis`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Circle3d {
    pub center: Point3d,
    pub normal: Vec3,
    pub radius: f64,
    pub x_axis: Vec3,
}

impl Circle3d {
    pub fn new(center: Point3d, normal: Vec3, radius: f64) -> Self {
        let normal = normal.normalize();
        Self {
            center,
            normal,
            radius,
            x_axis: normal.any_perpendicular(),
        }
    }

    pub fn with_axes(center: Point3d, normal: Vec3, x_axis: Vec3, radius: f64) -> Self {
        Self {
            center,
            normal: normal.normalize(),
            x_axis: x_axis.normalize(),
            radius,
        }
    }

    fn y_axis(&self) -> Vec3 {
        self.normal.cross(&self.x_axis)
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        self.center + self.x_axis * (self.radius * t.cos()) + self.y_axis() * (self.radius * t.sin())
    }

    pub fn derivative(&self, t: f64) -> Vec3 {
        self.x_axis * (-self.radius * t.sin()) + self.y_axis() * (self.radius * t.cos())
    }
}

/// An ellipse in 3D space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ellipse3d {
    pub center: Point3d,
    pub normal: Vec3,
    pub major_axis: Vec3,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Ellipse3d {
    pub fn new(
        center: Point3d,
        normal: Vec3,
        major_axis: Vec3,
        major_radius: f64,
        minor_radius: f64,
    ) -> Self {
        Self {
            center,
            normal: normal.normalize(),
            major_axis: major_axis.normalize(),
            major_radius,
            minor_radius,
        }
    }

    fn minor_axis(&self) -> Vec3 {
        self.normal.cross(&self.major_axis)
    }

    pub fn evaluate(&self, t: f64) -> Point3d {
        self.center
            + self.major_axis * (self.major_radius * t.cos())
            + self.minor_axis() * (self.minor_radius * t.sin())
    }

    pub fn derivative(&self, t: f64) -> Vec3 {
        self.major_axis * (-self.major_radius * t.sin())
            + self.minor_axis() * (self.minor_radius * t.cos())
    }
}

impl Curve {
    pub fn evaluate(&self, t: f64) -> Point3d {
        match self {
            Curve::Line(l) => l.evaluate(t),
            Curve::Circle(c) => c.evaluate(t),
            Curve::Ellipse(e) => e.evaluate(t),
            Curve::Nurbs(n) => n.evaluate(t),
        }
    }

    pub fn derivative(&self, t: f64) -> Vec3 {
        match self {
            Curve::Line(l) => l.direction,
            Curve::Circle(c) => c.derivative(t),
            Curve::Ellipse(e) => e.derivative(t),
            Curve::Nurbs(n) => n.derivative(t),
        }
    }

    /// The plane containing the curve, if it is planar.
    ///
    /// A line lies in infinitely many planes, so it reports none.
    pub fn plane(&self, tol: f64) -> Option<Plane> {
        match self {
            Curve::Line(_) => None,
            Curve::Circle(c) => Some(Plane::from_axes(c.center, c.x_axis, c.y_axis())),
            Curve::Ellipse(e) => Some(Plane::from_axes(e.center, e.major_axis, e.minor_axis())),
            Curve::Nurbs(n) => n.plane(tol),
        }
    }

    /// Parameters inside `range` where the tangent is perpendicular to
    /// `direction`, i.e. where the curve is extremal along it.
    pub fn critical_params_along(&self, direction: &Vec3, range: &ParamRange, samples: usize) -> Vec<f64> {
        let periodic_roots = |a: f64, b: f64| -> Vec<f64> {
            // Roots of -a sin t + b cos t = 0.
            if a.abs() < 1e-15 && b.abs() < 1e-15 {
                return vec![];
            }
            let t0 = b.atan2(a);
            let mut roots = Vec::new();
            for base in [t0, t0 + PI] {
                if let Some(t) = range.wrap_periodic(base, 2.0 * PI, 1e-12) {
                    let mut t = t;
                    while range.contains(t, 1e-12) {
                        roots.push(t);
                        t += 2.0 * PI;
                    }
                }
            }
            roots.sort_by(f64::total_cmp);
            roots
        };

        match self {
            Curve::Line(_) => vec![],
            Curve::Circle(c) => periodic_roots(c.x_axis.dot(direction), c.y_axis().dot(direction)),
            Curve::Ellipse(e) => periodic_roots(
                e.major_radius * e.major_axis.dot(direction),
                e.minor_radius * e.minor_axis().dot(direction),
            ),
            Curve::Nurbs(n) => n.critical_params_along(direction, range, samples),
        }
    }

    pub fn curve_type_name(&self) -> &'static str {
        match self {
            Curve::Line(_) => "Line",
            Curve::Circle(_) => "Circle",
            Curve::Ellipse(_) => "Ellipse",
            Curve::Nurbs(_) => "Nurbs",
        }
    }
}

/// A curve restricted to a parameter range, as carried by an edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrimmedCurve {
    pub curve: Curve,
    pub range: ParamRange,
}

impl TrimmedCurve {
    pub fn new(curve: Curve, range: ParamRange) -> Self {
        Self { curve, range }
    }

    /// A straight segment from `a` to `b`.
    pub fn segment(a: Point3d, b: Point3d) -> Self {
        Self::new(
            Curve::Line(Line3d::from_points(a, b)),
            ParamRange::new(0.0, a.distance_to(&b)),
        )
    }

    pub fn start_point(&self) -> Point3d {
        self.curve.evaluate(self.range.start)
    }

    pub fn end_point(&self) -> Point3d {
        self.curve.evaluate(self.range.end)
    }

    pub fn mid_point(&self) -> Point3d {
        self.curve.evaluate(self.range.mid())
    }

    pub fn as_line(&self) -> Option<&Line3d> {
        match &self.curve {
            Curve::Line(l) => Some(l),
            _ => None,
        }
    }
}
