use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::curves::Line3d;
use super::point::{Point2d, Point3d};
use super::vector::Vec3;

/// Surface geometry carried by faces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Surface {
    Plane(Plane),
    Cylinder(Cylinder),
    Cone(Cone),
    Sphere(Sphere),
    Torus(Torus),
}

/// An oriented plane with an in-plane frame. Bounded by a `UvDomain` when it
/// backs a face.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3d,
    pub normal: Vec3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
}

impl Plane {
    pub fn new(origin: Point3d, normal: Vec3) -> Self {
        let normal = normal.normalize();
        let u_axis = normal.any_perpendicular();
        let v_axis = normal.cross(&u_axis);
        Self {
            origin,
            normal,
            u_axis,
            v_axis,
        }
    }

    /// Plane spanned by two in-plane directions; `v_axis` is re-orthogonalised.
    pub fn from_axes(origin: Point3d, u_axis: Vec3, v_hint: Vec3) -> Self {
        let u_axis = u_axis.normalize();
        let normal = u_axis.cross(&v_hint).normalize();
        Self {
            origin,
            normal,
            u_axis,
            v_axis: normal.cross(&u_axis),
        }
    }

    pub fn xy() -> Self {
        Self {
            origin: Point3d::ORIGIN,
            normal: Vec3::Z,
            u_axis: Vec3::X,
            v_axis: Vec3::Y,
        }
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        self.origin + self.u_axis * u + self.v_axis * v
    }

    /// Signed offset of `p` along the normal.
    pub fn signed_distance(&self, p: &Point3d) -> f64 {
        (*p - self.origin).dot(&self.normal)
    }

    /// Orthogonal foot of `p` on the plane.
    pub fn project_point(&self, p: &Point3d) -> Point3d {
        *p - self.normal * self.signed_distance(p)
    }

    /// Move `p` along `direction` until it meets the plane.
    pub fn project_along(&self, p: &Point3d, direction: &Vec3) -> Option<Point3d> {
        let denom = direction.dot(&self.normal);
        if denom.abs() < 1e-15 {
            return None;
        }
        Some(*p - *direction * (self.signed_distance(p) / denom))
    }

    /// Local in-plane coordinates of `p` (after orthogonal projection).
    pub fn to_local(&self, p: &Point3d) -> Point2d {
        let d = *p - self.origin;
        Point2d::new(d.dot(&self.u_axis), d.dot(&self.v_axis))
    }

    pub fn from_local(&self, uv: &Point2d) -> Point3d {
        self.evaluate(uv.x, uv.y)
    }
}

/// An infinite circular cylinder. Parameterised by `u` = angle around the
/// axis from `ref_dir`, `v` = height along the axis from `origin`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cylinder {
    pub origin: Point3d,
    pub axis: Vec3,
    pub radius: f64,
    pub ref_dir: Vec3,
}

impl Cylinder {
    pub fn new(origin: Point3d, axis: Vec3, radius: f64) -> Self {
        let axis = axis.normalize();
        Self {
            origin,
            axis,
            radius,
            ref_dir: axis.any_perpendicular(),
        }
    }

    fn y_dir(&self) -> Vec3 {
        self.axis.cross(&self.ref_dir)
    }

    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        self.origin + self.radial(u) * self.radius + self.axis * v
    }

    pub fn normal_at(&self, u: f64, _v: f64) -> Vec3 {
        self.radial(u)
    }

    fn radial(&self, u: f64) -> Vec3 {
        self.ref_dir * u.cos() + self.y_dir() * u.sin()
    }

    pub fn axis_line(&self) -> Line3d {
        Line3d::new(self.origin, self.axis)
    }

    /// `(angle in [0, 2PI), height)` of the point, measured from the axis.
    pub fn parameters_of(&self, p: &Point3d) -> Point2d {
        let d = *p - self.origin;
        let mut angle = d.dot(&self.y_dir()).atan2(d.dot(&self.ref_dir));
        if angle < 0.0 {
            angle += TAU;
        }
        Point2d::new(angle, d.dot(&self.axis))
    }
}

/// A cone surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cone {
    pub apex: Point3d,
    pub axis: Vec3,
    pub half_angle: f64,
    pub ref_dir: Vec3,
}

impl Cone {
    pub fn new(apex: Point3d, axis: Vec3, half_angle: f64) -> Self {
        let axis = axis.normalize();
        Self {
            apex,
            axis,
            half_angle,
            ref_dir: axis.any_perpendicular(),
        }
    }

    /// Evaluate at (u=angle, v=distance from apex along axis).
    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        let y_dir = self.axis.cross(&self.ref_dir);
        let r = v * self.half_angle.tan();
        self.apex + self.axis * v + self.ref_dir * (r * u.cos()) + y_dir * (r * u.sin())
    }

    pub fn normal_at(&self, u: f64, _v: f64) -> Vec3 {
        let y_dir = self.axis.cross(&self.ref_dir);
        let radial = self.ref_dir * u.cos() + y_dir * u.sin();
        radial * self.half_angle.cos() - self.axis * self.half_angle.sin()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Point3d,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3d, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Evaluate at (u=longitude, v=latitude).
    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        self.center + self.normal_at(u, v) * self.radius
    }

    pub fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        Vec3::new(v.cos() * u.cos(), v.cos() * u.sin(), v.sin())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Torus {
    pub center: Point3d,
    pub axis: Vec3,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Torus {
    pub fn new(center: Point3d, axis: Vec3, major_radius: f64, minor_radius: f64) -> Self {
        Self {
            center,
            axis: axis.normalize(),
            major_radius,
            minor_radius,
        }
    }

    fn ring_dir(&self, u: f64) -> Vec3 {
        let x = self.axis.any_perpendicular();
        let y = self.axis.cross(&x);
        x * u.cos() + y * u.sin()
    }

    /// Evaluate at (u=major angle, v=minor angle).
    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        let ring = self.ring_dir(u);
        self.center + ring * self.major_radius + self.normal_at(u, v) * self.minor_radius
    }

    pub fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        self.ring_dir(u) * v.cos() + self.axis * v.sin()
    }
}

impl Surface {
    pub fn evaluate(&self, u: f64, v: f64) -> Point3d {
        match self {
            Surface::Plane(p) => p.evaluate(u, v),
            Surface::Cylinder(c) => c.evaluate(u, v),
            Surface::Cone(c) => c.evaluate(u, v),
            Surface::Sphere(s) => s.evaluate(u, v),
            Surface::Torus(t) => t.evaluate(u, v),
        }
    }

    pub fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        match self {
            Surface::Plane(p) => p.normal,
            Surface::Cylinder(c) => c.normal_at(u, v),
            Surface::Cone(c) => c.normal_at(u, v),
            Surface::Sphere(s) => s.normal_at(u, v),
            Surface::Torus(t) => t.normal_at(u, v),
        }
    }

    /// Inverse evaluation for the surfaces that have a closed form.
    pub fn parameters_of(&self, p: &Point3d) -> Option<Point2d> {
        match self {
            Surface::Plane(plane) => Some(plane.to_local(p)),
            Surface::Cylinder(cyl) => Some(cyl.parameters_of(p)),
            Surface::Sphere(s) => {
                let d = (*p - s.center).normalized()?;
                Some(Point2d::new(d.y.atan2(d.x), d.z.clamp(-1.0, 1.0).asin()))
            }
            Surface::Cone(_) | Surface::Torus(_) => None,
        }
    }

    pub fn surface_type_name(&self) -> &'static str {
        match self {
            Surface::Plane(_) => "Plane",
            Surface::Cylinder(_) => "Cylinder",
            Surface::Cone(_) => "Cone",
            Surface::Sphere(_) => "Sphere",
            Surface::Torus(_) => "Torus",
        }
    }
}
