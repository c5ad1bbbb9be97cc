//! Parameter pairs on two surfaces joined by a common perpendicular.

use std::f64::consts::TAU;

use cad_kernel::SurfaceEval;
use cad_kernel::Tolerance;
use cad_kernel::geometry::curves::Line3d;
use cad_kernel::geometry::domain::UvDomain;
use cad_kernel::geometry::intersection::line_cylinder;
use cad_kernel::geometry::point::{Point2d, Point3d};
use cad_kernel::geometry::surfaces::{Cylinder, Plane};
use tracing::trace;

/// Find `(uv_a, uv_b)` whose surface points are joined by a segment normal
/// to both surfaces, preferring the solution nearest `preferred`.
///
/// Handles parallel planes and a plane against a cylinder whose axis is
/// parallel to it, in either order. Everything else yields `None`.
pub fn parallel_distance<A, B>(
    surf_a: &A,
    dom_a: &UvDomain,
    surf_b: &B,
    dom_b: &UvDomain,
    preferred: Option<Point3d>,
    tol: &Tolerance,
) -> Option<(Point2d, Point2d)>
where
    A: SurfaceEval + ?Sized,
    B: SurfaceEval + ?Sized,
{
    if let (Some(pa), Some(pb)) = (surf_a.as_plane(), surf_b.as_plane()) {
        return plane_plane(pa, dom_a, pb, tol);
    }
    if let (Some(plane), Some(cyl)) = (surf_a.as_plane(), surf_b.as_cylinder()) {
        return plane_cylinder(plane, dom_a, cyl, dom_b, preferred, tol);
    }
    if let (Some(cyl), Some(plane)) = (surf_a.as_cylinder(), surf_b.as_plane()) {
        return plane_cylinder(plane, dom_b, cyl, dom_a, preferred, tol).map(|(uv_p, uv_c)| (uv_c, uv_p));
    }
    None
}

fn plane_plane(a: &Plane, dom_a: &UvDomain, b: &Plane, tol: &Tolerance) -> Option<(Point2d, Point2d)> {
    if !tol.vectors_parallel(&a.normal, &b.normal) {
        return None;
    }
    let uv_a = dom_a.center();
    let uv_b = b.to_local(&a.from_local(&uv_a));
    Some((uv_a, uv_b))
}

fn plane_cylinder(
    plane: &Plane,
    dom_plane: &UvDomain,
    cyl: &Cylinder,
    dom_cyl: &UvDomain,
    preferred: Option<Point3d>,
    tol: &Tolerance,
) -> Option<(Point2d, Point2d)> {
    if !tol.vectors_perpendicular(&cyl.axis, &plane.normal) {
        return None;
    }

    // Axis segment over the face's height, seen in plane coordinates.
    let axis = cyl.axis_line();
    let a0 = plane.to_local(&axis.evaluate(dom_cyl.v.start));
    let a1 = plane.to_local(&axis.evaluate(dom_cyl.v.end));
    let (c0, c1) = dom_plane.clip_segment(a0, a1)?;

    let uv_plane = c0.midpoint(&c1);
    let foot = plane.from_local(&uv_plane);
    let target = preferred.unwrap_or(foot);

    let best = line_cylinder(&Line3d::new(foot, plane.normal), cyl)
        .into_iter()
        .filter_map(|hit| {
            let uv = cyl.parameters_of(&hit.point);
            let u = dom_cyl.u.wrap_periodic(uv.x, TAU, tol.coincidence)?;
            dom_cyl
                .v
                .contains(uv.y, tol.coincidence)
                .then_some((hit.point, Point2d::new(u, uv.y)))
        })
        .min_by(|(p, _), (q, _)| p.distance_to(&target).total_cmp(&q.distance_to(&target)));

    trace!(found = best.is_some(), "plane-cylinder projection");
    best.map(|(_, uv_cyl)| (uv_plane, uv_cyl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_kernel::geometry::surfaces::{Sphere, Surface};
    use cad_kernel::geometry::vector::Vec3;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn floor() -> (Surface, UvDomain) {
        (Surface::Plane(Plane::xy()), UvDomain::new(-5.0, 5.0, -5.0, 5.0))
    }

    fn rod(u0: f64, u1: f64) -> (Surface, UvDomain) {
        (
            Surface::Cylinder(Cylinder::new(Point3d::new(-2.0, 0.0, 3.0), Vec3::X, 1.0)),
            UvDomain::new(u0, u1, 0.0, 4.0),
        )
    }

    #[test]
    fn test_parallel_planes() {
        let (pa, da) = floor();
        let pb = Surface::Plane(Plane::new(Point3d::new(0.0, 0.0, 7.0), -Vec3::Z));
        let (uv_a, uv_b) = parallel_distance(&pa, &da, &pb, &da, None, &Tolerance::default()).unwrap();
        let a = pa.point_at(uv_a);
        let b = pb.point_at(uv_b);
        assert!(a.distance_to(&Point3d::ORIGIN) < 1e-12);
        assert!(b.distance_to(&Point3d::new(0.0, 0.0, 7.0)) < 1e-12);
    }

    #[test]
    fn test_tilted_planes_have_no_solution() {
        let (pa, da) = floor();
        let pb = Surface::Plane(Plane::new(Point3d::ORIGIN, Vec3::new(0.0, 1.0, 1.0)));
        assert!(parallel_distance(&pa, &da, &pb, &da, None, &Tolerance::default()).is_none());
    }

    #[test]
    fn test_plane_cylinder_nearest_side() {
        let (pa, da) = floor();
        let (cb, db) = rod(0.0, 2.0 * PI);
        let tol = Tolerance::default();

        let (uv_a, uv_b) = parallel_distance(&pa, &da, &cb, &db, None, &tol).unwrap();
        assert!(pa.point_at(uv_a).distance_to(&Point3d::ORIGIN) < 1e-9);
        assert!(cb.point_at(uv_b).distance_to(&Point3d::new(0.0, 0.0, 2.0)) < 1e-9);

        let far = Some(Point3d::new(0.0, 0.0, 10.0));
        let (_, uv_b) = parallel_distance(&pa, &da, &cb, &db, far, &tol).unwrap();
        assert!(cb.point_at(uv_b).distance_to(&Point3d::new(0.0, 0.0, 4.0)) < 1e-9);
    }

    #[test]
    fn test_cylinder_domain_filters_hits() {
        let (pa, da) = floor();
        // Only the half of the rod facing away from the floor.
        let (cb, db) = rod(FRAC_PI_2, 1.5 * PI);
        let (_, uv_b) = parallel_distance(&pa, &da, &cb, &db, None, &Tolerance::default()).unwrap();
        assert!(cb.point_at(uv_b).distance_to(&Point3d::new(0.0, 0.0, 4.0)) < 1e-9);
        assert!(db.contains(&uv_b, 1e-12));
    }

    #[test]
    fn test_cylinder_first_swaps_result() {
        let (pa, da) = floor();
        let (cb, db) = rod(0.0, 2.0 * PI);
        let tol = Tolerance::default();
        let (p_uv, c_uv) = parallel_distance(&pa, &da, &cb, &db, None, &tol).unwrap();
        let (c_uv2, p_uv2) = parallel_distance(&cb, &db, &pa, &da, None, &tol).unwrap();
        assert_eq!(p_uv, p_uv2);
        assert_eq!(c_uv, c_uv2);
    }

    #[test]
    fn test_axis_outside_plane_domain() {
        let pa = Surface::Plane(Plane::xy());
        let da = UvDomain::new(10.0, 20.0, 10.0, 20.0);
        let (cb, db) = rod(0.0, 2.0 * PI);
        assert!(parallel_distance(&pa, &da, &cb, &db, None, &Tolerance::default()).is_none());
    }

    #[test]
    fn test_unsupported_pairs() {
        let (pa, da) = floor();
        let tol = Tolerance::default();
        let upright = Surface::Cylinder(Cylinder::new(Point3d::ORIGIN, Vec3::Z, 1.0));
        assert!(parallel_distance(&pa, &da, &upright, &da, None, &tol).is_none());

        let ball = Surface::Sphere(Sphere::new(Point3d::ORIGIN, 1.0));
        assert!(parallel_distance(&pa, &da, &ball, &da, None, &tol).is_none());
        let (cb, db) = rod(0.0, 2.0 * PI);
        assert!(parallel_distance(&cb, &db, &cb, &db, None, &tol).is_none());
    }
}
