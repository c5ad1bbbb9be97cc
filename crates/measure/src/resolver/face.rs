use std::cmp::Ordering;
use std::f64::consts::TAU;

use cad_kernel::geometry::curves::Line3d;
use cad_kernel::geometry::intersection::line_cylinder;
use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::surfaces::{Cylinder, Plane};
use cad_kernel::geometry::vector::Vec3;
use cad_kernel::{SurfaceEval, Tolerance};
use tracing::trace;

use super::Hints;
use crate::entity::{Category, FaceGeometry, FaceKind};
use crate::error::RelationFailure;
use crate::projector::parallel_distance;
use crate::relation::{Freedom, Relation};

/// Planar face to point. With a direction along the face normal the segment
/// is anchored at the preferred point; with no direction it is the point's
/// foot. Any other direction has no measurement.
pub(super) fn face_point(face: &FaceGeometry, p: Point3d, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();
    let Some(plane) = face.surface.as_plane() else {
        return Err(RelationFailure::Unsupported {
            first: Category::Face,
            second: Category::Point,
            reason: "only planar faces measure to a point",
        });
    };

    let foot = plane.project_point(&p);

    if let Some(n) = hints.direction {
        if !tol.vectors_parallel(&plane.normal, &n) {
            return Err(RelationFailure::Unsupported {
                first: Category::Face,
                second: Category::Point,
                reason: "direction is not along the face normal",
            });
        }
        let start = plane.project_point(&hints.anchor_or(p));
        let end = Plane::new(p, plane.normal)
            .project_along(&start, &plane.normal)
            .ok_or(RelationFailure::Degenerate {
                reason: "face normal is degenerate",
            })?;
        let freedom = Freedom::linear(foot - start, tol.coincidence);
        return Ok(Relation::new(start, end, freedom).with_aux(foot, p));
    }

    if tol.points_coincident(&foot, &p) {
        return Err(RelationFailure::Degenerate {
            reason: "point lies on the face plane",
        });
    }
    Ok(Relation::new(foot, p, Freedom::Fixed))
}

pub(super) fn face_face(f1: &FaceGeometry, f2: &FaceGeometry, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    if let (Some(a), Some(b)) = (f1.surface.as_plane(), f2.surface.as_plane()) {
        return plane_plane(a, b, hints);
    }
    if let (Some(a), Some(b)) = (f1.surface.as_cylinder(), f2.surface.as_cylinder()) {
        return cylinder_cylinder(f1, a, f2, b, hints);
    }
    if matches!(
        (f1.kind(), f2.kind()),
        (FaceKind::Plane, FaceKind::Cylinder) | (FaceKind::Cylinder, FaceKind::Plane)
    ) {
        return plane_cylinder(f1, f2, hints);
    }
    Err(RelationFailure::Unsupported {
        first: Category::Face,
        second: Category::Face,
        reason: "no measurement between these surface types",
    })
}

fn plane_plane(a: &Plane, b: &Plane, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();
    if !tol.vectors_parallel(&a.normal, &b.normal) {
        return Err(RelationFailure::Unsupported {
            first: Category::Face,
            second: Category::Face,
            reason: "planes are not parallel",
        });
    }
    let anchor = hints.anchor_or(a.origin.midpoint(&b.origin));
    let start = a.project_point(&anchor);
    let end = b.project_point(&anchor);
    if tol.points_coincident(&start, &end) {
        return Err(RelationFailure::Degenerate {
            reason: "coincident planes",
        });
    }
    Ok(Relation::new(start, end, Freedom::Fixed))
}

fn plane_cylinder(f1: &FaceGeometry, f2: &FaceGeometry, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();
    let (uv_a, uv_b) = parallel_distance(&f1.surface, &f1.domain, &f2.surface, &f2.domain, hints.point, tol).ok_or(
        RelationFailure::Unsupported {
            first: Category::Face,
            second: Category::Face,
            reason: "no common perpendicular between plane and cylinder",
        },
    )?;
    let start = f1.surface.point_at(uv_a);
    let end = f2.surface.point_at(uv_b);
    if tol.points_coincident(&start, &end) {
        return Err(RelationFailure::Degenerate {
            reason: "cylinder touches the plane",
        });
    }
    Ok(Relation::new(start, end, Freedom::Fixed))
}

/// Coaxial cylinders measure across the axis: the radial line through the
/// anchor cuts one cylinder in two diametrically opposite points.
///
/// The cut cylinder is the primary face under [`face_order`], so both
/// argument orders give the same segment. Its anchor-side point is `start`
/// when the primary face is the first argument and `end` otherwise.
fn cylinder_cylinder(
    f1: &FaceGeometry,
    c1: &Cylinder,
    f2: &FaceGeometry,
    c2: &Cylinder,
    hints: &Hints<'_>,
) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();
    let coaxial = tol.vectors_parallel(&c1.axis, &c2.axis)
        && c1.axis_line().distance_to_point(&c2.origin) <= tol.coincidence;
    if !coaxial {
        return Err(RelationFailure::Unsupported {
            first: Category::Face,
            second: Category::Face,
            reason: "cylinders are not coaxial",
        });
    }

    // Faces that order equal are interchangeable.
    let first_is_primary = face_order(f1, c1, f2, c2, tol).is_le();
    let (pf, pc) = if first_is_primary { (f1, c1) } else { (f2, c2) };

    let anchor = hints.anchor_or(pf.center_point());
    let (foot, _) = pc.axis_line().closest_point(&anchor);
    let radial = (anchor - foot).normalized().filter(|_| !tol.points_coincident(&anchor, &foot)).ok_or(
        RelationFailure::Degenerate {
            reason: "anchor lies on the cylinder axis",
        },
    )?;

    let covers = |dir: Vec3| {
        let u = pc.parameters_of(&(foot + dir * pc.radius)).x;
        pf.domain.u.wrap_periodic(u, TAU, tol.coincidence).is_some()
    };
    let side = if !covers(radial) && covers(-radial) { -radial } else { radial };

    // Hits come back ordered along `side`: far side first.
    let hits = line_cylinder(&Line3d::new(foot, side), pc);
    let [far, near] = hits.as_slice() else {
        return Err(RelationFailure::Degenerate {
            reason: "radial line misses the cylinder",
        });
    };
    trace!(first_is_primary, near = ?near.point, far = ?far.point, "coaxial cylinders");

    Ok(if first_is_primary {
        Relation::new(near.point, far.point, Freedom::Fixed)
    } else {
        Relation::new(far.point, near.point, Freedom::Fixed)
    })
}

/// Total order on cylinder faces: radius, centre point of the trimming
/// rectangle, then the rectangle itself. Values within tolerance compare
/// equal.
fn face_order(f1: &FaceGeometry, c1: &Cylinder, f2: &FaceGeometry, c2: &Cylinder, tol: &Tolerance) -> Ordering {
    let key = |f: &FaceGeometry, c: &Cylinder| {
        let m = f.center_point();
        let d = &f.domain;
        [c.radius, m.x, m.y, m.z, d.u.start, d.u.end, d.v.start, d.v.end]
    };
    key(f1, c1)
        .iter()
        .zip(key(f2, c2).iter())
        .map(|(x, y)| {
            if (x - y).abs() <= tol.coincidence {
                Ordering::Equal
            } else {
                x.total_cmp(y)
            }
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolveConfig;
    use cad_kernel::geometry::domain::UvDomain;
    use cad_kernel::geometry::surfaces::Surface;

    fn tube(radius: f64, v0: f64, v1: f64) -> FaceGeometry {
        FaceGeometry::new(
            Surface::Cylinder(Cylinder::new(Point3d::ORIGIN, Vec3::Z, radius)),
            UvDomain::new(0.0, TAU, v0, v1),
        )
    }

    #[test]
    fn test_face_order_is_antisymmetric() {
        let tol = Tolerance::default();
        let (a, b) = (tube(1.0, 0.0, 2.0), tube(1.0, 4.0, 6.0));
        let (ca, cb) = (a.surface.as_cylinder().unwrap(), b.surface.as_cylinder().unwrap());
        assert_eq!(face_order(&a, ca, &b, cb, &tol), Ordering::Less);
        assert_eq!(face_order(&b, cb, &a, ca, &tol), Ordering::Greater);
        assert_eq!(face_order(&a, ca, &a, ca, &tol), Ordering::Equal);
    }

    #[test]
    fn test_same_tube_twice_spans_the_axis() {
        let cfg = ResolveConfig::default();
        let hints = Hints::new(None, Some(Point3d::new(5.0, 0.0, 1.0)), &cfg);
        let a = tube(2.0, 0.0, 2.0);
        let r = face_face(&a, &a, &hints).unwrap();
        assert!(r.start.unwrap().distance_to(&Point3d::new(2.0, 0.0, 1.0)) < 1e-9);
        assert!(r.end.unwrap().distance_to(&Point3d::new(-2.0, 0.0, 1.0)) < 1e-9);
    }

    #[test]
    fn test_smaller_tube_is_cut_in_either_order() {
        let cfg = ResolveConfig::default();
        let hints = Hints::new(None, Some(Point3d::new(0.0, 5.0, 1.0)), &cfg);
        let (inner, outer) = (tube(1.0, 0.0, 2.0), tube(3.0, 0.0, 2.0));
        let forward = face_face(&inner, &outer, &hints).unwrap();
        let back = face_face(&outer, &inner, &hints).unwrap();
        assert!(forward.start.unwrap().distance_to(&Point3d::new(0.0, 1.0, 1.0)) < 1e-9);
        assert!(forward.end.unwrap().distance_to(&Point3d::new(0.0, -1.0, 1.0)) < 1e-9);
        assert_eq!(back.start, forward.end);
        assert_eq!(back.end, forward.start);
    }

    #[test]
    fn test_face_point_off_normal_direction_is_unsupported() {
        let cfg = ResolveConfig::default();
        let hints = Hints::new(Some(Vec3::X), None, &cfg);
        let floor = FaceGeometry::new(Surface::Plane(Plane::xy()), UvDomain::new(-5.0, 5.0, -5.0, 5.0));
        let err = face_point(&floor, Point3d::new(3.0, 0.0, 4.0), &hints).unwrap_err();
        assert!(matches!(err, RelationFailure::Unsupported { .. }));
    }

    #[test]
    fn test_half_tube_flips_side() {
        let cfg = ResolveConfig::default();
        // Anchor on +x, but the smaller tube only spans the -x half.
        let hints = Hints::new(None, Some(Point3d::new(3.0, 0.0, 1.0)), &cfg);
        let cyl = Cylinder::new(Point3d::ORIGIN, Vec3::Z, 1.0);
        let u_minus_x = cyl.parameters_of(&Point3d::new(-1.0, 0.0, 0.0)).x;
        let half = FaceGeometry::new(
            Surface::Cylinder(cyl),
            UvDomain::new(u_minus_x - 1.0, u_minus_x + 1.0, 0.0, 2.0),
        );

        let r = face_face(&half, &tube(2.0, 0.0, 2.0), &hints).unwrap();
        assert!(r.start.unwrap().distance_to(&Point3d::new(-1.0, 0.0, 1.0)) < 1e-9);
        assert!(r.end.unwrap().distance_to(&Point3d::new(1.0, 0.0, 1.0)) < 1e-9);
    }
}
