//! Distance from a cylindrical face to a straight edge.

use cad_kernel::SurfaceEval;
use cad_kernel::Tolerance;
use cad_kernel::geometry::curves::{Line3d, TrimmedCurve};
use cad_kernel::geometry::intersection::{line_cylinder, line_line_closest};
use cad_kernel::geometry::point::Point3d;
use tracing::{debug, instrument};

use crate::entity::{Category, FaceGeometry};
use crate::error::RelationFailure;
use crate::relation::{Freedom, Relation};

/// Measure from a cylindrical face to a line edge that passes outside it.
///
/// The common perpendicular of the cylinder axis and the edge line is cut by
/// the cylinder; of the two surface points the one nearer `face_touch` is the
/// start, the edge point is the end. An edge parallel to the axis is measured
/// through the foot of `edge_touch` and keeps linear freedom along the axis.
#[instrument(skip(face, edge, tol))]
pub fn try_distance_from_face_to_edge(
    face: &FaceGeometry,
    face_touch: Point3d,
    edge: &TrimmedCurve,
    edge_touch: Point3d,
    tol: &Tolerance,
) -> Result<Relation, RelationFailure> {
    let (Some(cyl), Some(line)) = (face.surface.as_cylinder(), edge.as_line()) else {
        return Err(RelationFailure::Unsupported {
            first: Category::Face,
            second: Category::Curve,
            reason: "only a cylinder face against a line edge",
        });
    };

    let axis = cyl.axis_line();
    let (axis_point, edge_point, freedom) = match line_line_closest(&axis, line) {
        Some(approach) if !tol.vectors_parallel(&axis.direction, &line.direction) => {
            (approach.point_a, approach.point_b, Freedom::Fixed)
        }
        _ => {
            let (edge_point, _) = line.closest_point(&edge_touch);
            let (axis_point, _) = axis.closest_point(&edge_point);
            (axis_point, edge_point, Freedom::linear(axis.direction, tol.coincidence))
        }
    };

    if axis_point.distance_to(&edge_point) <= cyl.radius + tol.coincidence {
        return Err(RelationFailure::Degenerate {
            reason: "edge meets the cylinder",
        });
    }

    let start = line_cylinder(&Line3d::from_points(axis_point, edge_point), cyl)
        .into_iter()
        .map(|hit| hit.point)
        .min_by(|p, q| p.distance_to(&face_touch).total_cmp(&q.distance_to(&face_touch)))
        .ok_or(RelationFailure::Degenerate {
            reason: "radial line misses the cylinder",
        })?;

    Ok(Relation::new(start, edge_point, freedom).with_aux(face_touch, edge_touch))
}

/// As [`try_distance_from_face_to_edge`], with failures flattened to
/// `Relation::none()`.
pub fn distance_from_face_to_edge(
    face: &FaceGeometry,
    face_touch: Point3d,
    edge: &TrimmedCurve,
    edge_touch: Point3d,
    tol: &Tolerance,
) -> Relation {
    try_distance_from_face_to_edge(face, face_touch, edge, edge_touch, tol).unwrap_or_else(|failure| {
        debug!(%failure, "no face-edge distance");
        Relation::none()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_kernel::geometry::domain::UvDomain;
    use cad_kernel::geometry::surfaces::{Cylinder, Plane, Surface};
    use cad_kernel::geometry::vector::Vec3;
    use std::f64::consts::TAU;

    fn post() -> FaceGeometry {
        FaceGeometry::new(
            Surface::Cylinder(Cylinder::new(Point3d::ORIGIN, Vec3::Z, 1.0)),
            UvDomain::new(0.0, TAU, 0.0, 10.0),
        )
    }

    #[test]
    fn test_skew_edge_outside() {
        let edge = TrimmedCurve::segment(Point3d::new(-5.0, 4.0, 3.0), Point3d::new(5.0, 4.0, 3.0));
        let r = try_distance_from_face_to_edge(
            &post(),
            Point3d::new(0.0, 1.0, 2.0),
            &edge,
            Point3d::new(1.0, 4.0, 3.0),
            &Tolerance::default(),
        )
        .unwrap();
        assert!(r.start.unwrap().distance_to(&Point3d::new(0.0, 1.0, 3.0)) < 1e-9);
        assert!(r.end.unwrap().distance_to(&Point3d::new(0.0, 4.0, 3.0)) < 1e-9);
        assert!((r.length().unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(r.freedom, Freedom::Fixed);
    }

    #[test]
    fn test_far_touch_picks_far_side() {
        let edge = TrimmedCurve::segment(Point3d::new(-5.0, 4.0, 3.0), Point3d::new(5.0, 4.0, 3.0));
        let r = try_distance_from_face_to_edge(
            &post(),
            Point3d::new(0.0, -1.0, 2.0),
            &edge,
            Point3d::ORIGIN,
            &Tolerance::default(),
        )
        .unwrap();
        assert!((r.length().unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_edge() {
        let edge = TrimmedCurve::segment(Point3d::new(3.0, 0.0, 0.0), Point3d::new(3.0, 0.0, 10.0));
        let r = try_distance_from_face_to_edge(
            &post(),
            Point3d::new(1.0, 0.0, 5.0),
            &edge,
            Point3d::new(3.0, 0.0, 7.0),
            &Tolerance::default(),
        )
        .unwrap();
        assert!(r.start.unwrap().distance_to(&Point3d::new(1.0, 0.0, 7.0)) < 1e-9);
        assert!(r.end.unwrap().distance_to(&Point3d::new(3.0, 0.0, 7.0)) < 1e-9);
        assert_eq!(r.freedom, Freedom::Linear(Vec3::Z));
    }

    #[test]
    fn test_edge_through_cylinder_fails() {
        let edge = TrimmedCurve::segment(Point3d::new(-5.0, 0.5, 3.0), Point3d::new(5.0, 0.5, 3.0));
        let err = try_distance_from_face_to_edge(&post(), Point3d::ORIGIN, &edge, Point3d::ORIGIN, &Tolerance::default())
            .unwrap_err();
        assert!(matches!(err, RelationFailure::Degenerate { .. }));
    }

    #[test]
    fn test_other_combinations_fail() {
        let plane = FaceGeometry::new(Surface::Plane(Plane::xy()), UvDomain::new(0.0, 1.0, 0.0, 1.0));
        let edge = TrimmedCurve::segment(Point3d::new(0.0, 0.0, 2.0), Point3d::new(1.0, 0.0, 2.0));
        let r = distance_from_face_to_edge(&plane, Point3d::ORIGIN, &edge, Point3d::ORIGIN, &Tolerance::default());
        assert_eq!(r, Relation::none());
    }
}
