use cad_kernel::geometry::curves::{Line3d, TrimmedCurve};
use cad_kernel::geometry::intersection::line_line_closest;
use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::surfaces::Plane;
use cad_kernel::geometry::vector::Vec3;
use cad_kernel::{CurveEval, Tolerance};
use tracing::trace;

use super::Hints;
use crate::entity::Category;
use crate::error::RelationFailure;
use crate::nearest::nearest_points;
use crate::relation::{Freedom, Relation};

pub(super) fn curve_curve(a: &TrimmedCurve, b: &TrimmedCurve, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    if let Some(n) = hints.direction {
        return along_direction(a, b, n, hints);
    }
    match (a.as_line(), b.as_line()) {
        (Some(l1), Some(l2)) => line_line(a, l1, b, l2, hints),
        _ => general(a, b, hints),
    }
}

/// Extremes of both curves along `n`, moved onto the line through the anchor
/// parallel to `n`.
fn along_direction(a: &TrimmedCurve, b: &TrimmedCurve, n: Vec3, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();
    let ea = extremum_along(a, &b.mid_point(), &n, hints.config.critical_samples);
    let eb = extremum_along(b, &a.mid_point(), &n, hints.config.critical_samples);

    let anchor = hints.anchor_or(ea.midpoint(&eb));
    let start = anchor + n * (ea - anchor).dot(&n);
    let end = anchor + n * (eb - anchor).dot(&n);

    let freedom = common_plane(a, b, tol)
        .map(|plane| plane.normal.cross(&n))
        .filter(|v| v.length() > tol.angular)
        .and_then(|v| v.normalized())
        .map_or(Freedom::Planar, |v| Freedom::Linear(v.sign_canonical()));

    trace!(?ea, ?eb, ?freedom, "curve extremes along direction");
    Ok(Relation::new(start, end, freedom).with_aux(ea, eb))
}

/// The critical point of `curve` along `n` whose height is nearest the
/// height of `reference`. Curves with no critical point use their ends.
fn extremum_along(curve: &TrimmedCurve, reference: &Point3d, n: &Vec3, samples: usize) -> Point3d {
    let mut params = curve.critical_params_along(n, samples);
    if params.is_empty() {
        let range = curve.domain();
        params = vec![range.start, range.end];
    }
    let target = reference.to_vec3().dot(n);
    params
        .into_iter()
        .map(|t| curve.point_at(t))
        .min_by(|p, q| {
            let dp = (p.to_vec3().dot(n) - target).abs();
            let dq = (q.to_vec3().dot(n) - target).abs();
            dp.total_cmp(&dq)
        })
        .unwrap_or_else(|| curve.mid_point())
}

fn line_line(
    a: &TrimmedCurve,
    l1: &Line3d,
    b: &TrimmedCurve,
    l2: &Line3d,
    hints: &Hints<'_>,
) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();

    if tol.vectors_parallel(&l1.direction, &l2.direction) {
        let p = a.start_point();
        let (foot, _) = l2.closest_point(&p);
        if tol.is_zero_length((foot - p).length()) {
            return Err(RelationFailure::Degenerate {
                reason: "coincident lines",
            });
        }
        let anchor = hints.anchor_or(a.mid_point().midpoint(&b.mid_point()));
        let (start, _) = l1.closest_point(&anchor);
        let (end, _) = l2.closest_point(&anchor);
        return Ok(Relation::new(start, end, Freedom::linear(l1.direction, tol.coincidence)));
    }

    let approach = line_line_closest(l1, l2).ok_or(RelationFailure::Degenerate {
        reason: "lines are nearly parallel",
    })?;
    if tol.is_zero_length(approach.distance) {
        return Err(RelationFailure::Degenerate {
            reason: "lines intersect",
        });
    }
    Ok(Relation::new(approach.point_a, approach.point_b, Freedom::Fixed))
}

fn general(a: &TrimmedCurve, b: &TrimmedCurve, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();
    if common_plane(a, b, tol).is_none() {
        return Err(RelationFailure::Unsupported {
            first: Category::Curve,
            second: Category::Curve,
            reason: "curves share no plane",
        });
    }

    let pair = nearest_points(a, b, hints.config)?;
    trace!(distance = pair.distance, iterations = pair.iterations, "nearest points");
    if tol.is_zero_length(pair.distance) {
        return Err(RelationFailure::Degenerate {
            reason: "curves touch",
        });
    }
    Ok(Relation::new(pair.point_a, pair.point_b, Freedom::Fixed))
}

/// A plane containing both curves, if there is one.
pub(super) fn common_plane(a: &TrimmedCurve, b: &TrimmedCurve, tol: &Tolerance) -> Option<Plane> {
    if let Some(plane) = a.plane(tol.coincidence) {
        return plane_contains(&plane, b, tol).then_some(plane);
    }
    if let Some(plane) = b.plane(tol.coincidence) {
        return plane_contains(&plane, a, tol).then_some(plane);
    }

    let (l1, l2) = (a.as_line()?, b.as_line()?);
    let normal = if tol.vectors_parallel(&l1.direction, &l2.direction) {
        l1.direction.cross(&(l2.origin - l1.origin))
    } else {
        l1.direction.cross(&l2.direction)
    };
    let normal = normal.normalized()?;
    let plane = Plane::from_axes(l1.origin, l1.direction, normal.cross(&l1.direction));
    (plane.signed_distance(&l2.origin).abs() <= tol.coincidence).then_some(plane)
}

fn plane_contains(plane: &Plane, curve: &TrimmedCurve, tol: &Tolerance) -> bool {
    match curve.as_line() {
        Some(line) => {
            tol.vectors_perpendicular(&line.direction, &plane.normal)
                && plane.signed_distance(&line.origin).abs() <= tol.coincidence
        }
        None => curve.plane(tol.coincidence).is_some_and(|other| {
            tol.vectors_parallel(&other.normal, &plane.normal)
                && plane.signed_distance(&other.origin).abs() <= tol.coincidence
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_kernel::geometry::curves::{Circle3d, Curve};
    use cad_kernel::geometry::domain::ParamRange;
    use std::f64::consts::TAU;

    fn circle(center: Point3d, normal: Vec3, r: f64) -> TrimmedCurve {
        TrimmedCurve::new(Curve::Circle(Circle3d::new(center, normal, r)), ParamRange::new(0.0, TAU))
    }

    #[test]
    fn test_common_plane_of_circle_and_line() {
        let tol = Tolerance::default();
        let c = circle(Point3d::ORIGIN, Vec3::Z, 1.0);
        let inside = TrimmedCurve::segment(Point3d::new(3.0, 0.0, 0.0), Point3d::new(3.0, 4.0, 0.0));
        let lifted = TrimmedCurve::segment(Point3d::new(3.0, 0.0, 1.0), Point3d::new(3.0, 4.0, 1.0));
        assert!(common_plane(&c, &inside, &tol).is_some());
        assert!(common_plane(&inside, &c, &tol).is_some());
        assert!(common_plane(&c, &lifted, &tol).is_none());
    }

    #[test]
    fn test_common_plane_of_lines() {
        let tol = Tolerance::default();
        let x = TrimmedCurve::segment(Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0));
        let parallel = TrimmedCurve::segment(Point3d::new(0.0, 2.0, 0.0), Point3d::new(1.0, 2.0, 0.0));
        let skew = TrimmedCurve::segment(Point3d::new(0.0, 0.0, 5.0), Point3d::new(0.0, 1.0, 5.0));
        let plane = common_plane(&x, &parallel, &tol).unwrap();
        assert!(plane.normal.cross(&Vec3::Z).length() < 1e-12);
        assert!(common_plane(&x, &skew, &tol).is_none());
    }

    #[test]
    fn test_extremum_prefers_facing_side() {
        let c = circle(Point3d::ORIGIN, Vec3::Z, 1.0);
        let right = extremum_along(&c, &Point3d::new(5.0, 0.0, 0.0), &Vec3::X, 32);
        let left = extremum_along(&c, &Point3d::new(-5.0, 0.0, 0.0), &Vec3::X, 32);
        assert!(right.distance_to(&Point3d::new(1.0, 0.0, 0.0)) < 1e-12);
        assert!(left.distance_to(&Point3d::new(-1.0, 0.0, 0.0)) < 1e-12);
    }

    #[test]
    fn test_segment_without_extremum_uses_ends() {
        let seg = TrimmedCurve::segment(Point3d::ORIGIN, Point3d::new(2.0, 0.0, 0.0));
        let e = extremum_along(&seg, &Point3d::new(10.0, 0.0, 0.0), &Vec3::X, 32);
        assert!(e.distance_to(&Point3d::new(2.0, 0.0, 0.0)) < 1e-12);
    }
}
