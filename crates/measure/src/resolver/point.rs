use cad_kernel::CurveEval;
use cad_kernel::geometry::curves::{Line3d, TrimmedCurve};
use cad_kernel::geometry::intersection::line_plane;
use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::surfaces::Plane;
use tracing::trace;

use super::Hints;
use crate::entity::Category;
use crate::error::RelationFailure;
use crate::relation::{Freedom, Relation};

/// Point to point, optionally measured along the hinted direction.
pub(super) fn point_point(p1: Point3d, p2: Point3d, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();

    let Some(n) = hints.direction else {
        if tol.points_coincident(&p1, &p2) {
            return Err(RelationFailure::Degenerate {
                reason: "coincident points",
            });
        }
        return Ok(Relation::new(p1, p2, Freedom::Fixed));
    };

    // Work in the plane through p1 perpendicular to n.
    let height = (p2 - p1).dot(&n);
    let p2_in_plane = p2 - n * height;
    let spread = p2_in_plane - p1;

    let foot = match hints.point {
        Some(q) if !tol.is_zero_length(spread.length()) => Line3d::from_points(p1, p2_in_plane).closest_point(&q).0,
        _ => p1.midpoint(&p2_in_plane),
    };
    trace!(height, spread = spread.length(), "point-point along direction");

    Ok(Relation::new(foot, foot + n * height, Freedom::linear(spread, tol.coincidence)).with_aux(p1, p2))
}

/// Point to curve. Lines perpendicular to the hinted direction are measured
/// along it; otherwise planar curves measure to their plane and lines to
/// their perpendicular foot.
///
/// Along a direction, `start` is on the point's side and `end` is the foot on
/// the line, so the point keeps the `start` end like every other case.
pub(super) fn point_curve(p: Point3d, curve: &TrimmedCurve, hints: &Hints<'_>) -> Result<Relation, RelationFailure> {
    let tol = hints.tol();

    if let (Some(n), Some(line)) = (hints.direction, curve.as_line()) {
        if tol.vectors_perpendicular(&line.direction, &n) {
            let (foot, _) = line.closest_point(&hints.anchor_or(p));
            let start = line_plane(&Line3d::new(foot, n), &Plane::new(p, n))
                .map(|hit| hit.point)
                .ok_or(RelationFailure::Degenerate {
                    reason: "direction is degenerate",
                })?;
            return Ok(
                Relation::new(start, foot, Freedom::linear(line.direction, tol.coincidence)).with_aux(p, foot)
            );
        }
    }

    if let Some(plane) = curve.plane(tol.coincidence) {
        let foot = plane.project_point(&p);
        if tol.points_coincident(&p, &foot) {
            return Err(RelationFailure::Degenerate {
                reason: "point lies in the curve plane",
            });
        }
        return Ok(Relation::new(p, foot, Freedom::Fixed));
    }

    if let Some(line) = curve.as_line() {
        let (foot, _) = line.closest_point(&p);
        if tol.points_coincident(&p, &foot) {
            return Err(RelationFailure::Degenerate {
                reason: "point lies on the line",
            });
        }
        return Ok(Relation::new(p, foot, Freedom::Fixed));
    }

    Err(RelationFailure::Unsupported {
        first: Category::Point,
        second: Category::Curve,
        reason: "curve is neither planar nor a line",
    })
}
