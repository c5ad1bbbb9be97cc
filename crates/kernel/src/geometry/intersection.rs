use super::curves::Line3d;
use super::point::Point3d;
use super::surfaces::{Cylinder, Plane};

/// Closest approach between two infinite lines.
#[derive(Debug, Clone, Copy)]
pub struct ClosestApproach {
    pub point_a: Point3d,
    pub t_a: f64,
    pub point_b: Point3d,
    pub t_b: f64,
    pub distance: f64,
}

/// A point where a line crosses a surface.
#[derive(Debug, Clone, Copy)]
pub struct LineHit {
    pub point: Point3d,
    /// Parameter along the line.
    pub t: f64,
}

// ─── Line-Line ──────────────────────────────────────────────────────────────

/// Closest points between two lines in 3D. `None` if the lines are parallel.
pub fn line_line_closest(l1: &Line3d, l2: &Line3d) -> Option<ClosestApproach> {
    let w = l1.origin - l2.origin;
    let a = l1.direction.dot(&l1.direction);
    let b = l1.direction.dot(&l2.direction);
    let c = l2.direction.dot(&l2.direction);
    let d = l1.direction.dot(&w);
    let e = l2.direction.dot(&w);

    let denom = a * c - b * b;
    if denom.abs() < 1e-15 {
        return None;
    }

    let t_a = (b * e - c * d) / denom;
    let t_b = (a * e - b * d) / denom;
    let point_a = l1.evaluate(t_a);
    let point_b = l2.evaluate(t_b);

    Some(ClosestApproach {
        point_a,
        t_a,
        point_b,
        t_b,
        distance: point_a.distance_to(&point_b),
    })
}

// ─── Line-Plane ─────────────────────────────────────────────────────────────

/// Where an infinite line crosses a plane. `None` if parallel.
pub fn line_plane(line: &Line3d, plane: &Plane) -> Option<LineHit> {
    let denom = line.direction.dot(&plane.normal);
    if denom.abs() < 1e-15 {
        return None;
    }
    let t = (plane.origin - line.origin).dot(&plane.normal) / denom;
    Some(LineHit {
        point: line.evaluate(t),
        t,
    })
}

// ─── Line-Cylinder ──────────────────────────────────────────────────────────

/// Intersections of an infinite line with an infinite cylinder, ordered by
/// line parameter. A tangent line yields a single hit.
pub fn line_cylinder(line: &Line3d, cyl: &Cylinder) -> Vec<LineHit> {
    let oc = line.origin - cyl.origin;
    let d_perp = line.direction.reject_from(&cyl.axis);
    let oc_perp = oc.reject_from(&cyl.axis);

    let a = d_perp.dot(&d_perp);
    let b = 2.0 * d_perp.dot(&oc_perp);
    let c = oc_perp.dot(&oc_perp) - cyl.radius * cyl.radius;

    if a < 1e-15 {
        // Line parallel to the axis: either on the surface everywhere or nowhere.
        return vec![];
    }

    let disc = b * b - 4.0 * a * c;
    if disc < -1e-12 * b.abs().max(1.0) {
        return vec![];
    }
    let sqrt_disc = disc.max(0.0).sqrt();

    let mut ts = vec![(-b - sqrt_disc) / (2.0 * a)];
    if sqrt_disc > 0.0 {
        ts.push((-b + sqrt_disc) / (2.0 * a));
    }
    ts.into_iter()
        .map(|t| LineHit {
            point: line.evaluate(t),
            t,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vector::Vec3;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_skew_lines_closest() {
        let l1 = Line3d::new(Point3d::ORIGIN, Vec3::X);
        let l2 = Line3d::new(Point3d::new(0.0, 0.0, 5.0), Vec3::Y);
        let approach = line_line_closest(&l1, &l2).unwrap();
        assert!((approach.distance - 5.0).abs() < 1e-12);
        assert_abs_diff_eq!(approach.point_a, Point3d::ORIGIN, epsilon = 1e-12);
        assert_abs_diff_eq!(approach.point_b, Point3d::new(0.0, 0.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_lines_have_no_closest_pair() {
        let l1 = Line3d::new(Point3d::ORIGIN, Vec3::X);
        let l2 = Line3d::new(Point3d::new(0.0, 1.0, 0.0), -Vec3::X);
        assert!(line_line_closest(&l1, &l2).is_none());
    }

    #[test]
    fn test_line_plane() {
        let line = Line3d::new(Point3d::new(0.0, 0.0, 10.0), -Vec3::Z);
        let hit = line_plane(&line, &Plane::xy()).unwrap();
        assert!((hit.t - 10.0).abs() < 1e-12);
        assert_abs_diff_eq!(hit.point, Point3d::ORIGIN, epsilon = 1e-12);
        assert!(line_plane(&Line3d::new(Point3d::ORIGIN, Vec3::X), &Plane::xy()).is_none());
    }

    #[test]
    fn test_line_cylinder_two_hits() {
        let cyl = Cylinder::new(Point3d::ORIGIN, Vec3::Z, 3.0);
        let line = Line3d::new(Point3d::new(-10.0, 0.0, 4.0), Vec3::X);
        let hits = line_cylinder(&line, &cyl);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].point.x + 3.0).abs() < 1e-10);
        assert!((hits[1].point.x - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_line_cylinder_miss_and_parallel() {
        let cyl = Cylinder::new(Point3d::ORIGIN, Vec3::Z, 1.0);
        let miss = Line3d::new(Point3d::new(-10.0, 5.0, 0.0), Vec3::X);
        assert!(line_cylinder(&miss, &cyl).is_empty());
        let along = Line3d::new(Point3d::new(1.0, 0.0, 0.0), Vec3::Z);
        assert!(line_cylinder(&along, &cyl).is_empty());
    }
}
