use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};

/// What remains free once the measured distance is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Freedom {
    /// The segment is fully determined.
    Fixed,
    /// Both ends may translate together within the plane perpendicular to
    /// the segment.
    Planar,
    /// Both ends may slide together along the vector. The sign is
    /// canonical; the magnitude is meaningful where a case reports one.
    Linear(Vec3),
}

impl Freedom {
    /// Linear freedom along `v`, or `Fixed` when `v` is shorter than `tol`.
    pub fn linear(v: Vec3, tol: f64) -> Self {
        if !v.is_finite() || v.length() < tol {
            Freedom::Fixed
        } else {
            Freedom::Linear(v.sign_canonical())
        }
    }

    /// Tri-state vector view: `None` when fixed, the zero vector for planar
    /// freedom, the direction otherwise.
    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            Freedom::Fixed => None,
            Freedom::Planar => Some(Vec3::ZERO),
            Freedom::Linear(d) => Some(*d),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Freedom::Fixed)
    }
}

/// The measurement between two entities.
///
/// `start` lies on (or is derived from) the caller's first entity, `end` on
/// the second. Both ends are present or both are absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub start: Option<Point3d>,
    pub end: Option<Point3d>,
    pub freedom: Freedom,
    /// Points on the original entities that `start`/`end` were derived from
    /// before being moved onto an anchor plane or line.
    pub aux_start: Option<Point3d>,
    pub aux_end: Option<Point3d>,
}

impl Relation {
    /// The "no solution" result.
    pub fn none() -> Self {
        Self {
            start: None,
            end: None,
            freedom: Freedom::Fixed,
            aux_start: None,
            aux_end: None,
        }
    }

    pub fn new(start: Point3d, end: Point3d, freedom: Freedom) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            freedom,
            aux_start: Some(start),
            aux_end: Some(end),
        }
    }

    pub fn with_aux(mut self, aux_start: Point3d, aux_end: Point3d) -> Self {
        self.aux_start = Some(aux_start);
        self.aux_end = Some(aux_end);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn segment(&self) -> Option<(Point3d, Point3d)> {
        Some((self.start?, self.end?))
    }

    pub fn length(&self) -> Option<f64> {
        self.segment().map(|(a, b)| a.distance_to(&b))
    }

    /// Exchange the roles of the two entities.
    pub fn swapped(self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            freedom: self.freedom,
            aux_start: self.aux_end,
            aux_end: self.aux_start,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        [self.start, self.end, self.aux_start, self.aux_end]
            .iter()
            .flatten()
            .all(Point3d::is_finite)
            && self.freedom.as_vector().is_none_or(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_invalid() {
        let r = Relation::none();
        assert!(!r.is_valid());
        assert!(r.length().is_none());
        assert!(r.freedom.as_vector().is_none());
    }

    #[test]
    fn test_swapped_exchanges_aux() {
        let r = Relation::new(Point3d::ORIGIN, Point3d::new(1.0, 0.0, 0.0), Freedom::Planar)
            .with_aux(Point3d::new(0.0, 1.0, 0.0), Point3d::new(1.0, 1.0, 0.0));
        let s = r.swapped();
        assert_eq!(s.start, r.end);
        assert_eq!(s.aux_start, Some(Point3d::new(1.0, 1.0, 0.0)));
        assert_eq!(s.freedom, Freedom::Planar);
        assert_eq!(s.swapped(), r);
    }

    #[test]
    fn test_linear_freedom() {
        assert_eq!(Freedom::linear(Vec3::ZERO, 1e-9), Freedom::Fixed);
        assert_eq!(
            Freedom::linear(Vec3::new(-2.0, 0.0, 0.0), 1e-9),
            Freedom::Linear(Vec3::new(2.0, 0.0, 0.0))
        );
        assert_eq!(Freedom::Planar.as_vector(), Some(Vec3::ZERO));
    }
}
