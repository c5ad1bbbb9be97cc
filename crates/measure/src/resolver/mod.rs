//! Pairwise relation dispatch.
//!
//! Both entities are put into canonical category order (`Face < Point <
//! Curve`), the pair is dispatched to one of the case handlers, and a swapped
//! pair has its result swapped back so `start` always belongs to the caller's
//! first argument.

mod curve;
mod face;
mod point;

use cad_kernel::Tolerance;
use cad_kernel::geometry::curves::TrimmedCurve;
use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::vector::Vec3;
use tracing::{debug, instrument};

use crate::config::ResolveConfig;
use crate::entity::{Category, Entity, FaceGeometry};
use crate::error::RelationFailure;
use crate::face_edge;
use crate::relation::Relation;

/// Caller hints after validation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Hints<'a> {
    /// Unit measurement direction, if a usable one was given.
    pub direction: Option<Vec3>,
    pub point: Option<Point3d>,
    pub config: &'a ResolveConfig,
}

impl<'a> Hints<'a> {
    fn new(direction: Option<Vec3>, point: Option<Point3d>, config: &'a ResolveConfig) -> Self {
        Self {
            direction: direction.filter(Vec3::is_finite).and_then(|d| d.normalized()),
            point: point.filter(Point3d::is_finite),
            config,
        }
    }

    pub fn tol(&self) -> &Tolerance {
        &self.config.tolerance
    }

    /// The preferred point, or `fallback` when none was given.
    pub fn anchor_or(&self, fallback: Point3d) -> Point3d {
        self.point.unwrap_or(fallback)
    }
}

/// Resolves the measurement between two entities.
#[derive(Debug, Clone, Default)]
pub struct RelationResolver {
    config: ResolveConfig,
}

impl RelationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ResolveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Measure from `a` to `b`, reporting why no measurement exists.
    ///
    /// A zero-length or non-finite `direction` counts as no direction; a
    /// non-finite `point` counts as no preferred point.
    #[instrument(skip(self, a, b), fields(first = ?a.category(), second = ?b.category()))]
    pub fn try_resolve(
        &self,
        a: &Entity,
        b: &Entity,
        direction: Option<Vec3>,
        point: Option<Point3d>,
    ) -> Result<Relation, RelationFailure> {
        let hints = Hints::new(direction, point, &self.config);
        let swapped = a.category() > b.category();
        let (first, second) = if swapped { (b, a) } else { (a, b) };

        let relation = match (first, second) {
            (Entity::Point(p), Entity::Point(q)) => point::point_point(*p, *q, &hints),
            (Entity::Point(p), Entity::Curve(c)) => point::point_curve(*p, c, &hints),
            (Entity::Curve(c1), Entity::Curve(c2)) => curve::curve_curve(c1, c2, &hints),
            (Entity::Face(f), Entity::Point(p)) => face::face_point(f, *p, &hints),
            (Entity::Face(f1), Entity::Face(f2)) => face::face_face(f1, f2, &hints),
            (Entity::Face(_), Entity::Curve(_)) => Err(RelationFailure::Unsupported {
                first: Category::Face,
                second: Category::Curve,
                reason: "face-curve measurement is not defined",
            }),
            (x, y) => Err(RelationFailure::Unsupported {
                first: x.category(),
                second: y.category(),
                reason: "no measurement defined for this pair",
            }),
        }?;

        if !relation.is_finite() {
            return Err(RelationFailure::Degenerate {
                reason: "non-finite result",
            });
        }
        debug!(swapped, length = relation.length(), freedom = ?relation.freedom, "relation resolved");
        Ok(if swapped { relation.swapped() } else { relation })
    }

    /// Measure from `a` to `b`; `Relation::none()` when there is no answer.
    pub fn resolve(&self, a: &Entity, b: &Entity, direction: Option<Vec3>, point: Option<Point3d>) -> Relation {
        self.try_resolve(a, b, direction, point).unwrap_or_else(|failure| {
            debug!(%failure, "no relation");
            Relation::none()
        })
    }

    /// Resolve each pair independently with the same hints.
    pub fn resolve_many(
        &self,
        pairs: &[(Entity, Entity)],
        direction: Option<Vec3>,
        point: Option<Point3d>,
    ) -> Vec<Relation> {
        pairs
            .iter()
            .map(|(a, b)| self.resolve(a, b, direction, point))
            .collect()
    }

    /// Distance from a cylindrical face to a straight edge, using this
    /// resolver's tolerances.
    pub fn face_to_edge(
        &self,
        face: &FaceGeometry,
        face_touch: Point3d,
        edge: &TrimmedCurve,
        edge_touch: Point3d,
    ) -> Relation {
        face_edge::distance_from_face_to_edge(face, face_touch, edge, edge_touch, &self.config.tolerance)
    }
}

/// Measure from `a` to `b` with the default configuration.
pub fn resolve(a: &Entity, b: &Entity, direction: Option<Vec3>, point: Option<Point3d>) -> Relation {
    RelationResolver::new().resolve(a, b, direction, point)
}
