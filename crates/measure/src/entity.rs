use cad_kernel::geometry::curves::TrimmedCurve;
use cad_kernel::geometry::domain::UvDomain;
use cad_kernel::geometry::point::Point3d;
use cad_kernel::geometry::surfaces::Surface;
use cad_kernel::topology::brep::{EntityStore, TopoRef};
use cad_kernel::SurfaceEval;
use serde::{Deserialize, Serialize};

/// Coarse classification used to put a pair into canonical order.
///
/// The derived order `Face < Point < Curve` is what the resolver sorts by, so
/// every case is implemented once with the lower category first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Face,
    Point,
    Curve,
}

/// Surface sub-cases the resolver has closed-form answers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceKind {
    Plane,
    Cylinder,
    Other,
}

/// A trimmed face: surface geometry plus its parameter rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FaceGeometry {
    pub surface: Surface,
    pub domain: UvDomain,
}

impl FaceGeometry {
    pub fn new(surface: Surface, domain: UvDomain) -> Self {
        Self { surface, domain }
    }

    pub fn kind(&self) -> FaceKind {
        if self.surface.as_plane().is_some() {
            FaceKind::Plane
        } else if self.surface.as_cylinder().is_some() {
            FaceKind::Cylinder
        } else {
            FaceKind::Other
        }
    }

    /// The surface point at the centre of the trimming rectangle.
    pub fn center_point(&self) -> Point3d {
        self.surface.point_at(self.domain.center())
    }
}

/// A measurable entity, classified once at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Entity {
    Point(Point3d),
    Curve(TrimmedCurve),
    Face(FaceGeometry),
}

impl Entity {
    pub fn category(&self) -> Category {
        match self {
            Entity::Point(_) => Category::Point,
            Entity::Curve(_) => Category::Curve,
            Entity::Face(_) => Category::Face,
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Entity::Curve(c) if c.as_line().is_some())
    }

    pub fn face_kind(&self) -> Option<FaceKind> {
        match self {
            Entity::Face(f) => Some(f.kind()),
            _ => None,
        }
    }

    /// Classify a picked vertex, edge or face. `None` for a stale reference.
    pub fn from_topology(store: &EntityStore, r: TopoRef) -> Option<Self> {
        match r {
            TopoRef::Vertex(id) => store.vertices.get(id).map(|v| Entity::Point(v.point)),
            TopoRef::Edge(id) => store.edges.get(id).map(|e| Entity::Curve(e.curve.clone())),
            TopoRef::Face(id) => store
                .faces
                .get(id)
                .map(|f| Entity::Face(FaceGeometry::new(f.surface, f.domain))),
        }
    }
}

impl From<Point3d> for Entity {
    fn from(p: Point3d) -> Self {
        Entity::Point(p)
    }
}

impl From<TrimmedCurve> for Entity {
    fn from(c: TrimmedCurve) -> Self {
        Entity::Curve(c)
    }
}

impl From<FaceGeometry> for Entity {
    fn from(f: FaceGeometry) -> Self {
        Entity::Face(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_kernel::geometry::curves::{Circle3d, Curve};
    use cad_kernel::geometry::domain::ParamRange;
    use cad_kernel::geometry::surfaces::{Cylinder, Plane, Sphere};
    use cad_kernel::geometry::vector::Vec3;

    #[test]
    fn test_category_order() {
        assert!(Category::Face < Category::Point);
        assert!(Category::Point < Category::Curve);
    }

    #[test]
    fn test_from_topology() {
        let mut store = EntityStore::new();
        let v = store.add_vertex(Point3d::new(1.0, 2.0, 3.0));
        let e = store.add_edge(TrimmedCurve::segment(Point3d::ORIGIN, Point3d::new(0.0, 0.0, 4.0)));
        let f = store.add_face(
            Surface::Cylinder(Cylinder::new(Point3d::ORIGIN, Vec3::Z, 2.0)),
            UvDomain::new(0.0, 1.0, 0.0, 1.0),
        );

        assert!(matches!(
            Entity::from_topology(&store, TopoRef::Vertex(v)),
            Some(Entity::Point(p)) if p == Point3d::new(1.0, 2.0, 3.0)
        ));
        assert!(Entity::from_topology(&store, TopoRef::Edge(e)).unwrap().is_line());
        let face = Entity::from_topology(&store, TopoRef::Face(f)).unwrap();
        assert_eq!(face.face_kind(), Some(FaceKind::Cylinder));

        store.vertices.remove(v);
        assert!(Entity::from_topology(&store, TopoRef::Vertex(v)).is_none());
    }

    #[test]
    fn test_curve_and_face_kinds() {
        let arc: Entity = TrimmedCurve::new(
            Curve::Circle(Circle3d::new(Point3d::ORIGIN, Vec3::Z, 1.0)),
            ParamRange::new(0.0, 1.0),
        )
        .into();
        assert_eq!(arc.category(), Category::Curve);
        assert!(!arc.is_line());

        let dom = UvDomain::new(0.0, 1.0, 0.0, 1.0);
        assert_eq!(FaceGeometry::new(Surface::Plane(Plane::xy()), dom).kind(), FaceKind::Plane);
        assert_eq!(
            FaceGeometry::new(Surface::Sphere(Sphere::new(Point3d::ORIGIN, 1.0)), dom).kind(),
            FaceKind::Other
        );
    }

    #[test]
    fn test_face_center_point() {
        let face = FaceGeometry::new(Surface::Plane(Plane::xy()), UvDomain::new(0.0, 4.0, -2.0, 0.0));
        assert!(face.center_point().distance_to(&Point3d::new(2.0, -1.0, 0.0)) < 1e-12);
    }
}
