use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::geometry::curves::TrimmedCurve;
use crate::geometry::domain::UvDomain;
use crate::geometry::point::{Point2d, Point3d};
use crate::geometry::surfaces::Surface;
use crate::geometry::vector::Vec3;

// ─── Entity Keys ─────────────────────────────────────────────────────────────

new_key_type! {
    pub struct VertexId;
    pub struct EdgeId;
    pub struct FaceId;
}

/// A picked topological entity, as handed over by selection code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TopoRef {
    Vertex(VertexId),
    Edge(EdgeId),
    Face(FaceId),
}

// ─── Topological Entities ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub point: Point3d,
    pub tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// The 3D curve trimmed to the edge's extent.
    pub curve: TrimmedCurve,
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    pub surface: Surface,
    /// Trimming rectangle in the surface's parameter space.
    pub domain: UvDomain,
    /// true if the face normal agrees with the surface normal.
    pub same_sense: bool,
}

// ─── Entity Store ────────────────────────────────────────────────────────────

/// Arena-based storage for vertices, edges and faces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub vertices: SlotMap<VertexId, Vertex>,
    pub edges: SlotMap<EdgeId, Edge>,
    pub faces: SlotMap<FaceId, Face>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, point: Point3d) -> VertexId {
        self.vertices.insert(Vertex {
            point,
            tolerance: crate::default_tolerance().coincidence,
        })
    }

    /// Insert an edge along `curve`, creating vertices at its trimmed ends.
    pub fn add_edge(&mut self, curve: TrimmedCurve) -> EdgeId {
        let start_vertex = self.add_vertex(curve.start_point());
        let end_vertex = self.add_vertex(curve.end_point());
        debug!(
            curve = curve.curve.curve_type_name(),
            t_start = curve.range.start,
            t_end = curve.range.end,
            "edge added"
        );
        self.edges.insert(Edge {
            curve,
            start_vertex,
            end_vertex,
        })
    }

    /// Insert a straight edge between two existing vertices.
    pub fn add_line_edge(&mut self, start: VertexId, end: VertexId) -> Option<EdgeId> {
        let a = self.vertices.get(start)?.point;
        let b = self.vertices.get(end)?.point;
        if a.distance_to(&b) < crate::default_tolerance().coincidence {
            return None;
        }
        Some(self.edges.insert(Edge {
            curve: TrimmedCurve::segment(a, b),
            start_vertex: start,
            end_vertex: end,
        }))
    }

    pub fn add_face(&mut self, surface: Surface, domain: UvDomain) -> FaceId {
        debug!(surface = surface.surface_type_name(), "face added");
        self.faces.insert(Face {
            surface,
            domain,
            same_sense: true,
        })
    }

    /// Whether the reference still points at a live entity.
    pub fn contains(&self, r: TopoRef) -> bool {
        match r {
            TopoRef::Vertex(id) => self.vertices.contains_key(id),
            TopoRef::Edge(id) => self.edges.contains_key(id),
            TopoRef::Face(id) => self.faces.contains_key(id),
        }
    }

    /// Outward normal of a face at a parameter point, honouring `same_sense`.
    pub fn face_normal(&self, face_id: FaceId, uv: Point2d) -> Option<Vec3> {
        let face = self.faces.get(face_id)?;
        let n = face.surface.normal_at(uv.x, uv.y);
        Some(if face.same_sense { n } else { -n })
    }
}
