//! Pairwise measurement between B-Rep entities.
//!
//! Given two picked entities (a vertex, an edge or a face) and optional
//! direction/position hints, the resolver produces the connecting segment
//! whose length is "the distance" plus a description of the freedom left once
//! that distance is fixed. Feature-editing tools read the segment length as an
//! editable scalar and use the freedom to decide whether a second reference is
//! needed before an edit is well-posed.

pub mod config;
pub mod entity;
pub mod error;
pub mod face_edge;
pub mod nearest;
pub mod projector;
pub mod relation;
pub mod resolver;

pub use config::ResolveConfig;
pub use entity::{Category, Entity, FaceGeometry, FaceKind};
pub use error::RelationFailure;
pub use face_edge::{distance_from_face_to_edge, try_distance_from_face_to_edge};
pub use projector::parallel_distance;
pub use relation::{Freedom, Relation};
pub use resolver::{RelationResolver, resolve};
