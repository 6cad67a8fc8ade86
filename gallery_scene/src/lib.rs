//! Minimal scene-graph collaborator for the gallery walkthrough.
//!
//! This crate owns no pixels. It maintains a node hierarchy with world
//! transforms, answers axis-aligned bounding-box and ray queries, and carries
//! the interaction tags the engine dispatches on. Everything a real renderer
//! would need is derivable from this state.

mod aabb;
mod ray;
mod scene;

pub use aabb::Aabb;
pub use ray::Ray;
pub use scene::{Interactable, Node, NodeId, NodeKind, Scene, SceneError, SceneHit};
