use glam::Vec3;
use serde::Serialize;
use thiserror::Error;

use crate::aabb::Aabb;
use crate::ray::Ray;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("node {0:?} does not exist")]
    InvalidNode(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh { half_extents: Vec3 },
}

/// Interaction role of a node, dispatched by pattern matching instead of the
/// dynamic property probing the original scene objects carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interactable {
    Door { target_room: usize },
    ViewButton,
    CodeBlock { slot: u8 },
    Decor,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub position: Vec3,
    pub yaw: f32,
    pub visible: bool,
    pub kind: NodeKind,
    pub tag: Option<Interactable>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// Node arena. Removed slots stay vacant so handles never get recycled into
/// a different object mid-session.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, name: &str, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        self.add_node(name, parent, NodeKind::Group)
    }

    pub fn add_mesh(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        half_extents: Vec3,
    ) -> Result<NodeId, SceneError> {
        self.add_node(name, parent, NodeKind::Mesh { half_extents })
    }

    fn add_node(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        if let Some(parent_id) = parent {
            self.check(parent_id)?;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            position: Vec3::ZERO,
            yaw: 0.0,
            visible: true,
            kind,
            tag: None,
        }));
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.slot_mut(parent_id) {
                parent_node.children.push(id);
            }
        }
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(SceneError::InvalidNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.0 as usize)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    fn check(&self, id: NodeId) -> Result<(), SceneError> {
        self.node(id).map(|_| ())
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize).and_then(|slot| slot.as_mut())
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        let node = self.slot_mut(id).ok_or(SceneError::InvalidNode(id))?;
        node.position = position;
        Ok(())
    }

    pub fn translate(&mut self, id: NodeId, delta: Vec3) -> Result<(), SceneError> {
        let node = self.slot_mut(id).ok_or(SceneError::InvalidNode(id))?;
        node.position += delta;
        Ok(())
    }

    pub fn set_yaw(&mut self, id: NodeId, yaw: f32) -> Result<(), SceneError> {
        let node = self.slot_mut(id).ok_or(SceneError::InvalidNode(id))?;
        node.yaw = yaw;
        Ok(())
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        let node = self.slot_mut(id).ok_or(SceneError::InvalidNode(id))?;
        node.visible = visible;
        Ok(())
    }

    pub fn set_tag(&mut self, id: NodeId, tag: Interactable) -> Result<(), SceneError> {
        let node = self.slot_mut(id).ok_or(SceneError::InvalidNode(id))?;
        node.tag = Some(tag);
        Ok(())
    }

    /// World-space position: local offsets composed down the parent chain,
    /// each rotated by the accumulated parent yaw. Translation plus yaw is
    /// all the walkthrough geometry uses.
    pub fn world_position(&self, id: NodeId) -> Result<Vec3, SceneError> {
        let node = self.node(id)?;
        match node.parent {
            None => Ok(node.position),
            Some(parent) => {
                let parent_world = self.world_position(parent)?;
                let parent_yaw = self.world_yaw(parent)?;
                Ok(parent_world + rotate_y(node.position, parent_yaw))
            }
        }
    }

    pub fn world_yaw(&self, id: NodeId) -> Result<f32, SceneError> {
        let node = self.node(id)?;
        match node.parent {
            None => Ok(node.yaw),
            Some(parent) => Ok(self.world_yaw(parent)? + node.yaw),
        }
    }

    /// World-space bounds of a mesh node. Yawed meshes get conservatively
    /// re-axis-aligned by mixing the x/z extents.
    pub fn world_aabb(&self, id: NodeId) -> Result<Aabb, SceneError> {
        let node = self.node(id)?;
        let center = self.world_position(id)?;
        let half = match node.kind {
            NodeKind::Mesh { half_extents } => half_extents,
            NodeKind::Group => Vec3::ZERO,
        };
        let yaw = self.world_yaw(id)?;
        let (sin, cos) = yaw.sin_cos();
        let aligned = Vec3::new(
            cos.abs() * half.x + sin.abs() * half.z,
            half.y,
            sin.abs() * half.x + cos.abs() * half.z,
        );
        Ok(Aabb::from_center_half_extents(center, aligned))
    }

    /// Union of the bounds of every mesh in the subtree, visibility ignored.
    pub fn subtree_aabb(&self, root: NodeId) -> Result<Option<Aabb>, SceneError> {
        let mut combined: Option<Aabb> = None;
        for id in self.mesh_descendants(root)? {
            let aabb = self.world_aabb(id)?;
            combined = Some(match combined {
                Some(existing) => existing.union(&aabb),
                None => aabb,
            });
        }
        Ok(combined)
    }

    /// True when the node and every ancestor are visible.
    pub fn is_effectively_visible(&self, id: NodeId) -> Result<bool, SceneError> {
        let node = self.node(id)?;
        if !node.visible {
            return Ok(false);
        }
        match node.parent {
            None => Ok(true),
            Some(parent) => self.is_effectively_visible(parent),
        }
    }

    /// All mesh nodes under `root` (inclusive), in depth-first order.
    pub fn mesh_descendants(&self, root: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut out = Vec::new();
        self.collect_meshes(root, false, &mut out)?;
        Ok(out)
    }

    /// Visible mesh nodes under `root` (inclusive). Invisible subtrees are
    /// pruned without descending.
    pub fn visible_mesh_descendants(&self, root: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut out = Vec::new();
        self.collect_meshes(root, true, &mut out)?;
        Ok(out)
    }

    fn collect_meshes(
        &self,
        id: NodeId,
        visible_only: bool,
        out: &mut Vec<NodeId>,
    ) -> Result<(), SceneError> {
        let node = self.node(id)?;
        if visible_only && !node.visible {
            return Ok(());
        }
        if matches!(node.kind, NodeKind::Mesh { .. }) {
            out.push(id);
        }
        for child in node.children.clone() {
            if self.contains(child) {
                self.collect_meshes(child, visible_only, out)?;
            }
        }
        Ok(())
    }

    /// Detaches `root` from its parent and vacates the whole subtree.
    /// Handles into the removed subtree become invalid.
    pub fn remove_subtree(&mut self, root: NodeId) -> Result<(), SceneError> {
        let parent = self.node(root)?.parent;
        if let Some(parent_id) = parent {
            if let Some(parent_node) = self.slot_mut(parent_id) {
                parent_node.children.retain(|child| *child != root);
            }
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(id.0 as usize) {
                if let Some(node) = slot.take() {
                    stack.extend(node.children);
                }
            }
        }
        Ok(())
    }

    /// Nearest visible candidate hit within `max_distance`.
    pub fn raycast(
        &self,
        ray: &Ray,
        candidates: &[NodeId],
        max_distance: f32,
    ) -> Option<SceneHit> {
        let mut best: Option<SceneHit> = None;
        for &id in candidates {
            if !self.contains(id) {
                continue;
            }
            if !self.is_effectively_visible(id).unwrap_or(false) {
                continue;
            }
            let Ok(aabb) = self.world_aabb(id) else {
                continue;
            };
            let Some(distance) = ray.intersect_aabb(&aabb) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if best.map(|hit| distance < hit.distance).unwrap_or(true) {
                best = Some(SceneHit {
                    node: id,
                    distance,
                    point: ray.point_at(distance),
                });
            }
        }
        best
    }
}

pub(crate) fn rotate_y(v: Vec3, yaw: f32) -> Vec3 {
    let (sin, cos) = yaw.sin_cos();
    Vec3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}
