//! Axis-aligned collision volumes for the active room.
//!
//! The registry is owned by the frame driver and scoped to a room purely by
//! being cleared on every transition; entries never need individual
//! teardown.

use gallery_scene::{Aabb, NodeId, Scene};
use glam::Vec3;
use log::debug;

/// Parts with a footprint under this (in world units, on x and z) are
/// decorative and not worth a volume.
const MIN_FOOTPRINT: f32 = 0.1;

/// Vertical reach of a point query, approximating player height.
const QUERY_HALF_HEIGHT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeHandle(usize);

#[derive(Debug, Clone)]
struct Volume {
    owner: NodeId,
    aabb: Aabb,
    auto_recompute: bool,
}

#[derive(Debug, Default)]
pub struct CollisionRegistry {
    volumes: Vec<Volume>,
}

impl CollisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one volume for `owner`. With an explicit size the box is
    /// fixed at `owner.position + offset ± size/2`; otherwise it derives
    /// from the owner's current world bounds and tracks them thereafter.
    pub fn add_volume(
        &mut self,
        scene: &Scene,
        owner: NodeId,
        offset: Vec3,
        explicit_size: Option<Vec3>,
    ) -> VolumeHandle {
        let volume = match explicit_size {
            Some(size) => {
                let center = scene.world_position(owner).unwrap_or(Vec3::ZERO) + offset;
                Volume {
                    owner,
                    aabb: Aabb::from_center_half_extents(center, size * 0.5),
                    auto_recompute: false,
                }
            }
            None => Volume {
                owner,
                aabb: scene
                    .subtree_aabb(owner)
                    .ok()
                    .flatten()
                    .unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO)),
                auto_recompute: true,
            },
        };
        self.volumes.push(volume);
        VolumeHandle(self.volumes.len() - 1)
    }

    /// One auto-recomputed volume per mesh descendant of `root` whose
    /// world footprint clears the minimum size. Bounds the volume count on
    /// detailed models.
    pub fn add_volumes_for_hierarchy(&mut self, scene: &Scene, root: NodeId) -> usize {
        let mut added = 0;
        let Ok(meshes) = scene.mesh_descendants(root) else {
            return 0;
        };
        for mesh in meshes {
            let Ok(aabb) = scene.world_aabb(mesh) else {
                continue;
            };
            let size = aabb.size();
            if size.x > MIN_FOOTPRINT && size.z > MIN_FOOTPRINT {
                self.volumes.push(Volume {
                    owner: mesh,
                    aabb,
                    auto_recompute: true,
                });
                added += 1;
            }
        }
        debug!("registered {added} collision volumes under {root:?}");
        added
    }

    /// True when a box of `±(radius, 1, radius)` around `point` overlaps any
    /// registered volume. Auto volumes refresh from the live scene first.
    pub fn query(&mut self, scene: &Scene, point: Vec3, radius: f32) -> bool {
        let probe = Aabb::new(
            Vec3::new(point.x - radius, point.y - QUERY_HALF_HEIGHT, point.z - radius),
            Vec3::new(point.x + radius, point.y + QUERY_HALF_HEIGHT, point.z + radius),
        );

        for volume in &mut self.volumes {
            if volume.auto_recompute && scene.contains(volume.owner) {
                if let Ok(fresh) = scene.world_aabb(volume.owner) {
                    volume.aabb = fresh;
                }
            }
            if probe.intersects(&volume.aabb) {
                return true;
            }
        }
        false
    }

    /// Drops everything. Called unconditionally on room transitions.
    pub fn clear(&mut self) {
        self.volumes.clear();
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}
