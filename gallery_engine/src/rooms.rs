//! Room lifecycle: build-once scene groups, visibility-toggled transitions,
//! and the coordinated teardown/setup each transition performs.

pub mod content;

use gallery_scene::{Interactable, NodeId, Scene, SceneError};
use glam::Vec3;
use log::{debug, error};

use crate::assets::AssetCache;
use crate::audio::AudioChannels;
use crate::collision::CollisionRegistry;
use crate::config::RoomConfig;
use crate::player::Player;
use crate::subtitles::SubtitleSynchronizer;
use crate::targeting::TargetingSet;

/// Horizontal rectangle a room occupies, used to keep thrown objects and
/// pursuers inside the room that owns them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl RoomBounds {
    pub fn centered(center: Vec3, half_width: f32, half_depth: f32) -> Self {
        Self {
            min_x: center.x - half_width,
            max_x: center.x + half_width,
            min_z: center.z - half_depth,
            max_z: center.z + half_depth,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.z >= self.min_z
            && point.z <= self.max_z
    }
}

/// One room's contribution to the gallery: static descriptor, geometry
/// construction, and an optional per-frame animation hook.
pub trait RoomSpec {
    fn config(&self) -> &'static RoomConfig;
    fn spawn(&self) -> Vec3;
    fn bounds(&self) -> RoomBounds;
    fn build(&mut self, scene: &mut Scene) -> Result<NodeId, SceneError>;
    fn update(
        &mut self,
        _scene: &mut Scene,
        _root: NodeId,
        _time: f64,
        _dt: f32,
    ) -> Result<(), SceneError> {
        Ok(())
    }

    /// Auxiliary overlay panel, if the room has one. Hidden on every
    /// transition into the room.
    fn overlay_node(&self) -> Option<NodeId> {
        None
    }
}

struct RoomEntry {
    spec: Box<dyn RoomSpec>,
    root: NodeId,
}

/// Everything a transition touches, borrowed for the duration of the call.
pub struct TransitionCtx<'a> {
    pub scene: &'a mut Scene,
    pub player: &'a mut Player,
    pub collisions: &'a mut CollisionRegistry,
    pub audio: &'a mut AudioChannels,
    pub subtitles: &'a mut SubtitleSynchronizer,
    pub targeting: &'a mut TargetingSet,
    pub assets: &'a AssetCache,
    pub events: &'a mut Vec<String>,
    pub now: f64,
}

/// All rooms are built up-front and coexist in the scene; a transition only
/// flips visibility. The `transitioning` flag is the sole re-entrancy guard
/// and everything runs on one thread.
pub struct RoomRegistry {
    entries: Vec<RoomEntry>,
    current: Option<usize>,
    transitioning: bool,
    view_overlay_active: bool,
}

impl RoomRegistry {
    pub fn build(scene: &mut Scene, specs: Vec<Box<dyn RoomSpec>>) -> Result<Self, SceneError> {
        let mut entries = Vec::with_capacity(specs.len());
        for mut spec in specs {
            let root = spec.build(scene)?;
            scene.set_visible(root, false)?;
            entries.push(RoomEntry { spec, root });
        }
        Ok(Self {
            entries,
            current: None,
            transitioning: false,
            view_overlay_active: false,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_root(&self) -> Option<NodeId> {
        self.current.map(|index| self.entries[index].root)
    }

    pub fn current_config(&self) -> Option<&'static RoomConfig> {
        self.current.map(|index| self.entries[index].spec.config())
    }

    pub fn current_bounds(&self) -> Option<RoomBounds> {
        self.current.map(|index| self.entries[index].spec.bounds())
    }

    pub fn current_spawn(&self) -> Option<Vec3> {
        self.current.map(|index| self.entries[index].spec.spawn())
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Room 3's auxiliary view panel. Always hidden again on transition.
    pub fn view_overlay_active(&self) -> bool {
        self.view_overlay_active
    }

    pub fn set_view_overlay(&mut self, active: bool) {
        self.view_overlay_active = active;
    }

    /// Linear forward navigation target, clamped at the last room.
    pub fn next_index(&self) -> Option<usize> {
        let current = self.current?;
        (current + 1 < self.entries.len()).then_some(current + 1)
    }

    pub fn previous_index(&self) -> Option<usize> {
        let current = self.current?;
        current.checked_sub(1)
    }

    /// The whole transition. Out-of-range indices, re-entrant calls, and
    /// the already-current room are all silent no-ops; the return value says
    /// whether a transition actually ran.
    pub fn enter_room(&mut self, index: usize, ctx: &mut TransitionCtx<'_>) -> bool {
        if self.transitioning {
            debug!("transition already in flight; ignoring request for room {index}");
            return false;
        }
        let Some(entry) = self.entries.get(index) else {
            debug!("room index {index} out of range");
            return false;
        };
        if self.current == Some(index) {
            return false;
        }
        self.transitioning = true;

        let config = entry.spec.config();
        let spawn = entry.spec.spawn();
        let root = entry.root;

        ctx.player.reset(spawn, 0.0);
        ctx.collisions.clear();
        self.view_overlay_active = false;

        for (i, other) in self.entries.iter().enumerate() {
            if let Err(err) = ctx.scene.set_visible(other.root, i == index) {
                error!("room visibility toggle failed: {err}");
            }
        }
        if let Some(overlay) = entry.spec.overlay_node() {
            if let Err(err) = ctx.scene.set_visible(overlay, false) {
                error!("overlay reset failed: {err}");
            }
        }

        ctx.audio.play(config.audio_key, ctx.assets, ctx.now);
        ctx.subtitles.set_active_room(
            config.id,
            ctx.assets.audio_duration(config.audio_key).map(f64::from),
        );
        ctx.targeting.rebuild(ctx.scene, root);
        ctx.collisions.add_volumes_for_hierarchy(ctx.scene, root);
        ctx.events.push(format!("room.enter {}", config.id));

        self.current = Some(index);
        self.transitioning = false;
        true
    }

    pub fn current_overlay_node(&self) -> Option<NodeId> {
        self.current
            .and_then(|index| self.entries[index].spec.overlay_node())
    }

    /// Forgets the current room so the next `enter_room` runs the full
    /// transition even into the room we are already in. Used by restarts.
    pub fn reset_current(&mut self) {
        self.current = None;
    }

    /// Per-frame hook of the active room.
    pub fn update_current(
        &mut self,
        scene: &mut Scene,
        time: f64,
        dt: f32,
    ) -> Result<(), SceneError> {
        let Some(index) = self.current else {
            return Ok(());
        };
        let root = self.entries[index].root;
        self.entries[index].spec.update(scene, root, time, dt)
    }
}

/// Doors in the subtree, paired with the room index each one leads to.
pub fn door_nodes(scene: &Scene, root: NodeId) -> Vec<(NodeId, usize)> {
    let Ok(meshes) = scene.mesh_descendants(root) else {
        return Vec::new();
    };
    meshes
        .into_iter()
        .filter_map(|id| match scene.node(id).ok()?.tag {
            Some(Interactable::Door { target_room }) => Some((id, target_room)),
            _ => None,
        })
        .collect()
}

/// Closest door to `position`, with its target room and distance.
pub fn nearest_door(scene: &Scene, root: NodeId, position: Vec3) -> Option<(NodeId, usize, f32)> {
    door_nodes(scene, root)
        .into_iter()
        .filter_map(|(id, target)| {
            let door_pos = scene.world_position(id).ok()?;
            let flat = Vec3::new(door_pos.x - position.x, 0.0, door_pos.z - position.z);
            Some((id, target, flat.length()))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
}
