//! Raycast targeting for the active room, plus the ability cooldown gate.

use std::collections::BTreeMap;

use gallery_scene::{NodeId, Ray, Scene, SceneHit};
use glam::Vec3;

/// Raycast-eligible objects for the current room. Rebuilt wholesale on every
/// transition so the per-frame cast stays proportional to the active room's
/// mesh count, never the whole gallery's.
#[derive(Debug, Default)]
pub struct TargetingSet {
    candidates: Vec<NodeId>,
}

impl TargetingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, scene: &Scene, room_root: NodeId) {
        self.candidates.clear();
        if let Ok(meshes) = scene.visible_mesh_descendants(room_root) {
            self.candidates = meshes;
        }
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    pub fn candidates(&self) -> &[NodeId] {
        &self.candidates
    }

    /// Nearest candidate hit along `direction` from `origin`. Both aiming
    /// conventions route through here: camera-center rays for "what is the
    /// player looking at" and tool-tip rays for beam aiming.
    pub fn resolve_forward_hit(
        &self,
        scene: &Scene,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<SceneHit> {
        let ray = Ray::new(origin, direction);
        scene.raycast(&ray, &self.candidates, max_distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Ability {
    Bomb,
    Mark,
    Beer,
}

impl Ability {
    pub fn cooldown(&self) -> f64 {
        match self {
            Ability::Bomb => 0.8,
            Ability::Mark => 0.4,
            Ability::Beer => 1.2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Ability::Bomb => "bomb",
            Ability::Mark => "mark",
            Ability::Beer => "beer",
        }
    }
}

/// Per-ability activation stamps. Check and stamp happen in one call; the
/// whole system is single-threaded so this is the entire gate.
#[derive(Debug, Default)]
pub struct CooldownTable {
    last_activation: BTreeMap<Ability, f64>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records the activation when the cooldown has
    /// elapsed; returns false with no side effects otherwise.
    pub fn can_activate(&mut self, ability: Ability, now: f64) -> bool {
        if let Some(last) = self.last_activation.get(&ability) {
            if now - last < ability.cooldown() {
                return false;
            }
        }
        self.last_activation.insert(ability, now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_scene::Interactable;

    #[test]
    fn cooldown_blocks_early_reactivation() {
        let mut table = CooldownTable::new();
        assert!(table.can_activate(Ability::Bomb, 10.0));
        assert!(!table.can_activate(Ability::Bomb, 10.7));
    }

    #[test]
    fn cooldown_allows_after_elapse() {
        let mut table = CooldownTable::new();
        assert!(table.can_activate(Ability::Bomb, 10.0));
        assert!(table.can_activate(Ability::Bomb, 10.9));
    }

    #[test]
    fn denied_attempt_does_not_restamp() {
        let mut table = CooldownTable::new();
        assert!(table.can_activate(Ability::Mark, 0.0));
        assert!(!table.can_activate(Ability::Mark, 0.3));
        // Had the denied attempt stamped, this would still be blocked.
        assert!(table.can_activate(Ability::Mark, 0.45));
    }

    #[test]
    fn abilities_cool_down_independently() {
        let mut table = CooldownTable::new();
        assert!(table.can_activate(Ability::Bomb, 0.0));
        assert!(table.can_activate(Ability::Beer, 0.1));
        assert!(!table.can_activate(Ability::Bomb, 0.2));
    }

    #[test]
    fn rebuild_collects_only_current_room_meshes() {
        let mut scene = Scene::new();
        let room_a = scene.add_group("room_a", None).unwrap();
        let wall_a = scene
            .add_mesh("wall_a", Some(room_a), Vec3::new(9.0, 3.5, 0.1))
            .unwrap();
        let room_b = scene.add_group("room_b", None).unwrap();
        let wall_b = scene
            .add_mesh("wall_b", Some(room_b), Vec3::new(9.0, 3.5, 0.1))
            .unwrap();
        scene.set_tag(wall_b, Interactable::Decor).unwrap();

        let mut targets = TargetingSet::new();
        targets.rebuild(&scene, room_a);
        assert_eq!(targets.candidates(), &[wall_a]);
        assert!(!targets.candidates().contains(&wall_b));
    }

    #[test]
    fn forward_hit_finds_wall_ahead() {
        let mut scene = Scene::new();
        let room = scene.add_group("room", None).unwrap();
        let wall = scene
            .add_mesh("wall", Some(room), Vec3::new(9.0, 3.5, 0.1))
            .unwrap();
        scene.set_position(wall, Vec3::new(0.0, 3.5, -9.0)).unwrap();

        let mut targets = TargetingSet::new();
        targets.rebuild(&scene, room);

        let hit = targets
            .resolve_forward_hit(&scene, Vec3::new(0.0, 1.6, 0.0), Vec3::NEG_Z, 100.0)
            .expect("wall should be hit");
        assert_eq!(hit.node, wall);

        assert!(targets
            .resolve_forward_hit(&scene, Vec3::new(0.0, 1.6, 0.0), Vec3::Z, 100.0)
            .is_none());
    }
}
