//! Short-lived visual effects with age-bounded lifecycles.
//!
//! Every effect dies: removal at `max_age` is unconditional and releases the
//! effect's scene nodes exactly once, so repeated triggering cannot grow
//! memory without bound.

use gallery_scene::{NodeId, Scene};
use glam::Vec3;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    Explosion,
    Hallucination {
        spin: f32,
        float: f32,
        intensity: f32,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Effect {
    pub kind: EffectKind,
    pub node: NodeId,
    pub age: f32,
    pub max_age: f32,
    // Derived visuals, all pure functions of age / max_age.
    pub scale: f32,
    pub opacity: f32,
    pub light_intensity: f32,
}

#[derive(Debug, Default)]
pub struct EffectsPool {
    effects: Vec<Effect>,
}

impl EffectsPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_explosion(&mut self, scene: &mut Scene, position: Vec3) {
        let Ok(node) = scene.add_mesh("explosion", None, Vec3::splat(0.25)) else {
            return;
        };
        let _ = scene.set_position(node, position);
        self.effects.push(Effect {
            kind: EffectKind::Explosion,
            node,
            age: 0.0,
            max_age: 0.8,
            scale: 1.0,
            opacity: 1.0,
            light_intensity: 1.4,
        });
    }

    /// Translucent figure drifting near `around`, with randomised placement,
    /// spin, and lifetime.
    pub fn spawn_hallucination<R: Rng>(
        &mut self,
        scene: &mut Scene,
        around: Vec3,
        intensity: f32,
        rng: &mut R,
    ) {
        let position = Vec3::new(
            around.x + (rng.gen::<f32>() - 0.5) * 6.0,
            around.y + rng.gen::<f32>() * 2.0,
            around.z + (rng.gen::<f32>() - 0.5) * 6.0,
        );
        let Ok(node) = scene.add_mesh("hallucination", None, Vec3::new(0.45, 0.45, 0.01)) else {
            return;
        };
        let _ = scene.set_position(node, position);
        let _ = scene.set_yaw(node, rng.gen::<f32>() * std::f32::consts::TAU);
        self.effects.push(Effect {
            kind: EffectKind::Hallucination {
                spin: (rng.gen::<f32>() - 0.5) * 2.0,
                float: 0.2 + rng.gen::<f32>() * 0.2,
                intensity,
            },
            node,
            age: 0.0,
            max_age: 0.8 + rng.gen::<f32>() * 0.6,
            scale: 1.0,
            opacity: 0.6 * intensity,
            light_intensity: 0.0,
        });
    }

    /// Ages every effect and removes the expired ones. Returns how many were
    /// released this tick.
    pub fn tick(&mut self, scene: &mut Scene, dt: f32) -> usize {
        let mut released = 0;
        for index in (0..self.effects.len()).rev() {
            let effect = &mut self.effects[index];
            effect.age += dt;
            let progress = effect.age / effect.max_age;
            match effect.kind {
                EffectKind::Explosion => {
                    effect.scale = 1.0 + effect.age * 3.0;
                    effect.opacity = (1.0 - progress).max(0.0);
                    effect.light_intensity = (1.4 - effect.age * 1.8).max(0.0);
                }
                EffectKind::Hallucination {
                    spin,
                    float,
                    intensity,
                } => {
                    effect.opacity = ((1.0 - progress) * 0.6 * intensity).max(0.0);
                    let node = effect.node;
                    let _ = scene.translate(node, Vec3::new(0.0, float * dt, 0.0));
                    if let Ok(yaw) = scene.world_yaw(node) {
                        let _ = scene.set_yaw(node, yaw + spin * dt);
                    }
                }
            }

            if self.effects[index].age >= self.effects[index].max_age {
                let node = self.effects[index].node;
                let _ = scene.remove_subtree(node);
                self.effects.swap_remove(index);
                released += 1;
            }
        }
        released
    }

    pub fn clear(&mut self, scene: &mut Scene) {
        for effect in self.effects.drain(..) {
            let _ = scene.remove_subtree(effect.node);
        }
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn explosion_expires_and_releases_node_once() {
        let mut scene = Scene::new();
        let mut pool = EffectsPool::new();
        pool.spawn_explosion(&mut scene, Vec3::new(1.0, 0.2, -3.0));
        let node = pool.iter().next().unwrap().node;

        let mut released = 0;
        let mut elapsed = 0.0_f32;
        while elapsed < 1.0 {
            released += pool.tick(&mut scene, 0.1);
            elapsed += 0.1;
        }

        assert!(pool.is_empty());
        assert_eq!(released, 1, "resources must be released exactly once");
        assert!(!scene.contains(node));
    }

    #[test]
    fn explosion_visuals_derive_from_age() {
        let mut scene = Scene::new();
        let mut pool = EffectsPool::new();
        pool.spawn_explosion(&mut scene, Vec3::ZERO);

        pool.tick(&mut scene, 0.4);
        let effect = pool.iter().next().unwrap();
        assert!((effect.scale - 2.2).abs() < 1e-5);
        assert!((effect.opacity - 0.5).abs() < 1e-5);
        assert!((effect.light_intensity - (1.4 - 0.4 * 1.8)).abs() < 1e-5);
    }

    #[test]
    fn hallucination_drifts_upward_until_expiry() {
        let mut scene = Scene::new();
        let mut pool = EffectsPool::new();
        let mut rng = StdRng::seed_from_u64(7);
        pool.spawn_hallucination(&mut scene, Vec3::new(0.0, 1.6, 0.0), 1.0, &mut rng);
        let node = pool.iter().next().unwrap().node;
        let start_y = scene.world_position(node).unwrap().y;

        pool.tick(&mut scene, 0.2);
        assert!(scene.world_position(node).unwrap().y > start_y);

        for _ in 0..20 {
            pool.tick(&mut scene, 0.2);
        }
        assert!(pool.is_empty());
        assert!(!scene.contains(node));
    }

    #[test]
    fn clear_releases_everything() {
        let mut scene = Scene::new();
        let mut pool = EffectsPool::new();
        pool.spawn_explosion(&mut scene, Vec3::ZERO);
        pool.spawn_explosion(&mut scene, Vec3::X);
        pool.clear(&mut scene);
        assert!(pool.is_empty());
    }
}
