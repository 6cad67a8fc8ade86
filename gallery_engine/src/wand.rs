//! Hand tool cosmetics and the lightning beam.
//!
//! Aiming uses the tool-tip origin with the camera's direction, so the beam
//! appears to leave the hand while landing exactly where the crosshair
//! points.

use gallery_scene::SceneHit;
use glam::Vec3;
use rand::Rng;

use crate::player::Player;
use crate::targeting::TargetingSet;

pub const BEAM_SEGMENTS: usize = 18;
pub const BEAM_MAX_RANGE: f32 = 60.0;
const BEAM_JITTER: f32 = 0.22;
const RECOIL_KICK: f32 = 0.35;
const RECOIL_RECOVERY: f32 = 6.0;
const CHANNEL_RATE: f32 = 4.0;

#[derive(Debug, Default)]
pub struct Wand {
    recoil: f32,
    channel: f32,
}

impl Wand {
    pub fn new() -> Self {
        Self::default()
    }

    /// World position of the tool tip: offset right, down, and slightly
    /// forward of the camera.
    pub fn tip_position(&self, player: &Player) -> Vec3 {
        let forward = player.camera_forward();
        let right = player.flat_forward().cross(Vec3::Y);
        player.position + right * 0.35 - Vec3::Y * 0.25 + forward * 0.5
    }

    pub fn trigger_recoil(&mut self) {
        self.recoil = RECOIL_KICK;
    }

    /// Recoil springs back; the channel glow ramps while the beam is held.
    pub fn tick(&mut self, beam_held: bool, dt: f32) {
        self.recoil = (self.recoil - RECOIL_RECOVERY * RECOIL_KICK * dt).max(0.0);
        let target = if beam_held { 1.0 } else { 0.0 };
        self.channel += (target - self.channel) * (CHANNEL_RATE * dt).min(1.0);
    }

    pub fn recoil(&self) -> f32 {
        self.recoil
    }

    pub fn channel(&self) -> f32 {
        self.channel
    }
}

#[derive(Debug, Clone)]
pub struct Beam {
    /// Tip-to-endpoint polyline, jittered between the fixed endpoints.
    pub points: Vec<Vec3>,
    pub hit: Option<SceneHit>,
}

/// Casts from the tool tip along the camera direction, then builds the
/// jittered polyline to the impact point (or max range on a miss).
pub fn cast_beam<R: Rng>(
    targets: &TargetingSet,
    scene: &gallery_scene::Scene,
    tip: Vec3,
    direction: Vec3,
    rng: &mut R,
) -> Beam {
    let hit = targets.resolve_forward_hit(scene, tip, direction, BEAM_MAX_RANGE);
    let end = match &hit {
        Some(hit) => hit.point,
        None => tip + direction.normalize_or_zero() * BEAM_MAX_RANGE,
    };

    let axis = (end - tip).normalize_or_zero();
    let side = if axis.cross(Vec3::Y).length_squared() > 1e-6 {
        axis.cross(Vec3::Y).normalize()
    } else {
        Vec3::X
    };
    let up = side.cross(axis);

    let mut points = Vec::with_capacity(BEAM_SEGMENTS + 1);
    for segment in 0..=BEAM_SEGMENTS {
        let t = segment as f32 / BEAM_SEGMENTS as f32;
        let mut point = tip.lerp(end, t);
        if segment != 0 && segment != BEAM_SEGMENTS {
            point += side * (rng.gen::<f32>() - 0.5) * BEAM_JITTER;
            point += up * (rng.gen::<f32>() - 0.5) * BEAM_JITTER;
        }
        points.push(point);
    }
    Beam { points, hit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_scene::Scene;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn beam_endpoints_are_exact_and_interior_is_jittered() {
        let mut scene = Scene::new();
        let room = scene.add_group("room", None).unwrap();
        let wall = scene
            .add_mesh("wall", Some(room), Vec3::new(5.0, 3.0, 0.1))
            .unwrap();
        scene.set_position(wall, Vec3::new(0.0, 3.0, -8.0)).unwrap();

        let mut targets = TargetingSet::new();
        targets.rebuild(&scene, room);

        let tip = Vec3::new(0.35, 1.35, 0.0);
        let mut rng = StdRng::seed_from_u64(11);
        let beam = cast_beam(&targets, &scene, tip, Vec3::NEG_Z, &mut rng);

        assert_eq!(beam.points.len(), BEAM_SEGMENTS + 1);
        assert_eq!(beam.points[0], tip);
        let hit = beam.hit.expect("wall ahead must be hit");
        assert_eq!(hit.node, wall);
        assert_eq!(*beam.points.last().unwrap(), hit.point);

        for point in &beam.points[1..BEAM_SEGMENTS] {
            let straight = Vec3::new(tip.x, tip.y, point.z);
            assert!((point.distance(straight)) <= BEAM_JITTER);
        }
    }

    #[test]
    fn miss_runs_to_max_range() {
        let scene = Scene::new();
        let targets = TargetingSet::new();
        let mut rng = StdRng::seed_from_u64(3);
        let beam = cast_beam(&targets, &scene, Vec3::ZERO, Vec3::NEG_Z, &mut rng);
        assert!(beam.hit.is_none());
        assert_eq!(
            *beam.points.last().unwrap(),
            Vec3::new(0.0, 0.0, -BEAM_MAX_RANGE)
        );
    }

    #[test]
    fn recoil_decays_and_channel_ramps() {
        let mut wand = Wand::new();
        wand.trigger_recoil();
        assert!(wand.recoil() > 0.0);
        for _ in 0..60 {
            wand.tick(true, 1.0 / 60.0);
        }
        assert_eq!(wand.recoil(), 0.0);
        assert!(wand.channel() > 0.8);

        for _ in 0..120 {
            wand.tick(false, 1.0 / 60.0);
        }
        assert!(wand.channel() < 0.05);
    }
}
