//! Hazard minigames: thrown bombs, the drunk state, and the police chase.
//! All outcomes funnel into the jail overlay owned by the runtime.

use gallery_scene::{NodeId, Scene};
use glam::Vec3;
use log::{debug, info};
use rand::Rng;

use crate::player::MoveIntent;
use crate::rooms::RoomBounds;

const BOMB_THROW_SPEED: f32 = 12.0;
const BOMB_THROW_LIFT: f32 = 2.0;
const BOMB_GRAVITY: f32 = 9.8;
const BOMB_RESTITUTION: f32 = 0.8;
const BOMB_FUSE_SECONDS: f32 = 2.4;
const BOMB_DETONATE_HEIGHT: f32 = 0.2;
const BOMB_BLAST_RADIUS: f32 = 2.6;

const POLICE_SPEED: f32 = 2.4;
const POLICE_CAPTURE_DISTANCE: f32 = 1.1;
const POLICE_IN_FRONT_DOT: f32 = 0.3;

const DRUNK_DURATION: f32 = 6.0;
const HALLUCINATION_RATE: f32 = 0.4;

#[derive(Debug, Clone, Copy)]
struct Bomb {
    node: NodeId,
    velocity: Vec3,
    age: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detonation {
    pub position: Vec3,
    /// Player stood inside the blast radius.
    pub caught_player: bool,
}

#[derive(Debug, Default)]
pub struct BombField {
    bombs: Vec<Bomb>,
}

impl BombField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn throw(&mut self, scene: &mut Scene, origin: Vec3, camera_forward: Vec3) {
        let Ok(node) = scene.add_mesh("bomb", None, Vec3::splat(0.18)) else {
            return;
        };
        let _ = scene.set_position(node, origin);
        self.bombs.push(Bomb {
            node,
            velocity: camera_forward.normalize_or_zero() * BOMB_THROW_SPEED
                + Vec3::Y * BOMB_THROW_LIFT,
            age: 0.0,
        });
    }

    /// Integrates every live bomb and returns the detonations this frame.
    /// Bombs bounce off the owning room's walls and detonate on floor
    /// contact or when the fuse runs out.
    pub fn tick(
        &mut self,
        scene: &mut Scene,
        dt: f32,
        bounds: &RoomBounds,
        player_position: Vec3,
    ) -> Vec<Detonation> {
        let mut detonations = Vec::new();
        for index in (0..self.bombs.len()).rev() {
            let bomb = &mut self.bombs[index];
            bomb.age += dt;
            bomb.velocity.y -= BOMB_GRAVITY * dt;

            let Ok(mut position) = scene.world_position(bomb.node) else {
                self.bombs.swap_remove(index);
                continue;
            };
            position += bomb.velocity * dt;

            if position.x < bounds.min_x || position.x > bounds.max_x {
                position.x = position.x.clamp(bounds.min_x, bounds.max_x);
                bomb.velocity.x = -bomb.velocity.x * BOMB_RESTITUTION;
            }
            if position.z < bounds.min_z || position.z > bounds.max_z {
                position.z = position.z.clamp(bounds.min_z, bounds.max_z);
                bomb.velocity.z = -bomb.velocity.z * BOMB_RESTITUTION;
            }
            let _ = scene.set_position(bomb.node, position);

            if position.y <= BOMB_DETONATE_HEIGHT || bomb.age >= BOMB_FUSE_SECONDS {
                let caught = position.distance(player_position) <= BOMB_BLAST_RADIUS;
                detonations.push(Detonation {
                    position,
                    caught_player: caught,
                });
                let node = bomb.node;
                let _ = scene.remove_subtree(node);
                self.bombs.swap_remove(index);
            }
        }
        detonations
    }

    pub fn clear(&mut self, scene: &mut Scene) {
        for bomb in self.bombs.drain(..) {
            let _ = scene.remove_subtree(bomb.node);
        }
    }

    pub fn len(&self) -> usize {
        self.bombs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bombs.is_empty()
    }
}

/// Drunk timer plus the locomotion and camera distortions it drives.
#[derive(Debug, Default)]
pub struct DrunkState {
    remaining: f32,
}

impl DrunkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drink(&mut self) {
        self.remaining = DRUNK_DURATION;
        info!("drunk for {DRUNK_DURATION} seconds");
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn clear(&mut self) {
        self.remaining = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// 1.0 right after drinking, fading linearly to 0.
    pub fn intensity(&self) -> f32 {
        (self.remaining / DRUNK_DURATION).clamp(0.0, 1.0)
    }

    /// Lags and drifts the raw intent: forward presses stall and sideways
    /// stumbles appear, scaled by intensity.
    pub fn distort_intent<R: Rng>(&self, intent: MoveIntent, rng: &mut R) -> MoveIntent {
        let intensity = self.intensity();
        if intensity <= 0.0 {
            return intent;
        }
        let mut out = intent;
        if intent.forward && rng.gen::<f32>() < intensity * 0.5 {
            out.forward = false;
        }
        if rng.gen::<f32>() < intensity * 0.3 {
            if rng.gen::<bool>() {
                out.left = true;
            } else {
                out.right = true;
            }
        }
        out
    }

    pub fn camera_roll(&self, time: f64) -> f32 {
        ((time * 2.0).sin() as f32) * 0.25 * self.intensity()
    }

    pub fn fov_offset(&self, time: f64) -> f32 {
        ((time * 1.3).sin() as f32) * 8.0 * self.intensity()
    }

    pub fn filter_strength(&self) -> f32 {
        self.intensity()
    }

    /// Poisson-ish hallucination trigger at `0.4 * intensity` spawns/second.
    pub fn should_hallucinate<R: Rng>(&self, rng: &mut R, dt: f32) -> bool {
        self.is_active() && rng.gen::<f32>() < HALLUCINATION_RATE * self.intensity() * dt
    }
}

/// The pursuer. At most one exists; room changes reposition it at a door
/// rather than despawning it.
#[derive(Debug, Default)]
pub struct PoliceChase {
    node: Option<NodeId>,
}

impl PoliceChase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.node.is_some()
    }

    /// Spawns at a door of the current room, preferring one in front of the
    /// camera so the player sees the entrance happen.
    pub fn spawn(
        &mut self,
        scene: &mut Scene,
        doors: &[(NodeId, usize)],
        player_position: Vec3,
        camera_forward: Vec3,
    ) {
        if self.node.is_some() {
            return;
        }
        let Some(position) = pick_door_position(scene, doors, player_position, camera_forward)
        else {
            debug!("no door to spawn the pursuer at");
            return;
        };
        let Ok(node) = scene.add_mesh("police", None, Vec3::new(0.4, 0.9, 0.3)) else {
            return;
        };
        let _ = scene.set_position(node, Vec3::new(position.x, 0.9, position.z));
        self.node = Some(node);
    }

    /// Moves toward the player; returns true on capture.
    pub fn tick(&mut self, scene: &mut Scene, dt: f32, player_position: Vec3) -> bool {
        let Some(node) = self.node else {
            return false;
        };
        let Ok(position) = scene.world_position(node) else {
            self.node = None;
            return false;
        };
        let to_player = Vec3::new(
            player_position.x - position.x,
            0.0,
            player_position.z - position.z,
        );
        let distance = to_player.length();
        if distance <= POLICE_CAPTURE_DISTANCE {
            return true;
        }
        let step = to_player.normalize_or_zero() * POLICE_SPEED * dt;
        let _ = scene.translate(node, step);
        if let Ok(yaw) = scene.world_yaw(node) {
            let facing = (-to_player.x).atan2(-to_player.z);
            let _ = scene.set_yaw(node, yaw + (facing - yaw) * (4.0 * dt).min(1.0));
        }
        false
    }

    /// Keeps the chase alive across a room change by moving the pursuer to a
    /// door of the new room.
    pub fn reposition(
        &mut self,
        scene: &mut Scene,
        doors: &[(NodeId, usize)],
        player_position: Vec3,
        camera_forward: Vec3,
    ) {
        let Some(node) = self.node else {
            return;
        };
        if let Some(position) = pick_door_position(scene, doors, player_position, camera_forward) {
            let _ = scene.set_position(node, Vec3::new(position.x, 0.9, position.z));
        }
    }

    pub fn despawn(&mut self, scene: &mut Scene) {
        if let Some(node) = self.node.take() {
            let _ = scene.remove_subtree(node);
        }
    }

    pub fn position(&self, scene: &Scene) -> Option<Vec3> {
        self.node.and_then(|node| scene.world_position(node).ok())
    }
}

fn pick_door_position(
    scene: &Scene,
    doors: &[(NodeId, usize)],
    player_position: Vec3,
    camera_forward: Vec3,
) -> Option<Vec3> {
    let positions: Vec<Vec3> = doors
        .iter()
        .filter_map(|(id, _)| scene.world_position(*id).ok())
        .collect();
    let in_front = positions.iter().find(|position| {
        let to_door = (**position - player_position).normalize_or_zero();
        to_door.dot(camera_forward.normalize_or_zero()) > POLICE_IN_FRONT_DOT
    });
    in_front.or_else(|| positions.first()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wide_bounds() -> RoomBounds {
        RoomBounds::centered(Vec3::ZERO, 10.0, 10.0)
    }

    #[test]
    fn bomb_detonates_on_floor_contact() {
        let mut scene = Scene::new();
        let mut field = BombField::new();
        field.throw(&mut scene, Vec3::new(0.0, 1.4, 0.0), Vec3::NEG_Z);

        let mut detonations = Vec::new();
        for _ in 0..120 {
            detonations.extend(field.tick(
                &mut scene,
                1.0 / 60.0,
                &wide_bounds(),
                Vec3::new(50.0, 1.6, 50.0),
            ));
            if !detonations.is_empty() {
                break;
            }
        }
        assert_eq!(detonations.len(), 1);
        assert!(detonations[0].position.y <= BOMB_DETONATE_HEIGHT + 0.5);
        assert!(!detonations[0].caught_player);
        assert!(field.is_empty());
    }

    #[test]
    fn bomb_blast_catches_nearby_player() {
        let mut scene = Scene::new();
        let mut field = BombField::new();
        field.throw(&mut scene, Vec3::new(0.0, 1.4, 0.0), Vec3::NEG_Z);

        // The bomb lands roughly nine units down-range; stand the player there.
        let player = Vec3::new(0.0, 1.6, -8.0);
        let mut caught = false;
        for _ in 0..180 {
            for detonation in field.tick(&mut scene, 1.0 / 60.0, &wide_bounds(), player) {
                caught |= detonation.caught_player;
            }
        }
        assert!(caught, "player near the landing point is inside the 2.6 blast");
    }

    #[test]
    fn bomb_bounces_off_room_walls() {
        let mut scene = Scene::new();
        let mut field = BombField::new();
        let bounds = RoomBounds::centered(Vec3::ZERO, 2.0, 2.0);
        // Thrown level at a near wall; fuse far from expiring.
        field.throw(&mut scene, Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z);

        let mut saw_reversal = false;
        for _ in 0..30 {
            field.tick(&mut scene, 1.0 / 60.0, &bounds, Vec3::new(50.0, 0.0, 50.0));
            if let Some(bomb) = field.bombs.first() {
                if bomb.velocity.z > 0.0 {
                    saw_reversal = true;
                    let position = scene.world_position(bomb.node).unwrap();
                    assert!(position.z >= bounds.min_z);
                    break;
                }
            } else {
                break;
            }
        }
        assert!(saw_reversal, "z velocity reverses at the wall");
    }

    #[test]
    fn fuse_detonates_airborne_bombs() {
        let mut scene = Scene::new();
        let mut field = BombField::new();
        // Straight up: stays above the floor past the fuse time.
        field.throw(&mut scene, Vec3::new(0.0, 200.0, 0.0), Vec3::Y);
        let mut detonated = false;
        let mut elapsed = 0.0_f32;
        while elapsed < 3.0 {
            if !field
                .tick(&mut scene, 0.1, &wide_bounds(), Vec3::new(50.0, 0.0, 50.0))
                .is_empty()
            {
                detonated = true;
                assert!(elapsed >= BOMB_FUSE_SECONDS - 0.2);
                break;
            }
            elapsed += 0.1;
        }
        assert!(detonated);
    }

    #[test]
    fn drunk_intensity_decays_to_zero() {
        let mut drunk = DrunkState::new();
        drunk.drink();
        assert_eq!(drunk.intensity(), 1.0);
        drunk.tick(3.0);
        assert!((drunk.intensity() - 0.5).abs() < 1e-6);
        drunk.tick(4.0);
        assert!(!drunk.is_active());
        assert_eq!(drunk.camera_roll(1.0), 0.0);
    }

    #[test]
    fn sober_intent_passes_through_unchanged() {
        let drunk = DrunkState::new();
        let mut rng = StdRng::seed_from_u64(1);
        let intent = MoveIntent {
            forward: true,
            ..MoveIntent::default()
        };
        for _ in 0..50 {
            assert_eq!(drunk.distort_intent(intent, &mut rng), intent);
        }
    }

    #[test]
    fn drunk_intent_stumbles_eventually() {
        let mut drunk = DrunkState::new();
        drunk.drink();
        let mut rng = StdRng::seed_from_u64(2);
        let intent = MoveIntent {
            forward: true,
            ..MoveIntent::default()
        };
        let distorted = (0..100).any(|_| drunk.distort_intent(intent, &mut rng) != intent);
        assert!(distorted);
    }

    #[test]
    fn police_closes_in_and_captures() {
        let mut scene = Scene::new();
        let door = scene.add_mesh("door", None, Vec3::new(0.7, 1.1, 0.1)).unwrap();
        scene.set_position(door, Vec3::new(0.0, 1.1, -8.0)).unwrap();

        let mut police = PoliceChase::new();
        let player = Vec3::new(0.0, 1.6, 0.0);
        police.spawn(&mut scene, &[(door, 1)], player, Vec3::NEG_Z);
        assert!(police.is_active());

        let mut captured = false;
        let mut elapsed = 0.0_f32;
        while elapsed < 6.0 {
            if police.tick(&mut scene, 1.0 / 60.0, player) {
                captured = true;
                break;
            }
            elapsed += 1.0 / 60.0;
        }
        assert!(captured);
        // 6.9 units to cover at 2.4 u/s: roughly three seconds.
        assert!(elapsed > 2.0 && elapsed < 4.0);
    }

    #[test]
    fn spawn_prefers_a_door_in_front_of_the_camera() {
        let mut scene = Scene::new();
        let behind = scene.add_mesh("door_b", None, Vec3::new(0.7, 1.1, 0.1)).unwrap();
        scene.set_position(behind, Vec3::new(0.0, 1.1, 8.0)).unwrap();
        let ahead = scene.add_mesh("door_a", None, Vec3::new(0.7, 1.1, 0.1)).unwrap();
        scene.set_position(ahead, Vec3::new(0.0, 1.1, -8.0)).unwrap();

        let mut police = PoliceChase::new();
        police.spawn(
            &mut scene,
            &[(behind, 0), (ahead, 1)],
            Vec3::new(0.0, 1.6, 0.0),
            Vec3::NEG_Z,
        );
        let position = police.position(&scene).unwrap();
        assert!(position.z < 0.0, "spawned at the door the camera faces");
    }

    #[test]
    fn despawn_removes_the_pursuer_node() {
        let mut scene = Scene::new();
        let door = scene.add_mesh("door", None, Vec3::new(0.7, 1.1, 0.1)).unwrap();
        scene.set_position(door, Vec3::new(0.0, 1.1, -8.0)).unwrap();
        let mut police = PoliceChase::new();
        police.spawn(&mut scene, &[(door, 1)], Vec3::ZERO, Vec3::NEG_Z);
        police.despawn(&mut scene);
        assert!(!police.is_active());
        assert!(police.position(&scene).is_none());
    }
}
