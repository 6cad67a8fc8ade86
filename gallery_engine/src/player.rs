//! First-person locomotion and the pointer-lock lifecycle.

use gallery_scene::Scene;
use glam::Vec3;
use log::{debug, warn};

use crate::collision::CollisionRegistry;
use crate::config::{
    EYE_HEIGHT, GRAVITY, GROUND_HEIGHT, JUMP_VELOCITY, PLAYER_RADIUS, POINTER_LOCK_COOLDOWN,
    VELOCITY_DAMPING, WALK_ACCELERATION,
};

const LOOK_SENSITIVITY: f32 = 0.002;
const PITCH_LIMIT: f32 = 1.5;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    grounded: bool,
}

impl Player {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            grounded: true,
        }
    }

    /// Hard reset used on room transitions and restarts: spawn position,
    /// facing, and all momentum discarded.
    pub fn reset(&mut self, spawn: Vec3, yaw: f32) {
        self.position = spawn;
        self.velocity = Vec3::ZERO;
        self.yaw = yaw;
        self.pitch = 0.0;
        self.grounded = true;
    }

    pub fn apply_look(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw -= delta_x * LOOK_SENSITIVITY;
        self.pitch = (self.pitch - delta_y * LOOK_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Camera direction including pitch. Yaw zero faces negative z.
    pub fn camera_forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// Movement basis: forward projected onto the ground plane.
    pub fn flat_forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-sin_yaw, 0.0, -cos_yaw)
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// One locomotion step. Horizontal movement is accept-or-reject against
    /// the collision registry; a rejected move zeroes horizontal velocity
    /// rather than sliding along the surface.
    pub fn step(
        &mut self,
        intent: &MoveIntent,
        dt: f32,
        scene: &Scene,
        collisions: &mut CollisionRegistry,
    ) {
        self.velocity.x -= self.velocity.x * VELOCITY_DAMPING * dt;
        self.velocity.z -= self.velocity.z * VELOCITY_DAMPING * dt;

        let axis_forward = (intent.forward as i8 - intent.backward as i8) as f32;
        let axis_right = (intent.right as i8 - intent.left as i8) as f32;
        if axis_forward != 0.0 || axis_right != 0.0 {
            let forward = self.flat_forward();
            let right = forward.cross(Vec3::Y);
            let wish = (forward * axis_forward + right * axis_right).normalize_or_zero();
            self.velocity += wish * WALK_ACCELERATION * dt;
        }

        let horizontal = Vec3::new(self.velocity.x, 0.0, self.velocity.z);
        let candidate = self.position + horizontal * dt;
        if collisions.query(scene, candidate, PLAYER_RADIUS) {
            debug!(
                "movement blocked at {:.2},{:.2},{:.2}",
                candidate.x, candidate.y, candidate.z
            );
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
        } else {
            self.position.x = candidate.x;
            self.position.z = candidate.z;
        }

        if intent.jump && self.grounded {
            self.velocity.y = JUMP_VELOCITY;
            self.grounded = false;
        }
        self.velocity.y += GRAVITY * dt;
        self.position.y += self.velocity.y * dt;

        let floor = GROUND_HEIGHT + EYE_HEIGHT;
        if self.position.y <= floor {
            self.position.y = floor;
            self.velocity.y = 0.0;
            self.grounded = true;
        }
    }
}

/// Pointer-lock lifecycle. The host owns the actual capture primitive; this
/// state machine tracks whether we hold it, throttles repeated requests, and
/// allows exactly one automatic retry after a rejection.
#[derive(Debug, Default)]
pub struct PointerLock {
    locked: bool,
    ever_locked: bool,
    last_request_at: Option<f64>,
    retried: bool,
}

/// What a successful acquisition means to the rest of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAcquired {
    First,
    Resumed,
}

impl PointerLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when a request should actually be issued to the host;
    /// false when still inside the request cooldown.
    pub fn request(&mut self, now: f64) -> bool {
        if self.locked {
            return false;
        }
        if let Some(last) = self.last_request_at {
            if now - last < f64::from(POINTER_LOCK_COOLDOWN) {
                return false;
            }
        }
        self.last_request_at = Some(now);
        true
    }

    pub fn acquired(&mut self, _now: f64) -> LockAcquired {
        self.locked = true;
        self.retried = false;
        if self.ever_locked {
            LockAcquired::Resumed
        } else {
            self.ever_locked = true;
            LockAcquired::First
        }
    }

    /// Host rejected the request. The first rejection asks the caller to try
    /// again once the cooldown elapses; further rejections only log.
    pub fn rejected(&mut self, now: f64) -> bool {
        if self.retried {
            warn!("pointer lock rejected twice at t={now:.2}; giving up until next input");
            self.retried = false;
            false
        } else {
            self.retried = true;
            true
        }
    }

    pub fn released(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
