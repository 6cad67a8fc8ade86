//! Static per-room descriptors consumed at startup. There is no external
//! configuration surface; this table is the whole of it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConfig {
    pub id: &'static str,
    pub label: &'static str,
    pub audio_key: &'static str,
    pub theme: &'static str,
}

pub const ROOM_CONFIGS: &[RoomConfig] = &[
    RoomConfig {
        id: "room1",
        label: "Room 1: How I Think as an Engineer",
        audio_key: "room1",
        theme: "thinking",
    },
    RoomConfig {
        id: "room2",
        label: "Room 2: Challenging Assumptions",
        audio_key: "room2",
        theme: "assumptions",
    },
    RoomConfig {
        id: "room3",
        label: "Room 3: First Principles (CellScope)",
        audio_key: "room3",
        theme: "principles",
    },
    RoomConfig {
        id: "room4",
        label: "Room 4: Simplicity Over Complexity",
        audio_key: "room4",
        theme: "simplicity",
    },
    RoomConfig {
        id: "room5",
        label: "Room 5: Speed & Iteration",
        audio_key: "room5",
        theme: "iteration",
    },
    RoomConfig {
        id: "room6",
        label: "Room 6: Reflection & Growth",
        audio_key: "room6",
        theme: "growth",
    },
];

// Locomotion and camera constants. One canonical set; the source snapshots
// disagreed with each other and these are the values the final room set used.
pub const EYE_HEIGHT: f32 = 1.6;
pub const GROUND_HEIGHT: f32 = 0.0;
pub const GRAVITY: f32 = -24.0;
pub const JUMP_VELOCITY: f32 = 8.0;
pub const WALK_ACCELERATION: f32 = 50.0;
pub const VELOCITY_DAMPING: f32 = 10.0;
pub const PLAYER_RADIUS: f32 = 0.5;

pub const DOOR_INTERACT_DISTANCE: f32 = 2.2;
pub const POINTER_LOCK_COOLDOWN: f32 = 0.15;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_ids_are_unique() {
        for (i, a) in ROOM_CONFIGS.iter().enumerate() {
            for b in &ROOM_CONFIGS[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.audio_key, b.audio_key);
            }
        }
    }
}
