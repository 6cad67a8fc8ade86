//! The per-frame driver. One pass, fixed order, single thread; the room
//! registry's transitioning flag is the only mutual-exclusion device in the
//! whole engine.

use gallery_scene::Interactable;
use log::error;

use crate::config::DOOR_INTERACT_DISTANCE;
use crate::input::FrameInput;
use crate::player::{LockAcquired, MoveIntent};
use crate::rooms::nearest_door;
use crate::snapshot::{FrameSnapshot, RenderSink};
use crate::targeting::Ability;
use crate::wand::cast_beam;
use crate::world::World;

/// Fixed-step simulated clock. Audio offsets and cooldowns read this, so a
/// scripted run produces identical timing regardless of wall time.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    pub frame: u64,
    pub dt: f32,
}

impl FrameClock {
    pub fn new(dt: f32) -> Self {
        Self { frame: 0, dt }
    }

    pub fn now(&self) -> f64 {
        self.frame as f64 * f64::from(self.dt)
    }

    pub fn advance(&mut self) {
        self.frame += 1;
    }
}

pub fn advance_frame(world: &mut World, input: &FrameInput, clock: &FrameClock, sink: &dyn RenderSink) {
    let now = clock.now();
    let dt = clock.dt;

    handle_pointer_lock(world, input, now);

    if world.lock.is_locked() && !world.jailed {
        world.player.apply_look(input.look_delta_x, input.look_delta_y);
        let intent = MoveIntent {
            forward: input.move_forward,
            backward: input.move_backward,
            left: input.move_left,
            right: input.move_right,
            jump: input.jump,
        };
        let intent = world.drunk.distort_intent(intent, &mut world.rng);
        world
            .player
            .step(&intent, dt, &world.scene, &mut world.collisions);
    }

    handle_navigation(world, input, now);
    handle_abilities(world, input, now, dt);

    // Per-room animation is fault-isolated: a failing room never kills the
    // frame loop.
    if let Err(err) = world.rooms.update_current(&mut world.scene, now, dt) {
        error!("room update failed: {err}");
        world.log_event(format!("room.update_error {err}"));
    }

    advance_hazards(world, now, dt);

    world.effects.tick(&mut world.scene, dt);
    world.audio.tick(now);

    let narration_duration = world
        .rooms
        .current_config()
        .and_then(|config| world.assets.audio_duration(config.audio_key))
        .map(f64::from);
    world
        .subtitles
        .tick(world.audio.position(now), narration_duration);

    if input.restart && world.jailed {
        world.restart(now);
    }

    sink.submit(&build_snapshot(world, clock));
}

fn handle_pointer_lock(world: &mut World, input: &FrameInput, now: f64) {
    if input.request_lock && !world.jailed && world.lock.request(now) {
        // Headless host: capture always succeeds.
        match world.lock.acquired(now) {
            LockAcquired::First => {
                world.audio.resume(now);
                world.log_event("lock.acquired first".to_string());
            }
            LockAcquired::Resumed => {
                world.audio.resume(now);
                world.log_event("lock.acquired".to_string());
            }
        }
    }
    if input.release_lock && world.lock.is_locked() {
        world.lock.released();
        world.audio.pause(now);
        world.log_event("lock.released".to_string());
    }
}

fn handle_navigation(world: &mut World, input: &FrameInput, now: f64) {
    if world.jailed {
        return;
    }
    if input.navigate_next {
        if let Some(next) = world.rooms.next_index() {
            world.enter_room(next, now);
        }
    }
    if input.navigate_previous {
        if let Some(previous) = world.rooms.previous_index() {
            world.enter_room(previous, now);
        }
    }

    if input.interact {
        if let Some(root) = world.rooms.current_root() {
            if let Some((_, target, distance)) =
                nearest_door(&world.scene, root, world.player.position)
            {
                if distance <= DOOR_INTERACT_DISTANCE {
                    world.enter_room(target, now);
                    return;
                }
            }
        }
        // Not at a door: see whether the crosshair rests on something
        // interactive.
        let hit = world.targeting.resolve_forward_hit(
            &world.scene,
            world.player.position,
            world.player.camera_forward(),
            8.0,
        );
        if let Some(hit) = hit {
            match world.scene.node(hit.node).ok().and_then(|node| node.tag) {
                Some(Interactable::ViewButton) => {
                    let active = !world.rooms.view_overlay_active();
                    world.rooms.set_view_overlay(active);
                    if let Some(overlay) = world.rooms.current_overlay_node() {
                        if let Err(err) = world.scene.set_visible(overlay, active) {
                            error!("overlay toggle failed: {err}");
                        }
                    }
                    world.log_event(format!("overlay.view {active}"));
                }
                Some(Interactable::CodeBlock { slot }) => {
                    world.log_event(format!("exhibit.code_block {slot}"));
                }
                _ => {}
            }
        }
    }
}

fn handle_abilities(world: &mut World, input: &FrameInput, now: f64, dt: f32) {
    if world.jailed {
        world.wand.tick(false, dt);
        return;
    }

    if input.cast_bomb && world.cooldowns.can_activate(Ability::Bomb, now) {
        let tip = world.wand.tip_position(&world.player);
        world
            .bombs
            .throw(&mut world.scene, tip, world.player.camera_forward());
        world.wand.trigger_recoil();
        world.log_event("spell.cast bomb".to_string());
    }

    if input.cast_mark && world.cooldowns.can_activate(Ability::Mark, now) {
        let tip = world.wand.tip_position(&world.player);
        let hit = world.targeting.resolve_forward_hit(
            &world.scene,
            tip,
            world.player.camera_forward(),
            crate::wand::BEAM_MAX_RANGE,
        );
        world.wand.trigger_recoil();
        match hit {
            Some(hit) => world.log_event(format!(
                "spell.cast mark {:.2},{:.2},{:.2}",
                hit.point.x, hit.point.y, hit.point.z
            )),
            None => world.log_event("spell.cast mark miss".to_string()),
        }
    }

    if input.drink_beer && world.cooldowns.can_activate(Ability::Beer, now) {
        world.drunk.drink();
        world.log_event("spell.cast beer".to_string());
        if !world.police.is_active() {
            if let Some(root) = world.rooms.current_root() {
                let doors = crate::rooms::door_nodes(&world.scene, root);
                world.police.spawn(
                    &mut world.scene,
                    &doors,
                    world.player.position,
                    world.player.camera_forward(),
                );
                if world.police.is_active() {
                    world.audio.play_effect("siren", true, now);
                    world.log_event("police.spawn".to_string());
                }
            }
        }
    }

    if input.beam_held {
        let tip = world.wand.tip_position(&world.player);
        let beam = cast_beam(
            &world.targeting,
            &world.scene,
            tip,
            world.player.camera_forward(),
            &mut world.rng,
        );
        if let Some(hit) = beam.hit {
            world.log_event(format!("beam.hit {:?}", hit.node));
        }
    }
    world.wand.tick(input.beam_held, dt);
}

fn advance_hazards(world: &mut World, now: f64, dt: f32) {
    if world.jailed {
        return;
    }

    if let Some(bounds) = world.rooms.current_bounds() {
        let detonations =
            world
                .bombs
                .tick(&mut world.scene, dt, &bounds, world.player.position);
        for detonation in detonations {
            world
                .effects
                .spawn_explosion(&mut world.scene, detonation.position);
            world.log_event(format!(
                "bomb.detonate {:.2},{:.2},{:.2}",
                detonation.position.x, detonation.position.y, detonation.position.z
            ));
            if detonation.caught_player {
                world.jail(now);
                return;
            }
        }
    }

    if world
        .police
        .tick(&mut world.scene, dt, world.player.position)
    {
        world.log_event("police.capture".to_string());
        world.jail(now);
        return;
    }

    world.drunk.tick(dt);
    if world.drunk.should_hallucinate(&mut world.rng, dt) {
        let around = world.player.position;
        let intensity = world.drunk.intensity();
        world
            .effects
            .spawn_hallucination(&mut world.scene, around, intensity, &mut world.rng);
    }
}

fn build_snapshot(world: &World, clock: &FrameClock) -> FrameSnapshot {
    let door_prompt = world.rooms.current_root().and_then(|root| {
        nearest_door(&world.scene, root, world.player.position)
            .filter(|(_, _, distance)| *distance <= DOOR_INTERACT_DISTANCE)
            .map(|(_, target, _)| target)
    });
    FrameSnapshot {
        frame: clock.frame,
        time: clock.now(),
        position: world.player.position.to_array(),
        yaw: world.player.yaw,
        pitch: world.player.pitch,
        room_index: world.rooms.current(),
        room_label: world
            .rooms
            .current_config()
            .map(|config| config.label.to_string()),
        active_subtitle: world.subtitles.active_line().map(str::to_string),
        door_prompt,
        view_overlay: world.rooms.view_overlay_active(),
        pointer_locked: world.lock.is_locked(),
        jailed: world.jailed,
        drunk_intensity: world.drunk.intensity(),
        police_active: world.police.is_active(),
        effect_count: world.effects.len(),
    }
}
