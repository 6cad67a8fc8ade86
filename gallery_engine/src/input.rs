//! Per-frame input snapshots and the scripted plans the headless driver
//! feeds through them.

use clap::ValueEnum;

/// Everything the simulation consumes in one frame. The headless driver
/// fills this from a script; an interactive host would fill it from real
/// device events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub look_delta_x: f32,
    pub look_delta_y: f32,
    pub navigate_next: bool,
    pub navigate_previous: bool,
    pub interact: bool,
    pub cast_bomb: bool,
    pub cast_mark: bool,
    pub drink_beer: bool,
    pub beam_held: bool,
    pub restart: bool,
    pub request_lock: bool,
    pub release_lock: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoScript {
    /// Walk forward, then step through every room in order.
    Walkthrough,
    /// Drink, get chased, get caught, restart.
    Hazard,
}

impl DemoScript {
    /// The scripted input for `frame`. Plans are pure functions of the frame
    /// number so reruns with the same seed reproduce the same logs.
    pub fn input_for_frame(&self, frame: u64) -> FrameInput {
        match self {
            DemoScript::Walkthrough => walkthrough_frame(frame),
            DemoScript::Hazard => hazard_frame(frame),
        }
    }
}

fn walkthrough_frame(frame: u64) -> FrameInput {
    let mut input = FrameInput {
        request_lock: frame == 0,
        ..FrameInput::default()
    };
    match frame {
        // Settle, then walk into the room.
        5..=90 => input.move_forward = true,
        // Look around once stopped.
        100..=130 => input.look_delta_x = 6.0,
        _ => {}
    }
    // One navigation press per stretch; holding the key must not skip rooms,
    // so each press is a single frame.
    if frame >= 150 && frame % 120 == 30 {
        input.navigate_next = true;
    }
    input
}

fn hazard_frame(frame: u64) -> FrameInput {
    let mut input = FrameInput {
        request_lock: frame == 0,
        ..FrameInput::default()
    };
    match frame {
        20 => input.drink_beer = true,
        // Stagger around while drunk so the chase has something to chase.
        30..=400 => input.move_forward = frame % 40 < 20,
        520 => input.restart = true,
        _ => {}
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkthrough_presses_navigation_in_single_frames() {
        let presses: Vec<u64> = (0..800)
            .filter(|frame| DemoScript::Walkthrough.input_for_frame(*frame).navigate_next)
            .collect();
        assert!(presses.len() >= 5, "enough presses to reach the last room");
        for pair in presses.windows(2) {
            assert!(pair[1] - pair[0] > 1, "presses must not repeat on adjacent frames");
        }
    }

    #[test]
    fn hazard_plan_drinks_once_then_restarts() {
        let drinks = (0..600)
            .filter(|frame| DemoScript::Hazard.input_for_frame(*frame).drink_beer)
            .count();
        assert_eq!(drinks, 1);
        assert!(DemoScript::Hazard.input_for_frame(520).restart);
    }

    #[test]
    fn plans_request_lock_on_first_frame_only() {
        for script in [DemoScript::Walkthrough, DemoScript::Hazard] {
            assert!(script.input_for_frame(0).request_lock);
            assert!(!script.input_for_frame(1).request_lock);
        }
    }
}
