//! Executes a scripted demo headlessly and writes the JSON artifacts.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use serde::Serialize;

use crate::cli::EngineArgs;
use crate::scheduler::{advance_frame, FrameClock};
use crate::snapshot::RecordingRenderSink;
use crate::world::World;

const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Serialize)]
struct MovementSample {
    frame: u64,
    position: [f32; 3],
    yaw: f32,
    room_index: Option<usize>,
}

pub fn execute(args: &EngineArgs) -> Result<()> {
    let mut world = World::new(args.seed).context("building the gallery world")?;
    let mut clock = FrameClock::new(FRAME_DT);

    if !world.enter_room(args.start_room, clock.now()) {
        bail!(
            "start room {} out of range (gallery has {} rooms)",
            args.start_room,
            world.rooms.len()
        );
    }

    let sink = RecordingRenderSink::new();
    for _ in 0..args.frames {
        let input = args.demo.input_for_frame(clock.frame);
        advance_frame(&mut world, &input, &clock, &sink);
        clock.advance();
    }

    let frames = sink.frames();
    info!(
        "ran {} frames; finished in room {:?} with {} logged events",
        frames.len(),
        world.rooms.current(),
        world.events.len()
    );

    if let Some(path) = &args.movement_log_json {
        let samples: Vec<MovementSample> = frames
            .iter()
            .map(|snapshot| MovementSample {
                frame: snapshot.frame,
                position: snapshot.position,
                yaw: snapshot.yaw,
                room_index: snapshot.room_index,
            })
            .collect();
        write_json(path, &samples, "movement log")?;
    }
    if let Some(path) = &args.audio_log_json {
        write_json(path, &world.audio_events(), "audio log")?;
    }
    if let Some(path) = &args.event_log_json {
        write_json(path, &world.events, "event log")?;
    }
    if let Some(path) = &args.snapshot_json {
        write_json(path, &frames, "frame snapshots")?;
    }

    println!(
        "Simulated {} frames ({} demo); final room {}",
        args.frames,
        match args.demo {
            crate::input::DemoScript::Walkthrough => "walkthrough",
            crate::input::DemoScript::Hazard => "hazard",
        },
        world
            .rooms
            .current_config()
            .map(|config| config.id)
            .unwrap_or("none")
    );
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T, label: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serializing {label}"))?;
    fs::write(path, json).with_context(|| format!("writing {label} to {}", path.display()))?;
    println!("Saved {label} to {}", path.display());
    Ok(())
}
