use std::path::PathBuf;

use clap::Parser;

use crate::input::DemoScript;

/// Headless driver for the walkable gallery: runs a scripted demo through
/// the coordination core and dumps JSON logs for inspection and regression
/// tests.
#[derive(Debug, Parser)]
#[command(name = "gallery_engine")]
pub struct EngineArgs {
    /// Scripted input plan to execute.
    #[arg(long, value_enum, default_value = "walkthrough")]
    pub demo: DemoScript,
    /// Simulated frames to run at a fixed 60 Hz step.
    #[arg(long, default_value_t = 900)]
    pub frames: u64,
    /// Room index to start in.
    #[arg(long, default_value_t = 0)]
    pub start_room: usize,
    /// Seed for all randomised cosmetics, making runs reproducible.
    #[arg(long, default_value_t = 7)]
    pub seed: u64,
    /// Write per-frame movement samples to this JSON file.
    #[arg(long)]
    pub movement_log_json: Option<PathBuf>,
    /// Write the audio command stream to this JSON file.
    #[arg(long)]
    pub audio_log_json: Option<PathBuf>,
    /// Write the frame event log to this JSON file.
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,
    /// Write every frame snapshot to this JSON file.
    #[arg(long)]
    pub snapshot_json: Option<PathBuf>,
}
