use anyhow::Result;
use clap::Parser;

mod assets;
mod audio;
mod cli;
mod collision;
mod config;
mod effects;
mod hazards;
mod input;
mod player;
mod rooms;
mod runtime;
mod scheduler;
mod snapshot;
mod subtitles;
mod targeting;
mod wand;
mod world;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::EngineArgs::parse();
    runtime::execute(&args)
}
