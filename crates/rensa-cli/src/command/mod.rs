use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rensa_engine::SessionConfig;
use tracing_subscriber::EnvFilter;

use crate::util::read_json_file;

use self::{show_config::ShowConfigArg, simulate::SimulateArg};

mod show_config;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Session config JSON file (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Number of colors in play, overriding the config file
    #[arg(long, global = true)]
    colors: Option<u8>,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a headless session with random inputs and print a JSON report
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print the effective session config as JSON
    ShowConfig(#[clap(flatten)] ShowConfigArg),
}

pub fn run() -> anyhow::Result<()> {
    init_tracing();
    let args = CommandArgs::parse();
    let config = load_config(args.config.as_deref(), args.colors)?;
    match args.mode {
        Mode::Simulate(arg) => simulate::run(config, &arg)?,
        Mode::ShowConfig(arg) => show_config::run(&config, &arg)?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, colors: Option<u8>) -> anyhow::Result<SessionConfig> {
    let mut config: SessionConfig = match path {
        Some(path) => read_json_file("config", path)?,
        None => SessionConfig::default(),
    };
    if let Some(colors) = colors {
        config.palette_size = colors;
    }
    config
        .palette()
        .with_context(|| format!("Invalid palette size: {}", config.palette_size))?;
    Ok(config)
}
