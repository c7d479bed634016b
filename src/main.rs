mod config;
mod error;
mod game;
mod snake;
mod term;

use std::fs::File;
use std::io;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use simplelog::WriteLogger;

use config::{Command, Config};

pub type TermInt = u16;
pub type Coords = (i32, i32);

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;

    // Quitting and losing both end up here with a clean exit
    match config.command.unwrap_or(Command::Play) {
        Command::Play => game::play(&config),
        Command::Preview => game::preview(&config, &mut io::stdout().lock()),
    }
}

/// The terminal is in raw mode while playing, so logs only ever go to a file.
fn init_logging(config: &Config) -> Result<()> {
    if let Some(path) = &config.log_file {
        let file = File::create(path)
            .with_context(|| format!("Error creating log file {}", path.display()))?;
        WriteLogger::init(config.log_level.into(), simplelog::Config::default(), file)
            .map_err(|e| anyhow!("Error initializing the logger: {}", e))?;
    }

    Ok(())
}
