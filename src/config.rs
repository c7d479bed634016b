use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use simplelog::LevelFilter;

use crate::TermInt;

pub const DEFAULT_TICK_MS: u64 = 500;

#[derive(Parser, Debug)]
#[command(name = "snake")]
#[command(version, about = "Snake in the terminal")]
pub struct Config {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Grid height in cells
    #[arg(long, default_value_t = 10)]
    pub height: TermInt,

    /// Grid width in cells
    #[arg(long, default_value_t = 20)]
    pub width: TermInt,

    /// Milliseconds between two game steps
    #[arg(long, default_value_t = DEFAULT_TICK_MS, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Write logs to this file; nothing is logged otherwise
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Play interactively (the default)
    Play,
    /// Print the starting grid and the grid after one step, then exit
    Preview,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
