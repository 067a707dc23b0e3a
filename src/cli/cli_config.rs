use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::cli::LogLevel;

/// Checks that the named caches and CIPD packages of a task manifest do not
/// occlude each other's directories.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// The task manifest to validate
    pub manifest: PathBuf,
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Treat warnings as errors
    #[clap(long)]
    pub strict: bool,

    #[clap(long, default_value = "auto", value_enum)]
    pub color: ColorChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}
