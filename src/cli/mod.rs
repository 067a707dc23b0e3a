mod cli_config;
mod log_level;

pub use cli_config::{Cli, ColorChoice};
pub use log_level::LogLevel;
