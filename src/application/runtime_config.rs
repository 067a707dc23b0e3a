use std::path::PathBuf;

use supports_color::Stream;

use crate::cli::{Cli, ColorChoice};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub manifest: PathBuf,
    pub strict: bool,
    pub use_color: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let use_color = match cli.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => supports_color::on(Stream::Stdout).is_some(),
        };
        Self {
            manifest: cli.manifest,
            strict: cli.strict,
            use_color,
        }
    }
}
