use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::application::report::print_messages;
use crate::manifest::{ManifestError, TaskManifest, validate_manifest};
use crate::validation::{ValidationContext, ValidationError};

pub struct Application;

impl Application {
    pub async fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        colored::control::set_override(runtime_config.use_color);

        let manifest = TaskManifest::from_path(&runtime_config.manifest)
            .await
            .context(ManifestSnafu)?;
        debug!("Loaded manifest: {:?}", manifest);

        let mut ctx = ValidationContext::new();
        if validate_manifest(&manifest, &mut ctx) {
            info!("Manifest is valid");
        }

        let mut result = ctx.result();
        print_messages(&result.messages);
        if runtime_config.strict {
            result = result.promote_warnings();
        }

        result.into_result().context(ValidationSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the manifest"))]
    ManifestError { source: ManifestError },
    #[snafu(display("The manifest was rejected"))]
    ValidationError { source: ValidationError },
}
