mod application_impl;
mod report;
mod runtime_config;

pub use application_impl::{Application, ApplicationError};
pub use runtime_config::RuntimeConfig;
