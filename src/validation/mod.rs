//! Accumulation of validation findings.
//!
//! Validators never fail on the first problem. They report every finding to a
//! [`Reporter`] and the caller decides afterwards whether the accumulated
//! errors are fatal.

mod context;

pub use context::{
    Message, Reporter, Severity, ValidationContext, ValidationError, ValidationResult,
};
