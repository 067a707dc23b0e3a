//! Validation of the directories a task claims in its working tree.
//!
//! Named caches and CIPD packages are mounted or installed into
//! subdirectories of a task's working directory. [`occlusion::Checker`]
//! rejects layouts where two owners claim the same directory or where one
//! owner's directory lies inside another's, and [`manifest`] wires it up
//! with the remaining per-entry checks.

pub mod application;
pub mod cli;
pub mod manifest;
pub mod occlusion;
pub mod validation;

mod ext;
