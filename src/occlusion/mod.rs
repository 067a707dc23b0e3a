//! Directory occlusion checking.
//!
//! Owners (named caches, CIPD packages, ...) claim directories of a task's
//! working tree. The claims are stored in a trie keyed by path segment and
//! two kinds of conflicts are detected: several owners claiming the same
//! directory, and a directory nested below a directory of a different owner.

mod checker;
mod node;

pub use checker::Checker;
