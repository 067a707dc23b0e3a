//! Task manifests: the named caches and CIPD packages a task installs into its
//! working directory, and their validation.

mod task_manifest;
mod validate;

pub use task_manifest::{CacheEntry, CipdPackage, ManifestError, TaskManifest};
pub use validate::{CACHE_OWNER, CIPD_OWNER, validate_manifest, validate_rel_path};
