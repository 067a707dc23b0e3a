use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::ext::QuoteExt;
use crate::manifest::{CacheEntry, CipdPackage, TaskManifest};
use crate::occlusion::Checker;
use crate::validation::{Reporter, ValidationContext};

/// Owner recorded for directories claimed by named caches.
pub const CACHE_OWNER: &str = "cache";
/// Owner recorded for directories claimed by CIPD packages.
pub const CIPD_OWNER: &str = "cipd";

pub const MAX_CACHES: usize = 32;
pub const MAX_CACHE_NAME_LENGTH: usize = 4096;

const TEMPLATE_PARAMETERS: [&str; 3] = ["platform", "os", "arch"];

lazy_static! {
    static ref CACHE_NAME_RE: Regex = Regex::new(r"^[a-z0-9_]+$").unwrap();
    static ref PACKAGE_NAME_RE: Regex = Regex::new(r"^([a-z0-9_\-.]+/)*[a-z0-9_\-.]+$").unwrap();
    static ref TEMPLATE_RE: Regex = Regex::new(r"\$\{([^}]*)\}").unwrap();
}

/// Validates every cache and CIPD package of `manifest`, then checks that
/// none of their directories occlude each other. Returns `true` when no error
/// was reported.
pub fn validate_manifest(manifest: &TaskManifest, ctx: &mut ValidationContext) -> bool {
    let errors_before = ctx.error_count();
    let mut checker = Checker::new();

    if manifest.is_empty() {
        ctx.warning("manifest declares no caches or cipd packages".to_string());
    }

    if manifest.caches.len() > MAX_CACHES {
        ctx.error(format!("up to {MAX_CACHES} caches can be specified"));
    }

    let mut cache_names = HashSet::new();
    let mut cache_paths = HashSet::new();
    for (index, cache) in manifest.caches.iter().enumerate() {
        ctx.prefix(format!("cache {index}: "), |ctx| {
            if validate_cache(cache, ctx) {
                checker.add(&cache.path, CACHE_OWNER, cache.name.as_str());
            }
            if !cache_names.insert(cache.name.as_str()) {
                ctx.error("same cache name cannot be specified twice".to_string());
            }
            if !cache_paths.insert(cache.path.as_str()) {
                ctx.error("same cache path cannot be specified twice".to_string());
            }
        });
    }

    let mut installs = HashSet::new();
    for (index, package) in manifest.cipd_packages.iter().enumerate() {
        ctx.prefix(format!("cipd package {index}: "), |ctx| {
            if validate_cipd_package(package, ctx) {
                checker.add(
                    &package.path,
                    CIPD_OWNER,
                    format!("{}:{}", package.package, package.version),
                );
            }
            if !installs.insert((package.package.as_str(), package.path.as_str())) {
                ctx.error(format!(
                    "package {} is specified twice for path {}",
                    package.package.quoted(),
                    package.path.quoted()
                ));
            }
        });
    }

    checker.conflicts(ctx);

    let errors = ctx.error_count() - errors_before;
    info!("Manifest validation finished with {} error(s)", errors);
    errors == 0
}

fn validate_cache(cache: &CacheEntry, ctx: &mut ValidationContext) -> bool {
    let name_ok = validate_cache_name(&cache.name, ctx);
    let path_ok = validate_rel_path(&cache.path, ctx);
    name_ok && path_ok
}

fn validate_cipd_package(package: &CipdPackage, ctx: &mut ValidationContext) -> bool {
    let name_ok = validate_package_name(&package.package, ctx);
    let version_ok = validate_package_version(&package.version, ctx);
    let path_ok = validate_rel_path(&package.path, ctx);
    name_ok && version_ok && path_ok
}

fn validate_cache_name<R: Reporter + ?Sized>(name: &str, ctx: &mut R) -> bool {
    if name.len() > MAX_CACHE_NAME_LENGTH || !CACHE_NAME_RE.is_match(name) {
        ctx.error(format!(
            "name {} does not match {}",
            name.quoted(),
            CACHE_NAME_RE.as_str().quoted()
        ));
        return false;
    }
    true
}

/// Checks a package name after expanding the known `${...}` template
/// parameters.
fn validate_package_name<R: Reporter + ?Sized>(name: &str, ctx: &mut R) -> bool {
    if name.is_empty() {
        ctx.error("package name cannot be empty".to_string());
        return false;
    }

    let mut unknown = Vec::new();
    let expanded = TEMPLATE_RE.replace_all(name, |caps: &Captures| {
        let parameter = &caps[1];
        if TEMPLATE_PARAMETERS.contains(&parameter) {
            "x".to_string()
        } else {
            unknown.push(caps[0].to_string());
            String::new()
        }
    });

    if !unknown.is_empty() {
        for parameter in unknown {
            ctx.error(format!(
                "unknown template parameter {} in package name {}",
                parameter.quoted(),
                name.quoted()
            ));
        }
        return false;
    }
    if !PACKAGE_NAME_RE.is_match(&expanded) {
        ctx.error(format!("invalid package name {}", name.quoted()));
        return false;
    }
    true
}

fn validate_package_version<R: Reporter + ?Sized>(version: &str, ctx: &mut R) -> bool {
    if version.is_empty() {
        ctx.error("version cannot be empty".to_string());
        return false;
    }
    if version.chars().any(char::is_whitespace) {
        ctx.error(format!("invalid version {}", version.quoted()));
        return false;
    }
    true
}

/// Checks that `path` is a normalized, `/`-delimited path relative to the
/// task's working directory.
pub fn validate_rel_path<R: Reporter + ?Sized>(path: &str, ctx: &mut R) -> bool {
    debug!("Validating relative path '{}'", path);
    if path.is_empty() {
        ctx.error("path cannot be empty".to_string());
        return false;
    }
    if path.contains('\\') {
        ctx.error(format!(
            "path {} cannot contain \"\\\". On Windows forward-slashes will be replaced with back-slashes.",
            path.quoted()
        ));
        return false;
    }
    if path.starts_with('/') {
        ctx.error(format!("path {} cannot start with \"/\"", path.quoted()));
        return false;
    }
    if path.split('/').any(|segment| segment == "..") {
        ctx.error(format!("path {} cannot contain \"..\"", path.quoted()));
        return false;
    }
    let normalized = normalize_rel_path(path);
    if normalized != path {
        ctx.error(format!(
            "path {} is not normalized. Normalized is {}",
            path.quoted(),
            normalized.quoted()
        ));
        return false;
    }
    if normalized == "." {
        ctx.error(format!(
            "path {} cannot refer to the working directory itself",
            path.quoted()
        ));
        return false;
    }
    true
}

/// Drops empty and `.` segments; an empty result normalizes to `.`.
fn normalize_rel_path(path: &str) -> String {
    let normalized = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");
    if normalized.is_empty() {
        ".".to_string()
    } else {
        normalized
    }
}
