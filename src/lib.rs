//! Catalog and launcher for world/map style resources.
//!
//! mapshelf sits between a presentation surface (here, the `mapshelf` CLI)
//! and a host environment owning a resource registry. It answers two calls:
//! `CatalogIndex::snapshot` enumerates resources of a type under a
//! logical-path prefix with each entry's physical location pre-resolved, and
//! `Launcher::launch` re-validates one entry and dispatches a single open to
//! the host under an at-most-one-in-flight guard.

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod host;
pub mod launch;
pub mod manifest;
pub mod resolve;

pub use catalog::{CatalogEntry, CatalogIndex, CatalogOptions, LogicalId, PhysicalPath, ResourceType};
pub use host::{HostEnvironment, HostRejected};
pub use launch::{LaunchError, LaunchReceipt, LaunchRequest, Launcher};
pub use manifest::{
    MANIFEST_FILE_NAME, MANIFEST_SCHEMA_VERSION, ManifestHost, ResourceDecl, ShelfManifest,
    TypeSpec, load_manifest_from_path,
};
pub use resolve::{PathResolver, ResolveError};

/// Environment variable naming the registry manifest (a file, or a directory
/// containing `mapshelf.json`).
pub const ENV_MANIFEST: &str = "MAPSHELF_MANIFEST";

/// Locate the registry manifest for CLI use.
///
/// Order: `MAPSHELF_MANIFEST`, an upward search from the current directory,
/// then the compile-time hint baked in by the build script.
pub fn find_manifest() -> Result<PathBuf> {
    if let Ok(env_path) = env::var(ENV_MANIFEST) {
        if let Some(found) = manifest_from_hint(Path::new(&env_path)) {
            return Ok(found);
        }
    }

    if let Ok(cwd) = env::current_dir() {
        if let Some(found) = search_upwards(&cwd) {
            return Ok(found);
        }
    }

    if let Some(hint) = option_env!("MAPSHELF_MANIFEST_HINT") {
        if let Some(found) = manifest_from_hint(Path::new(hint)) {
            return Ok(found);
        }
    }

    bail!(
        "Unable to locate {MANIFEST_FILE_NAME}. Pass --manifest or set {ENV_MANIFEST} to the registry manifest."
    );
}

fn manifest_from_hint(hint: &Path) -> Option<PathBuf> {
    if hint.as_os_str().is_empty() {
        return None;
    }
    let candidate = if hint.is_dir() {
        hint.join(MANIFEST_FILE_NAME)
    } else {
        hint.to_path_buf()
    };
    if !candidate.is_file() {
        return None;
    }
    fs::canonicalize(candidate).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(MANIFEST_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
