//! Host-environment capability boundary.
//!
//! The catalog and launcher are constructed with explicit references to these
//! capabilities instead of reaching for process-global state, so any metadata
//! store (a manifest file, a directory walk, a database) can stand behind the
//! trait. `ManifestHost` in [`crate::manifest`] is the shipped implementation;
//! tests substitute scripted fakes.

use crate::catalog::{LogicalId, ResourceType};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Host-internal refusal to open a resource.
///
/// Carries the host's own reason text (for example "no editable context");
/// the launcher surfaces it verbatim as `LaunchError::HostRejected`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct HostRejected {
    pub reason: String,
}

impl HostRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Capabilities the surrounding application must provide.
pub trait HostEnvironment: Send + Sync {
    /// Enumerate registry entries tagged `kind`, in the registry's own order.
    ///
    /// With `include_derived`, entries whose type is a host-defined
    /// descendant of `kind` are included as well.
    fn query_resources_by_type(
        &self,
        kind: &ResourceType,
        include_derived: bool,
    ) -> Vec<(LogicalId, ResourceType)>;

    /// Physical base directory backing a logical namespace root, if the host
    /// has one registered.
    fn namespace_root_to_directory(&self, root: &LogicalId) -> Option<PathBuf>;

    /// Whether a resolved path currently exists and is readable.
    fn path_exists(&self, path: &Path) -> bool;

    /// Activate the resource at `path`.
    ///
    /// Called at most once per granted launch; the launcher never retries.
    fn open_resource(&self, path: &Path) -> Result<(), HostRejected>;
}
