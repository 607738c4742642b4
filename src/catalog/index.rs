//! Snapshot queries over the host registry.
//!
//! A snapshot is a complete view: resources whose path resolution failed are
//! still emitted, marked non-launchable, so a stale file and a registry gap
//! stay distinguishable. Ordering follows the registry's own enumeration
//! order; any further sorting is the presentation layer's job.

use crate::catalog::{LogicalId, PhysicalPath, ResourceType};
use crate::host::HostEnvironment;
use crate::resolve::{PathResolver, ResolveError};
use std::sync::Arc;

/// Construction-time knobs for a catalog index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Also include resources whose type is a host-defined descendant of the
    /// queried type.
    pub include_derived: bool,
    /// Expected on-disk extension for entries this index emits, including
    /// the leading dot.
    pub extension: String,
}

impl CatalogOptions {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            include_derived: true,
            extension: extension.into(),
        }
    }

    pub fn exact_type(mut self) -> Self {
        self.include_derived = false;
        self
    }
}

/// One catalog row, immutable once produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: LogicalId,
    /// Leaf component of `id`, for presentation.
    pub display_name: String,
    /// Resolution outcome; the error side keeps the entry listed but
    /// non-launchable.
    pub resolved_path: Result<PhysicalPath, ResolveError>,
}

impl CatalogEntry {
    pub fn is_launchable(&self) -> bool {
        self.resolved_path.is_ok()
    }
}

/// Filtered, resolution-annotated view of the host registry.
pub struct CatalogIndex {
    host: Arc<dyn HostEnvironment>,
    resolver: PathResolver,
    options: CatalogOptions,
}

impl CatalogIndex {
    pub fn new(host: Arc<dyn HostEnvironment>, options: CatalogOptions) -> Self {
        let resolver = PathResolver::new(Arc::clone(&host));
        Self {
            host,
            resolver,
            options,
        }
    }

    /// All `kind` resources under `prefix`, in registry order.
    ///
    /// Zero matches is an ordinary empty snapshot, not an error. Resources
    /// outside `prefix` are silently excluded.
    pub fn snapshot(&self, kind: &ResourceType, prefix: &LogicalId) -> Vec<CatalogEntry> {
        self.host
            .query_resources_by_type(kind, self.options.include_derived)
            .into_iter()
            .filter(|(id, _)| id.starts_with_ignore_case(prefix))
            .map(|(id, _)| {
                let resolved_path = self.resolver.resolve(&id, prefix, &self.options.extension);
                let display_name = id.display_name().to_string();
                CatalogEntry {
                    id,
                    display_name,
                    resolved_path,
                }
            })
            .collect()
    }
}
