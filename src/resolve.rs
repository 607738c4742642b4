//! Logical-to-physical path resolution.
//!
//! Resolution is purely structural: validate the id, map the namespace root
//! through the host, join the remainder, append the expected extension, and
//! normalize. No filesystem existence check happens here; the launcher
//! re-validates existence at open time.

use crate::catalog::{LogicalId, PhysicalPath};
use crate::host::HostEnvironment;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Segment characters accepted in a logical id, mirrored by the manifest
/// schema's id pattern.
fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Structurally invalid identifier. Degrades the one entry, never the
    /// snapshot.
    #[error("malformed id '{id}': {detail}")]
    MalformedId { id: String, detail: &'static str },

    /// Identifier outside the requested namespace root.
    #[error("id '{id}' is outside namespace root '{root}'")]
    OutOfScope { id: String, root: String },

    /// The host has no directory mapping for the requested root.
    #[error("no directory mapping for namespace root '{root}'")]
    UnknownRoot { root: String },
}

/// Converts logical identifiers into validated physical paths.
pub struct PathResolver {
    host: Arc<dyn HostEnvironment>,
}

impl PathResolver {
    pub fn new(host: Arc<dyn HostEnvironment>) -> Self {
        Self { host }
    }

    /// Resolve `id` below `root` to a physical path carrying
    /// `expected_extension`.
    ///
    /// Pure over its inputs and the host's namespace-to-directory mapping:
    /// identical calls yield identical results.
    pub fn resolve(
        &self,
        id: &LogicalId,
        root: &LogicalId,
        expected_extension: &str,
    ) -> Result<PhysicalPath, ResolveError> {
        validate_id(id)?;

        let remainder = id
            .remainder_below(root)
            .ok_or_else(|| ResolveError::OutOfScope {
                id: id.as_str().to_string(),
                root: root.as_str().to_string(),
            })?;
        if remainder.is_empty() {
            // The id names the root itself; there is no leaf to open.
            return Err(ResolveError::MalformedId {
                id: id.as_str().to_string(),
                detail: "id equals the namespace root",
            });
        }

        let base = self
            .host
            .namespace_root_to_directory(root)
            .ok_or_else(|| ResolveError::UnknownRoot {
                root: root.as_str().to_string(),
            })?;

        let mut path = base;
        for segment in remainder.split('/') {
            path.push(segment);
        }
        let mut raw = path.into_os_string();
        raw.push(expected_extension);
        Ok(PhysicalPath::new(normalize(Path::new(&raw))))
    }
}

fn validate_id(id: &LogicalId) -> Result<(), ResolveError> {
    let malformed = |detail: &'static str| ResolveError::MalformedId {
        id: id.as_str().to_string(),
        detail,
    };

    let raw = id.as_str();
    if raw.is_empty() {
        return Err(malformed("empty id"));
    }
    if raw.ends_with('/') {
        return Err(malformed("trailing slash"));
    }
    for segment in raw.split('/') {
        if segment.is_empty() {
            return Err(malformed("empty segment"));
        }
        if segment == "." || segment == ".." {
            return Err(malformed("relative segment"));
        }
        if !segment.chars().all(is_segment_char) {
            return Err(malformed("illegal character in segment"));
        }
    }
    Ok(())
}

/// Lexical normalization: drops `.` components and folds `..` into its
/// parent. Never touches the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceType;
    use crate::host::HostRejected;
    use std::collections::BTreeMap;

    struct MappingHost {
        roots: BTreeMap<String, PathBuf>,
    }

    impl MappingHost {
        fn single(root: &str, dir: &str) -> Arc<Self> {
            let mut roots = BTreeMap::new();
            roots.insert(root.to_string(), PathBuf::from(dir));
            Arc::new(Self { roots })
        }
    }

    impl HostEnvironment for MappingHost {
        fn query_resources_by_type(
            &self,
            _kind: &ResourceType,
            _include_derived: bool,
        ) -> Vec<(LogicalId, ResourceType)> {
            Vec::new()
        }

        fn namespace_root_to_directory(&self, root: &LogicalId) -> Option<PathBuf> {
            self.roots
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(root.as_str()))
                .map(|(_, dir)| dir.clone())
        }

        fn path_exists(&self, _path: &Path) -> bool {
            false
        }

        fn open_resource(&self, _path: &Path) -> Result<(), HostRejected> {
            Ok(())
        }
    }

    #[test]
    fn resolves_id_below_root() {
        let resolver = PathResolver::new(MappingHost::single("A", "/proj/A"));
        let resolved = resolver
            .resolve(&LogicalId::new("A/X"), &LogicalId::new("A"), ".map")
            .unwrap();
        assert_eq!(resolved.as_path(), Path::new("/proj/A/X.map"));
    }

    #[test]
    fn out_of_scope_id_is_rejected() {
        let resolver = PathResolver::new(MappingHost::single("A", "/proj/A"));
        let err = resolver
            .resolve(&LogicalId::new("B/Z"), &LogicalId::new("A"), ".map")
            .unwrap_err();
        assert!(matches!(err, ResolveError::OutOfScope { .. }));
    }

    #[test]
    fn resolution_is_deterministic_and_touches_no_filesystem() {
        // The mapped directory does not exist anywhere; resolution must not care.
        let resolver = PathResolver::new(MappingHost::single("Game", "/nonexistent/base"));
        let id = LogicalId::new("Game/Maps/Frontline");
        let root = LogicalId::new("Game");
        let first = resolver.resolve(&id, &root, ".umap").unwrap();
        let second = resolver.resolve(&id, &root, ".umap").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.as_path(),
            Path::new("/nonexistent/base/Maps/Frontline.umap")
        );
    }

    #[test]
    fn base_directory_is_normalized_lexically() {
        let resolver = PathResolver::new(MappingHost::single("A", "/proj/tmp/../A/."));
        let resolved = resolver
            .resolve(&LogicalId::new("A/X"), &LogicalId::new("A"), ".map")
            .unwrap();
        assert_eq!(resolved.as_path(), Path::new("/proj/A/X.map"));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        let resolver = PathResolver::new(MappingHost::single("A", "/proj/A"));
        let root = LogicalId::new("A");
        for (raw, detail) in [
            ("", "empty id"),
            ("A/X/", "trailing slash"),
            ("A//X", "empty segment"),
            ("A/../X", "relative segment"),
            ("A/X|Y", "illegal character in segment"),
            ("A", "id equals the namespace root"),
        ] {
            let err = resolver
                .resolve(&LogicalId::new(raw), &root, ".map")
                .unwrap_err();
            match err {
                ResolveError::MalformedId { detail: got, .. } => assert_eq!(got, detail),
                other => panic!("expected MalformedId for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unmapped_root_is_reported() {
        let resolver = PathResolver::new(MappingHost::single("A", "/proj/A"));
        let err = resolver
            .resolve(&LogicalId::new("B/Z"), &LogicalId::new("B"), ".map")
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownRoot { .. }));
    }
}
