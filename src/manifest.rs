//! Registry manifest loading and the manifest-backed host environment.
//!
//! The manifest (`mapshelf.json`) is the concrete registry standing behind
//! [`HostEnvironment`]: namespace roots mapped to directories, a resource
//! type table with optional parent links, the resource list itself, and an
//! optional opener command. Loading is intentionally strict — the document
//! is checked against an embedded JSON Schema and then cross-validated so
//! catalog queries never operate on dangling type or root references.

use crate::catalog::{LogicalId, ResourceType};
use crate::host::{HostEnvironment, HostRejected};
use anyhow::{Context, Result, bail};
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Version marker expected in `schema_version`.
pub const MANIFEST_SCHEMA_VERSION: &str = "shelf_manifest_v1";

/// File name probed by the upward manifest search.
pub const MANIFEST_FILE_NAME: &str = "mapshelf.json";

const MANIFEST_SCHEMA: &str = include_str!("../schema/shelf_manifest.schema.json");

#[derive(Clone, Debug, Deserialize)]
/// On-disk registry document.
pub struct ShelfManifest {
    pub schema_version: String,
    /// Logical namespace roots mapped to absolute base directories.
    pub roots: BTreeMap<String, PathBuf>,
    /// Resource type table; `parent` links express host-defined derivation.
    pub types: BTreeMap<String, TypeSpec>,
    /// Argv prefix spawned to activate a resource; the physical path is
    /// appended. Empty means this host cannot open anything.
    #[serde(default)]
    pub opener: Vec<String>,
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeSpec {
    /// Expected on-disk extension, with the leading dot.
    pub extension: String,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ResourceDecl {
    pub id: LogicalId,
    #[serde(rename = "type")]
    pub kind: ResourceType,
}

/// Parse and validate a registry manifest from disk.
pub fn load_manifest_from_path(path: &Path) -> Result<ShelfManifest> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    let value: Value = serde_json::from_str(&data)
        .with_context(|| format!("parsing manifest {}", path.display()))?;
    validate_against_schema(&value)
        .with_context(|| format!("manifest {} failed schema validation", path.display()))?;
    let manifest: ShelfManifest = serde_json::from_value(value)
        .with_context(|| format!("deserializing manifest {}", path.display()))?;
    validate_manifest(&manifest)?;
    Ok(manifest)
}

fn schema_document() -> Result<&'static Value> {
    static DOC: OnceLock<Value> = OnceLock::new();
    if let Some(doc) = DOC.get() {
        return Ok(doc);
    }
    let parsed: Value =
        serde_json::from_str(MANIFEST_SCHEMA).context("parsing embedded manifest schema")?;
    Ok(DOC.get_or_init(|| parsed))
}

fn validate_against_schema(value: &Value) -> Result<()> {
    let compiled = JSONSchema::compile(schema_document()?)
        .context("compiling embedded manifest schema")?;
    if let Err(errors) = compiled.validate(value) {
        let details = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
        bail!("{details}");
    }
    Ok(())
}

fn validate_manifest(manifest: &ShelfManifest) -> Result<()> {
    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        bail!(
            "unsupported manifest schema version '{}', expected {}",
            manifest.schema_version,
            MANIFEST_SCHEMA_VERSION
        );
    }

    for (root, dir) in &manifest.roots {
        if !dir.is_absolute() {
            bail!(
                "root '{}' must map to an absolute directory, got {}",
                root,
                dir.display()
            );
        }
    }

    for (tag, spec) in &manifest.types {
        if !spec.extension.starts_with('.') || spec.extension.len() < 2 {
            bail!(
                "type '{}' extension must start with a dot, got '{}'",
                tag,
                spec.extension
            );
        }
        let mut hops = 0usize;
        let mut current = spec.parent.as_deref();
        while let Some(parent) = current {
            let Some(parent_spec) = manifest.types.get(parent) else {
                bail!("type '{tag}' references unknown parent '{parent}'");
            };
            hops += 1;
            if hops > manifest.types.len() {
                bail!("type '{tag}' has a cyclic parent chain");
            }
            current = parent_spec.parent.as_deref();
        }
    }

    let mut seen_ids: BTreeSet<String> = BTreeSet::new();
    for resource in &manifest.resources {
        if !manifest.types.contains_key(resource.kind.as_str()) {
            bail!(
                "resource '{}' references unknown type '{}'",
                resource.id,
                resource.kind
            );
        }
        if !seen_ids.insert(resource.id.as_str().to_ascii_lowercase()) {
            bail!("duplicate resource id '{}'", resource.id);
        }
    }
    Ok(())
}

/// Host environment backed by a validated [`ShelfManifest`].
pub struct ManifestHost {
    manifest: ShelfManifest,
}

impl ManifestHost {
    /// Wrap an already-validated manifest.
    pub fn new(manifest: ShelfManifest) -> Self {
        Self { manifest }
    }

    /// Load, validate, and wrap the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(load_manifest_from_path(path)?))
    }

    pub fn manifest(&self) -> &ShelfManifest {
        &self.manifest
    }

    /// Expected on-disk extension declared for `kind`, if the type exists.
    pub fn extension_for(&self, kind: &ResourceType) -> Option<&str> {
        self.manifest
            .types
            .get(kind.as_str())
            .map(|spec| spec.extension.as_str())
    }

    fn derives_from(&self, tag: &str, ancestor: &str) -> bool {
        let mut hops = 0usize;
        let mut current = self
            .manifest
            .types
            .get(tag)
            .and_then(|spec| spec.parent.as_deref());
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.manifest.types.len() {
                return false;
            }
            current = self
                .manifest
                .types
                .get(parent)
                .and_then(|spec| spec.parent.as_deref());
        }
        false
    }
}

impl HostEnvironment for ManifestHost {
    fn query_resources_by_type(
        &self,
        kind: &ResourceType,
        include_derived: bool,
    ) -> Vec<(LogicalId, ResourceType)> {
        self.manifest
            .resources
            .iter()
            .filter(|resource| {
                resource.kind == *kind
                    || (include_derived && self.derives_from(resource.kind.as_str(), kind.as_str()))
            })
            .map(|resource| (resource.id.clone(), resource.kind.clone()))
            .collect()
    }

    fn namespace_root_to_directory(&self, root: &LogicalId) -> Option<PathBuf> {
        self.manifest
            .roots
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(root.as_str()))
            .map(|(_, dir)| dir.clone())
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn open_resource(&self, path: &Path) -> Result<(), HostRejected> {
        let Some((program, args)) = self.manifest.opener.split_first() else {
            return Err(HostRejected::new(
                "no opener configured; this host cannot activate resources",
            ));
        };
        match Command::new(program).args(args).arg(path).status() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(HostRejected::new(format!("opener exited with {status}"))),
            Err(err) => Err(HostRejected::new(format!(
                "failed to spawn opener '{program}': {err}"
            ))),
        }
    }
}
