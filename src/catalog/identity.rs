//! Identifier newtypes shared by the catalog, resolver, and launcher.
//!
//! `LogicalId` stores whatever the host registry handed back, malformed or
//! not; structural validation belongs to the resolver so that a broken id
//! still shows up in catalog snapshots. `PhysicalPath` has a crate-private
//! constructor: values can only originate in the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Opaque tag identifying a class of resource the catalog can enumerate.
pub struct ResourceType(String);

impl ResourceType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Slash-delimited hierarchical resource identifier.
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive prefix test used for catalog scope filtering.
    ///
    /// ASCII case folding only; the slice is guarded so a prefix ending in
    /// the middle of a multi-byte character simply fails to match.
    pub fn starts_with_ignore_case(&self, prefix: &LogicalId) -> bool {
        self.0
            .get(..prefix.0.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&prefix.0))
    }

    /// Case-insensitive identity comparison.
    pub fn eq_ignore_case(&self, other: &LogicalId) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Leaf component, used as the presentation name.
    pub fn display_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Portion of the id below `root`, with any leading separator stripped.
    ///
    /// `None` when the id does not lie within `root`'s namespace. An empty
    /// remainder means the id names the root itself.
    pub(crate) fn remainder_below(&self, root: &LogicalId) -> Option<&str> {
        if !self.starts_with_ignore_case(root) {
            return None;
        }
        Some(self.0[root.0.len()..].trim_start_matches('/'))
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Absolute, normalized filesystem location produced by the resolver.
pub struct PhysicalPath(PathBuf);

impl PhysicalPath {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for PhysicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_is_case_insensitive() {
        let id = LogicalId::new("Game/Maps/Frontline");
        assert!(id.starts_with_ignore_case(&LogicalId::new("game")));
        assert!(id.starts_with_ignore_case(&LogicalId::new("GAME/maps")));
        assert!(!id.starts_with_ignore_case(&LogicalId::new("Engine")));
    }

    #[test]
    fn prefix_longer_than_id_never_matches() {
        let id = LogicalId::new("Game");
        assert!(!id.starts_with_ignore_case(&LogicalId::new("Game/Maps")));
    }

    #[test]
    fn prefix_inside_multibyte_char_fails_instead_of_panicking() {
        let id = LogicalId::new("Gamé/Maps");
        // A 4-byte prefix ends inside the two-byte 'é'; the guarded slice
        // returns no match rather than panicking.
        assert!(!id.starts_with_ignore_case(&LogicalId::new("GamX")));
        assert!(id.starts_with_ignore_case(&LogicalId::new("Gam")));
    }

    #[test]
    fn display_name_is_leaf_component() {
        assert_eq!(LogicalId::new("Game/Maps/Frontline").display_name(), "Frontline");
        assert_eq!(LogicalId::new("Frontline").display_name(), "Frontline");
    }

    #[test]
    fn remainder_strips_leading_separator() {
        let id = LogicalId::new("Game/Maps/Frontline");
        assert_eq!(
            id.remainder_below(&LogicalId::new("Game")),
            Some("Maps/Frontline")
        );
        assert_eq!(id.remainder_below(&LogicalId::new("game/maps")), Some("Frontline"));
        assert_eq!(id.remainder_below(&LogicalId::new("Game/Maps/Frontline")), Some(""));
        assert_eq!(id.remainder_below(&LogicalId::new("Engine")), None);
    }
}
