//! Catalog identities and snapshot queries.
//!
//! Types here are the currency between the host registry, the resolver, and
//! the launcher: callers take a `CatalogIndex` snapshot to get display-ready
//! `CatalogEntry` rows and hand a selected row to the launcher.

pub mod identity;
pub mod index;

pub use identity::{LogicalId, PhysicalPath, ResourceType};
pub use index::{CatalogEntry, CatalogIndex, CatalogOptions};
