//! Single-flight launch dispatch.
//!
//! At most one launch is in flight at any instant, even with racing callers:
//! the active-request slot is acquired check-and-set under one lock, and only
//! the holder clears it. Existence is re-validated here rather than trusted
//! from snapshot time, since the filesystem is external mutable state.

use crate::catalog::{CatalogEntry, LogicalId, PhysicalPath};
use crate::host::HostEnvironment;
use crate::resolve::ResolveError;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LaunchError {
    /// The entry carries no resolved physical path; the host is never
    /// contacted.
    #[error("resource '{id}' has no resolved physical path")]
    Unresolvable {
        id: String,
        #[source]
        source: ResolveError,
    },

    /// The physical file is gone (or unreadable) at launch time.
    #[error("resource file not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// Another launch is in flight.
    #[error("another launch is already in flight")]
    Busy,

    /// The host declined the open for host-internal reasons.
    #[error("host rejected open: {reason}")]
    HostRejected { reason: String },
}

/// The single in-flight launch operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Monotonically increasing request token.
    pub token: u64,
    pub id: LogicalId,
}

/// Returned when the host accepted the open call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchReceipt {
    pub token: u64,
    pub id: LogicalId,
    pub path: PhysicalPath,
}

/// Dispatches open operations against the host, one at a time.
pub struct Launcher {
    host: Arc<dyn HostEnvironment>,
    active: Mutex<Option<LaunchRequest>>,
    next_token: AtomicU64,
}

impl Launcher {
    pub fn new(host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            host,
            active: Mutex::new(None),
            next_token: AtomicU64::new(1),
        }
    }

    /// Currently active request, if any.
    pub fn active_request(&self) -> Option<LaunchRequest> {
        self.active.lock().clone()
    }

    /// Validate `entry` and dispatch exactly one host open call.
    ///
    /// Preconditions are checked in order: a resolved path must be present
    /// (`Unresolvable`), the file must exist right now (`NotFound`), and the
    /// single-flight slot must be free (`Busy`). All failures are terminal;
    /// the caller decides whether to issue a fresh launch.
    pub fn launch(&self, entry: &CatalogEntry) -> Result<LaunchReceipt, LaunchError> {
        let path = entry
            .resolved_path
            .as_ref()
            .map_err(|err| LaunchError::Unresolvable {
                id: entry.id.as_str().to_string(),
                source: err.clone(),
            })?
            .clone();

        if !self.host.path_exists(path.as_path()) {
            return Err(LaunchError::NotFound {
                path: path.as_path().to_path_buf(),
            });
        }

        let token = self.acquire(&entry.id)?;
        // Clears the slot on every exit path, including a panicking host.
        let _guard = SlotGuard {
            slot: &self.active,
        };
        self.host
            .open_resource(path.as_path())
            .map_err(|rejection| LaunchError::HostRejected {
                reason: rejection.reason,
            })?;
        Ok(LaunchReceipt {
            token,
            id: entry.id.clone(),
            path,
        })
    }

    fn acquire(&self, id: &LogicalId) -> Result<u64, LaunchError> {
        let mut slot = self.active.lock();
        if slot.is_some() {
            return Err(LaunchError::Busy);
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        *slot = Some(LaunchRequest {
            token,
            id: id.clone(),
        });
        Ok(token)
    }
}

struct SlotGuard<'a> {
    slot: &'a Mutex<Option<LaunchRequest>>,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}
