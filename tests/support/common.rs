#![allow(dead_code)]

use mapshelf::{HostEnvironment, HostRejected, LogicalId, ResourceType};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};

/// Scripted host environment for catalog and launcher guard rails.
///
/// The registry, root mappings, and "filesystem" are all in-memory so tests
/// control every observable the core depends on.
pub struct FakeHost {
    resources: Vec<(LogicalId, ResourceType)>,
    roots: BTreeMap<String, PathBuf>,
    existing: Mutex<BTreeSet<PathBuf>>,
    open_behavior: OpenBehavior,
    pub open_calls: AtomicUsize,
    pub last_query: Mutex<Option<(ResourceType, bool)>>,
}

pub enum OpenBehavior {
    Succeed,
    Reject(String),
    /// First open rendezvouses on `entered`, then blocks on `release`;
    /// later opens succeed immediately. Models a host open still in flight.
    HoldFirst {
        entered: Arc<Barrier>,
        release: Arc<Barrier>,
        used: AtomicBool,
    },
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            roots: BTreeMap::new(),
            existing: Mutex::new(BTreeSet::new()),
            open_behavior: OpenBehavior::Succeed,
            open_calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn with_resource(mut self, id: &str, kind: &str) -> Self {
        self.resources
            .push((LogicalId::new(id), ResourceType::new(kind)));
        self
    }

    pub fn with_root(mut self, root: &str, dir: &str) -> Self {
        self.roots.insert(root.to_string(), PathBuf::from(dir));
        self
    }

    pub fn with_existing(self, path: &str) -> Self {
        self.existing.lock().unwrap().insert(PathBuf::from(path));
        self
    }

    pub fn rejecting_opens(mut self, reason: &str) -> Self {
        self.open_behavior = OpenBehavior::Reject(reason.to_string());
        self
    }

    /// Configure the first open call to block; returns the rendezvous and
    /// release barriers (two parties each: the host and the test).
    pub fn holding_first_open(mut self) -> (Self, Arc<Barrier>, Arc<Barrier>) {
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        self.open_behavior = OpenBehavior::HoldFirst {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
            used: AtomicBool::new(false),
        };
        (self, entered, release)
    }

    /// Delete a path from the fake filesystem, as if the file vanished
    /// between snapshot and launch.
    pub fn remove_existing(&self, path: &Path) {
        self.existing.lock().unwrap().remove(path);
    }
}

impl HostEnvironment for FakeHost {
    fn query_resources_by_type(
        &self,
        kind: &ResourceType,
        include_derived: bool,
    ) -> Vec<(LogicalId, ResourceType)> {
        *self.last_query.lock().unwrap() = Some((kind.clone(), include_derived));
        self.resources
            .iter()
            .filter(|(_, tag)| tag == kind)
            .cloned()
            .collect()
    }

    fn namespace_root_to_directory(&self, root: &LogicalId) -> Option<PathBuf> {
        self.roots
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(root.as_str()))
            .map(|(_, dir)| dir.clone())
    }

    fn path_exists(&self, path: &Path) -> bool {
        self.existing.lock().unwrap().contains(path)
    }

    fn open_resource(&self, _path: &Path) -> Result<(), HostRejected> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        match &self.open_behavior {
            OpenBehavior::Succeed => Ok(()),
            OpenBehavior::Reject(reason) => Err(HostRejected::new(reason)),
            OpenBehavior::HoldFirst {
                entered,
                release,
                used,
            } => {
                if !used.swap(true, Ordering::SeqCst) {
                    entered.wait();
                    release.wait();
                }
                Ok(())
            }
        }
    }
}
