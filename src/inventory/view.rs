//! Read-only facade over a loaded inventory snapshot
//!
//! Holds the one snapshot loaded at construction time and exposes only the
//! lookup and iteration operations callers actually need. Refresh policy
//! belongs entirely to the cache; the facade never triggers one.

use crate::error::Result;
use crate::fetch::Metadata;
use crate::inventory::{Instance, InstanceCache, InstanceId, Snapshot};
use crate::provider::ProviderCli;

/// Map-like read access over one inventory snapshot
pub struct Inventory {
    snapshot: Snapshot,
}

impl Inventory {
    /// Load the snapshot through the cache once; it is never re-read for the
    /// lifetime of this value.
    pub async fn load<M: Metadata, P: ProviderCli>(cache: &InstanceCache<M, P>) -> Result<Self> {
        Ok(Self {
            snapshot: cache.load().await?,
        })
    }

    #[allow(dead_code)]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Lookup by instance id
    pub fn get(&self, instance_id: &str) -> Option<&Instance> {
        self.snapshot.get(instance_id)
    }

    #[allow(dead_code)]
    pub fn contains(&self, instance_id: &str) -> bool {
        self.snapshot.contains_key(instance_id)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InstanceId, &Instance)> {
        self.snapshot.iter()
    }

    #[allow(dead_code)]
    pub fn ids(&self) -> impl Iterator<Item = &InstanceId> {
        self.snapshot.keys()
    }

    /// The underlying snapshot, for whole-inventory serialization
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}
