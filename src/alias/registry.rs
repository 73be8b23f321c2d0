use super::types::{AliasAction, AliasMetadata, AliasSnapshot, Resolution};
use crate::error::SearchError;
use crate::query::types::Query;

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Copy-on-write registry of index and alias names.
///
/// The read lock is only held long enough to clone the current `Arc`; writers
/// serialize on `write_lock`, build the next snapshot off to the side and swap it in.
pub struct AliasRegistry {
    current: RwLock<Arc<AliasSnapshot>>,
    write_lock: Mutex<()>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(AliasSnapshot::default())),
            write_lock: Mutex::new(()),
        }
    }

    /// The current snapshot. Stays valid and unchanged however the registry moves on.
    pub fn snapshot(&self) -> Arc<AliasSnapshot> {
        self.current.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    pub fn resolve(&self, name: &str) -> Result<Vec<Resolution>, SearchError> {
        self.snapshot().resolve(name)
    }

    pub fn create_alias(
        &self,
        index: &str,
        alias: &str,
        filter: Option<Query>,
    ) -> Result<u64, SearchError> {
        self.apply(&[AliasAction::add(index, alias, filter)])
    }

    pub fn remove_alias(&self, alias: &str) -> Result<u64, SearchError> {
        self.apply(&[AliasAction::remove("", alias)])
    }

    /// Applies `actions` in order as one atomic change; either all land or none.
    pub fn apply(&self, actions: &[AliasAction]) -> Result<u64, SearchError> {
        self.mutate(|next| {
            for action in actions {
                next.apply(action)?;
            }
            Ok(())
        })
        .inspect(|version| {
            tracing::info!("Applied {} alias actions (version {})", actions.len(), version);
        })
    }

    pub fn aliases_of(&self, index: &str) -> Vec<AliasMetadata> {
        self.snapshot().aliases_of(index)
    }

    /// Makes an index name resolvable.
    pub fn register_index(&self, index: &str) -> Result<u64, SearchError> {
        self.mutate(|next| {
            if next.aliases.contains_key(index) {
                return Err(SearchError::NameConflict {
                    name: index.to_string(),
                    existing: "alias".to_string(),
                });
            }
            if !next.indices.insert(index.to_string()) {
                return Err(SearchError::IndexAlreadyExists(index.to_string()));
            }
            Ok(())
        })
    }

    /// Forgets an index together with every alias pointing at it.
    pub fn unregister_index(&self, index: &str) -> Result<u64, SearchError> {
        self.mutate(|next| {
            if !next.indices.remove(index) {
                return Err(SearchError::IndexMissing(index.to_string()));
            }
            next.aliases.retain(|_, alias| alias.index != index);
            Ok(())
        })
    }

    fn mutate<F>(&self, change: F) -> Result<u64, SearchError>
    where
        F: FnOnce(&mut AliasSnapshot) -> Result<(), SearchError>,
    {
        let _writer = self.write_lock.lock();
        let mut next = (*self.snapshot()).clone();
        change(&mut next)?;
        next.version += 1;
        let version = next.version;
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(next));
        // Freed outside the lock
        drop(previous);
        Ok(version)
    }
}

impl Default for AliasRegistry {
    fn default() -> Self {
        Self::new()
    }
}
