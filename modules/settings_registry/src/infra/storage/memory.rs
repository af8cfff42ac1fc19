//! In-memory store implementations
//!
//! Durable content lives in a shared [`MemoryBackend`], so several store
//! handles (or several registries) observe the same data, the way separate
//! processes would observe the same settings file.

use crate::contract::{AppIdentity, Scope, StoreLocation};
use crate::domain::store::{SettingsStore, StoreProvider};
use anyhow::{bail, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
struct BackendState {
    data: HashMap<StoreLocation, HashMap<String, Value>>,
    open_counts: HashMap<StoreLocation, usize>,
    sync_counts: HashMap<StoreLocation, usize>,
    failing_opens: HashSet<StoreLocation>,
    failing_syncs: HashSet<StoreLocation>,
}

/// Shared durable content of all in-memory stores
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<BackendState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durable entries of the store at `location`
    pub fn entries(&self, location: &StoreLocation) -> HashMap<String, Value> {
        self.state.read().data.get(location).cloned().unwrap_or_default()
    }

    /// Durable value of `key` at `location`
    pub fn durable_value(&self, location: &StoreLocation, key: &str) -> Option<Value> {
        self.state.read().data.get(location)?.get(key).cloned()
    }

    /// Make `value` durable at `location` without going through a store
    pub fn seed(&self, location: &StoreLocation, key: &str, value: Value) {
        self.state
            .write()
            .data
            .entry(location.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Number of stores opened at `location`
    pub fn open_count(&self, location: &StoreLocation) -> usize {
        self.state.read().open_counts.get(location).copied().unwrap_or(0)
    }

    /// Number of successful syncs at `location`
    pub fn sync_count(&self, location: &StoreLocation) -> usize {
        self.state.read().sync_counts.get(location).copied().unwrap_or(0)
    }

    /// Make opening a store at `location` fail (or succeed again)
    pub fn fail_open(&self, location: &StoreLocation, fail: bool) {
        let mut state = self.state.write();
        if fail {
            state.failing_opens.insert(location.clone());
        } else {
            state.failing_opens.remove(location);
        }
    }

    /// Make syncing a store at `location` fail (or succeed again)
    pub fn fail_sync(&self, location: &StoreLocation, fail: bool) {
        let mut state = self.state.write();
        if fail {
            state.failing_syncs.insert(location.clone());
        } else {
            state.failing_syncs.remove(location);
        }
    }

    fn open(&self, location: StoreLocation) -> Result<MemoryStore> {
        let mut state = self.state.write();
        if state.failing_opens.contains(&location) {
            bail!("store at {:?} cannot be opened", location);
        }
        *state.open_counts.entry(location.clone()).or_default() += 1;
        Ok(MemoryStore {
            backend: self.clone(),
            location,
            staged: HashMap::new(),
            cleared: false,
        })
    }
}

/// Store handle staging writes until `sync`
pub struct MemoryStore {
    backend: MemoryBackend,
    location: StoreLocation,
    staged: HashMap<String, Value>,
    /// `clear_all` was called since the last sync
    cleared: bool,
}

impl MemoryStore {
    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Whether writes are waiting for `sync`
    pub fn has_staged_changes(&self) -> bool {
        self.cleared || !self.staged.is_empty()
    }

    /// Standalone store over a private backend, for unit tests
    #[cfg(test)]
    pub(crate) fn scratch() -> Self {
        Self {
            backend: MemoryBackend::new(),
            location: StoreLocation::resolve(Scope::DEFAULT, &AppIdentity::new("Test", "Scratch")),
            staged: HashMap::new(),
            cleared: false,
        }
    }
}

impl SettingsStore for MemoryStore {
    fn read(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.staged.get(key) {
            return Some(value.clone());
        }
        if self.cleared {
            return None;
        }
        self.backend.durable_value(&self.location, key)
    }

    fn write(&mut self, key: &str, value: Value) {
        self.staged.insert(key.to_string(), value);
    }

    fn sync(&mut self) -> Result<()> {
        let mut state = self.backend.state.write();
        if state.failing_syncs.contains(&self.location) {
            bail!("sync of store at {:?} failed", self.location);
        }

        let data = state.data.entry(self.location.clone()).or_default();
        if self.cleared {
            data.clear();
        }
        data.extend(self.staged.drain());
        self.cleared = false;

        *state.sync_counts.entry(self.location.clone()).or_default() += 1;
        Ok(())
    }

    fn clear_all(&mut self) {
        self.staged.clear();
        self.cleared = true;
    }
}

/// Opens in-memory stores for an application identity
#[derive(Clone)]
pub struct MemoryStoreProvider {
    backend: MemoryBackend,
    identity: AppIdentity,
}

impl MemoryStoreProvider {
    pub fn new(backend: MemoryBackend, identity: AppIdentity) -> Self {
        Self { backend, identity }
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    /// Location a scope resolves to
    pub fn location(&self, scope: Scope) -> StoreLocation {
        StoreLocation::resolve(scope, &self.identity)
    }
}

impl StoreProvider for MemoryStoreProvider {
    fn open(&self, scope: Scope) -> Result<Box<dyn SettingsStore>> {
        let store = self.backend.open(self.location(scope))?;
        Ok(Box::new(store))
    }
}
