//! Settings registry - declared settings, dirty tracking and batched commit

use super::setting::{Setting, StandardSetting};
use super::store::{SettingsStore, StoreProvider};
use crate::contract::{Scope, SettingsError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Scoped application settings with deferred persistence
///
/// Values are read and written by key. Writes stay in memory until
/// [`commit`](Self::commit) flushes every modified setting to the store for
/// its scope, syncing each touched store once. Reads and writes of keys that
/// were never declared are silently ignored.
pub struct SettingRegistry {
    provider: Box<dyn StoreProvider>,
    stores: HashMap<Scope, Box<dyn SettingsStore>>,
    settings: HashMap<String, Box<dyn Setting>>,
    /// Keys whose setting is currently modified
    modified: HashSet<String>,
    was_committed: bool,
}

impl SettingRegistry {
    /// Create an empty registry opening stores through `provider`
    pub fn new(provider: impl StoreProvider + 'static) -> Self {
        Self::with_provider(Box::new(provider))
    }

    pub fn with_provider(provider: Box<dyn StoreProvider>) -> Self {
        Self {
            provider,
            stores: HashMap::new(),
            settings: HashMap::new(),
            modified: HashSet::new(),
            was_committed: false,
        }
    }

    // ===== Declaration =====

    /// Declare a setting persisted under `key` in the store for `scope`
    ///
    /// The persisted value is used if present, otherwise `default`.
    /// Redeclaring a key replaces the previous setting and drops its
    /// uncommitted changes.
    pub fn declare_setting(
        &mut self,
        key: impl Into<String>,
        default: impl Into<Value>,
        scope: Scope,
    ) -> Result<(), SettingsError> {
        let key = key.into();
        let default = default.into();
        let store = open_store(&mut self.stores, self.provider.as_ref(), scope)?;
        let setting = StandardSetting::new(scope, key.clone(), &default, &*store);
        tracing::debug!(key = %key, %scope, value = %setting.value(), "declared setting");
        self.insert(key, Box::new(setting));
        Ok(())
    }

    /// Declare a setting in [`Scope::DEFAULT`]
    pub fn declare_default(
        &mut self,
        key: impl Into<String>,
        default: impl Into<Value>,
    ) -> Result<(), SettingsError> {
        self.declare_setting(key, default, Scope::DEFAULT)
    }

    /// Declare a caller-constructed setting under the lookup key `key`
    ///
    /// `key` only names the setting within this registry; where it persists is
    /// up to the setting's own [`Setting::key`].
    pub fn declare_custom_setting<S>(&mut self, key: impl Into<String>, setting: S) -> Result<(), SettingsError>
    where
        S: Setting + 'static,
    {
        self.declare_boxed_setting(key, Box::new(setting))
    }

    pub fn declare_boxed_setting(
        &mut self,
        key: impl Into<String>,
        mut setting: Box<dyn Setting>,
    ) -> Result<(), SettingsError> {
        let key = key.into();
        let scope = setting.scope();
        let store = open_store(&mut self.stores, self.provider.as_ref(), scope)?;
        setting.initialize(&*store);
        tracing::debug!(key = %key, %scope, store_key = %setting.key(), "declared custom setting");
        self.insert(key, setting);
        Ok(())
    }

    fn insert(&mut self, key: String, setting: Box<dyn Setting>) {
        if setting.is_modified() {
            self.modified.insert(key.clone());
        } else {
            self.modified.remove(&key);
        }
        if self.settings.insert(key.clone(), setting).is_some() {
            tracing::debug!(key = %key, "replaced previously declared setting");
        }
    }

    // ===== Values =====

    /// Current value of `key`, or `Value::Null` if it was never declared
    pub fn value(&self, key: &str) -> Value {
        self.settings
            .get(key)
            .map(|setting| setting.value())
            .unwrap_or(Value::Null)
    }

    /// Current value of `key` converted to `T`
    ///
    /// Falls back to `T::default()` when the value cannot be converted, so
    /// this cannot be used to detect type errors.
    pub fn value_as<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        coerce(self.value(key))
    }

    /// Set the current value of `key`; ignored if `key` was never declared
    pub fn set_value(&mut self, key: &str, value: impl Into<Value>) {
        let Some(setting) = self.settings.get_mut(key) else {
            tracing::trace!(key = %key, "ignoring write to undeclared setting");
            return;
        };

        setting.set_value(value.into());

        if setting.is_modified() {
            self.modified.insert(key.to_string());
        } else {
            self.modified.remove(key);
        }
    }

    /// Serialize `value` and set it as the current value of `key`
    pub fn set_value_from<T>(&mut self, key: &str, value: T) -> Result<(), SettingsError>
    where
        T: Serialize,
    {
        let value = serde_json::to_value(value)?;
        self.set_value(key, value);
        Ok(())
    }

    // ===== State =====

    pub fn is_declared(&self, key: &str) -> bool {
        self.settings.contains_key(key)
    }

    /// Declared keys, sorted
    pub fn declared_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.settings.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Keys with uncommitted changes, sorted
    pub fn modified_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.modified.iter().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn has_uncommitted_changes(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Whether any commit has flushed changes since construction
    ///
    /// A commit counts once at least one of its stores synced successfully.
    pub fn was_committed(&self) -> bool {
        self.was_committed
    }

    // ===== Transactions =====

    /// Write every modified setting to its store and sync the touched stores
    ///
    /// Does nothing, not even store I/O, when there are no changes. Each
    /// touched store is synced once, after all of its settings were written.
    /// If a sync fails the remaining stores are still synced and the first
    /// failure is returned; the settings already count as committed in memory
    /// at that point.
    pub fn commit(&mut self) -> Result<(), SettingsError> {
        if !self.has_uncommitted_changes() {
            return Ok(());
        }

        let pending: Vec<(String, Scope)> = self
            .modified
            .iter()
            .filter_map(|key| self.settings.get(key).map(|s| (key.clone(), store_scope(s.scope()))))
            .collect();
        let scopes: HashSet<Scope> = pending.iter().map(|(_, scope)| *scope).collect();

        // Declaration already opened these unless a setting changed scope since.
        // Open everything up front so a store failure leaves nothing half-committed
        for &scope in &scopes {
            open_store(&mut self.stores, self.provider.as_ref(), scope)?;
        }

        for (key, scope) in &pending {
            if let (Some(setting), Some(store)) = (self.settings.get_mut(key), self.stores.get_mut(scope)) {
                setting.commit(store.as_mut());
            }
        }

        let mut first_error = None;
        let mut synced = 0;
        for &scope in &scopes {
            let Some(store) = self.stores.get_mut(&scope) else {
                continue;
            };
            match store.sync() {
                Ok(()) => synced += 1,
                Err(source) => {
                    tracing::error!(%scope, error = %source, "failed to sync settings store");
                    if first_error.is_none() {
                        first_error = Some(SettingsError::Sync { scope, source });
                    }
                }
            }
        }

        self.modified.clear();
        if synced > 0 {
            self.was_committed = true;
        }
        tracing::info!(settings = pending.len(), scopes = scopes.len(), "committed settings");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Revert every modified setting to its original value
    pub fn discard(&mut self) {
        let count = self.modified.len();
        for key in self.modified.drain() {
            if let Some(setting) = self.settings.get_mut(&key) {
                setting.discard();
            }
        }
        if count > 0 {
            tracing::debug!(settings = count, "discarded uncommitted settings");
        }
    }

    /// Forget every declared setting and erase the content of every opened store
    ///
    /// Unlike [`discard`](Self::discard) this destroys persisted data. Store
    /// handles stay open and are reused by later declarations.
    pub fn clear(&mut self) -> Result<(), SettingsError> {
        self.settings.clear();
        self.modified.clear();

        let mut first_error = None;
        for (&scope, store) in self.stores.iter_mut() {
            store.clear_all();
            if let Err(source) = store.sync() {
                tracing::error!(%scope, error = %source, "failed to sync cleared settings store");
                if first_error.is_none() {
                    first_error = Some(SettingsError::Sync { scope, source });
                }
            }
        }
        tracing::info!(stores = self.stores.len(), "cleared settings");

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Store for `scope`, opened on first use
fn open_store<'s>(
    stores: &'s mut HashMap<Scope, Box<dyn SettingsStore>>,
    provider: &dyn StoreProvider,
    scope: Scope,
) -> Result<&'s mut dyn SettingsStore, SettingsError> {
    let scope = store_scope(scope);
    let store = match stores.entry(scope) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            let store = provider
                .open(scope)
                .map_err(|source| SettingsError::StoreUnavailable { scope, source })?;
            tracing::debug!(%scope, "opened settings store");
            entry.insert(store)
        }
    };
    Ok(&mut **store)
}

/// Scope with bits that do not select a store dropped, so equal stores share a handle
fn store_scope(scope: Scope) -> Scope {
    Scope::from_bits_truncate(scope.bits())
}

/// Convert a setting value, reparsing strings written by text-based stores
fn coerce<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    if let Ok(v) = T::deserialize(&value) {
        return v;
    }
    if let Value::String(text) = &value {
        if let Ok(v) = serde_json::from_str(text) {
            return v;
        }
    }
    T::default()
}
