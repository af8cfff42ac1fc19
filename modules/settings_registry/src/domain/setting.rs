//! Setting entity - a scoped value with original/current history

use super::store::SettingsStore;
use crate::contract::Scope;
use serde_json::Value;

/// Two-slot value history shared by all setting implementations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingState {
    /// Value as last loaded from or committed to the store
    pub original: Value,
    /// In-memory working value
    pub current: Value,
    modified: bool,
}

impl SettingState {
    /// State whose original value is already known
    pub fn new(original: Value) -> Self {
        Self {
            current: original.clone(),
            original,
            modified: false,
        }
    }

    /// Establish the original value from `store`, falling back to `default`
    pub fn load(&mut self, store: &dyn SettingsStore, key: &str, default: &Value) {
        self.original = store.value(key, default);
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Set the working value and recompute the modified flag
    pub fn set_current(&mut self, value: Value) {
        self.current = value;
        self.modified = self.current != self.original;
    }

    /// Reset the working value to the original
    pub fn reset(&mut self) {
        self.current = self.original.clone();
        self.modified = false;
    }

    /// Accept the working value as the new original
    pub fn accept(&mut self) {
        self.original = self.current.clone();
        self.modified = false;
    }
}

/// A setting managed by a [`SettingRegistry`](super::SettingRegistry)
///
/// Implementors only have to provide the scope, the persistence key and
/// access to their [`SettingState`]. Every other step has a default that may
/// be overridden, e.g. to coerce or validate values, or to persist several
/// sub-keys.
pub trait Setting {
    /// Scope this setting persists under
    fn scope(&self) -> Scope;

    /// Persistence key in the scope's store
    fn key(&self) -> &str;

    fn state(&self) -> &SettingState;

    fn state_mut(&mut self) -> &mut SettingState;

    /// Called once by the registry after the original value is established
    fn initialize(&mut self, _store: &dyn SettingsStore) {
        self.state_mut().reset();
    }

    fn value(&self) -> Value {
        self.state().current.clone()
    }

    fn set_value(&mut self, value: Value) {
        self.state_mut().set_current(value);
    }

    fn is_modified(&self) -> bool {
        self.state().is_modified()
    }

    /// Write the working value to `store` and make it the original
    fn commit(&mut self, store: &mut dyn SettingsStore) {
        let value = self.state().current.clone();
        store.write(self.key(), value);
        self.state_mut().accept();
    }

    /// Revert to the original value without touching any store
    fn discard(&mut self) {
        self.state_mut().reset();
    }
}

/// Setting created by `SettingRegistry::declare_setting`
#[derive(Debug, Clone)]
pub struct StandardSetting {
    scope: Scope,
    key: String,
    state: SettingState,
}

impl StandardSetting {
    /// Load `key` from `store`, falling back to `default`
    pub fn new(scope: Scope, key: impl Into<String>, default: &Value, store: &dyn SettingsStore) -> Self {
        let key = key.into();
        let mut setting = Self {
            scope,
            state: SettingState::new(store.value(&key, default)),
            key,
        };
        setting.initialize(store);
        setting
    }
}

impl Setting for StandardSetting {
    fn scope(&self) -> Scope {
        self.scope
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn state(&self) -> &SettingState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SettingState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_standard_setting_uses_default_when_absent() {
        let store = MemoryStore::scratch();
        let setting = StandardSetting::new(Scope::DEFAULT, "x", &json!(5), &store);

        assert_eq!(setting.value(), json!(5));
        assert_eq!(setting.state().original, json!(5));
        assert!(!setting.is_modified());
    }

    #[test]
    fn test_standard_setting_prefers_persisted_value() {
        let mut store = MemoryStore::scratch();
        store.write("x", json!(7));

        let setting = StandardSetting::new(Scope::DEFAULT, "x", &json!(5), &store);
        assert_eq!(setting.value(), json!(7));
    }

    #[test]
    fn test_set_value_tracks_modification() {
        let store = MemoryStore::scratch();
        let mut setting = StandardSetting::new(Scope::USER, "x", &json!("a"), &store);

        setting.set_value(json!("b"));
        assert!(setting.is_modified());

        // Setting back to the original clears the flag
        setting.set_value(json!("a"));
        assert!(!setting.is_modified());
    }

    #[test]
    fn test_commit_writes_and_accepts() {
        let mut store = MemoryStore::scratch();
        let mut setting = StandardSetting::new(Scope::DEFAULT, "x", &json!(1), &store);

        setting.set_value(json!(2));
        setting.commit(&mut store);

        assert_eq!(store.read("x"), Some(json!(2)));
        assert_eq!(setting.state().original, json!(2));
        assert!(!setting.is_modified());
    }

    #[test]
    fn test_discard_restores_original() {
        let mut store = MemoryStore::scratch();
        let mut setting = StandardSetting::new(Scope::DEFAULT, "x", &json!([1, 2]), &store);

        setting.set_value(json!([3]));
        setting.discard();

        assert_eq!(setting.value(), json!([1, 2]));
        assert!(!setting.is_modified());
        assert_eq!(store.read("x"), None);

        store.write("x", json!("untouched"));
        setting.discard();
        assert_eq!(store.read("x"), Some(json!("untouched")));
    }
}
