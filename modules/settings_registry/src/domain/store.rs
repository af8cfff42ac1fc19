//! Store traits for settings persistence
//!
//! These traits define the interface to the per-scope backing stores.
//! Implementations are in infra/storage.

use crate::contract::Scope;
use anyhow::Result;
use serde_json::Value;

/// Persistent key-value store backing one scope
pub trait SettingsStore {
    /// Persisted value for `key`, if any
    fn read(&self, key: &str) -> Option<Value>;

    /// Persisted value for `key`, or `default` if absent
    fn value(&self, key: &str, default: &Value) -> Value {
        self.read(key).unwrap_or_else(|| default.clone())
    }

    /// Stage a value for `key`; it may be buffered until `sync`
    fn write(&mut self, key: &str, value: Value);

    /// Flush staged writes to durable storage
    fn sync(&mut self) -> Result<()>;

    /// Erase every entry of this store
    fn clear_all(&mut self);
}

/// Opens the backing store for a scope
pub trait StoreProvider {
    /// Open the store selected by `scope`
    ///
    /// Called at most once per distinct scope value by a registry.
    fn open(&self, scope: Scope) -> Result<Box<dyn SettingsStore>>;
}

/// Key-prefixed view over a store
///
/// Every key is resolved under `group/`. Groups nest, and the prefix ends when
/// the view is dropped.
pub struct SettingsGroup<'a> {
    store: &'a mut dyn SettingsStore,
    prefix: String,
}

impl<'a> SettingsGroup<'a> {
    pub fn new(store: &'a mut dyn SettingsStore, group: &str) -> Self {
        Self {
            store,
            prefix: join_key(None, group),
        }
    }

    /// Nested group below this one
    pub fn group(&mut self, name: &str) -> SettingsGroup<'_> {
        SettingsGroup {
            prefix: join_key(Some(&self.prefix), name),
            store: &mut *self.store,
        }
    }

    /// Full store key for `key` within this group
    pub fn key(&self, key: &str) -> String {
        join_key(Some(&self.prefix), key)
    }

    pub fn read(&self, key: &str) -> Option<Value> {
        self.store.read(&self.key(key))
    }

    pub fn value(&self, key: &str, default: &Value) -> Value {
        self.store.value(&self.key(key), default)
    }

    pub fn write(&mut self, key: &str, value: Value) {
        let key = self.key(key);
        self.store.write(&key, value);
    }
}

/// Read-only key-prefixed view, for loading during `Setting::initialize`
pub struct SettingsGroupRef<'a> {
    store: &'a dyn SettingsStore,
    prefix: String,
}

impl<'a> SettingsGroupRef<'a> {
    pub fn new(store: &'a dyn SettingsStore, group: &str) -> Self {
        Self {
            store,
            prefix: join_key(None, group),
        }
    }

    pub fn group(&self, name: &str) -> SettingsGroupRef<'a> {
        SettingsGroupRef {
            store: self.store,
            prefix: join_key(Some(&self.prefix), name),
        }
    }

    pub fn key(&self, key: &str) -> String {
        join_key(Some(&self.prefix), key)
    }

    pub fn read(&self, key: &str) -> Option<Value> {
        self.store.read(&self.key(key))
    }

    pub fn value(&self, key: &str, default: &Value) -> Value {
        self.store.value(&self.key(key), default)
    }
}

fn join_key(prefix: Option<&str>, key: &str) -> String {
    let key = key.trim_matches('/');
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}/{}", prefix, key),
        _ => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_value_falls_back_to_default() {
        let mut store = MemoryStore::scratch();
        assert_eq!(store.value("missing", &json!(3)), json!(3));

        store.write("present", json!("x"));
        assert_eq!(store.value("present", &json!(3)), json!("x"));
    }

    #[test]
    fn test_group_prefixes_keys() {
        let mut store = MemoryStore::scratch();
        {
            let mut group = SettingsGroup::new(&mut store, "window");
            group.write("width", json!(800));
            group.group("dock").write("visible", json!(true));
            assert_eq!(group.read("width"), Some(json!(800)));
        }

        assert_eq!(store.read("window/width"), Some(json!(800)));
        assert_eq!(store.read("window/dock/visible"), Some(json!(true)));
        assert_eq!(store.read("width"), None);
    }

    #[test]
    fn test_group_ref_reads_nested() {
        let mut store = MemoryStore::scratch();
        store.write("a/b/c", json!(1));

        let group = SettingsGroupRef::new(&store, "/a/");
        assert_eq!(group.key("b"), "a/b");
        assert_eq!(group.group("b").value("c", &Value::Null), json!(1));
        assert_eq!(group.value("missing", &json!(false)), json!(false));
    }
}
