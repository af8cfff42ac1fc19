//! Ready-made custom settings
//!
//! Both are declared with `SettingRegistry::declare_custom_setting`.

use super::setting::{Setting, SettingState};
use super::store::{SettingsGroup, SettingsGroupRef, SettingsStore};
use crate::contract::Scope;
use serde_json::{Map, Number, Value};

/// Numeric setting clamped to an inclusive range
///
/// Non-numeric values passed to `set_value` are ignored. A persisted value
/// outside the range is clamped on load, which leaves the setting modified so
/// the corrected value is written by the next commit. A NaN bound leaves
/// that side of the range open.
#[derive(Debug, Clone)]
pub struct BoundedSetting {
    scope: Scope,
    key: String,
    default: Value,
    min: f64,
    max: f64,
    state: SettingState,
}

impl BoundedSetting {
    pub fn new(scope: Scope, key: impl Into<String>, default: f64, min: f64, max: f64) -> Self {
        let min = if min.is_nan() { f64::NEG_INFINITY } else { min };
        let max = if max.is_nan() { f64::INFINITY } else { max };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let default = if default.is_nan() { 0.0 } else { default };
        let default = number(default.clamp(min, max), true);
        Self {
            scope,
            key: key.into(),
            state: SettingState::new(default.clone()),
            default,
            min,
            max,
        }
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    fn clamp(&self, value: &Value) -> Option<Value> {
        let x = value.as_f64()?;
        let clamped = x.clamp(self.min, self.max);
        if clamped == x {
            Some(value.clone())
        } else {
            Some(number(clamped, value.is_i64() || value.is_u64()))
        }
    }
}

fn number(x: f64, integral: bool) -> Value {
    if integral && x.fract() == 0.0 && x >= i64::MIN as f64 && x <= i64::MAX as f64 {
        Value::from(x as i64)
    } else {
        Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl Setting for BoundedSetting {
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

    fn initialize(&mut self, store: &dyn SettingsStore) {
        let default = self.default.clone();
        self.state.load(store, &self.key, &default);
        self.state.reset();

        match self.clamp(&self.state.original) {
            Some(clamped) if clamped != self.state.original => {
                tracing::warn!(key = %self.key, value = %self.state.original, "persisted setting out of range, clamping");
                self.state.set_current(clamped);
            }
            Some(_) => {}
            None => {
                tracing::warn!(key = %self.key, value = %self.state.original, "persisted setting is not a number, using default");
                self.state.set_current(default);
            }
        }
    }

    fn set_value(&mut self, value: Value) {
        match self.clamp(&value) {
            Some(clamped) => self.state.set_current(clamped),
            None => tracing::debug!(key = %self.key, %value, "ignoring non-numeric value"),
        }
    }
}

/// Object-valued setting persisted as one sub-key per field
///
/// The fields live under the group named by the setting's key, so a setting
/// `window` with fields `width` and `height` is stored as `window/width` and
/// `window/height`. Undeclared fields are never stored.
#[derive(Debug, Clone)]
pub struct CompositeSetting {
    scope: Scope,
    key: String,
    fields: Vec<(String, Value)>,
    state: SettingState,
}

impl CompositeSetting {
    pub fn new<K, I, F>(scope: Scope, key: K, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (F, Value)>,
        F: Into<String>,
    {
        let fields: Vec<(String, Value)> = fields
            .into_iter()
            .map(|(name, default)| (name.into(), default))
            .collect();
        let defaults: Map<String, Value> = fields.iter().cloned().collect();
        Self {
            scope,
            key: key.into(),
            fields,
            state: SettingState::new(Value::Object(defaults)),
        }
    }

    /// Current value of one field
    pub fn field(&self, name: &str) -> Value {
        self.state.current.get(name).cloned().unwrap_or(Value::Null)
    }
}

impl Setting for CompositeSetting {
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

    fn initialize(&mut self, store: &dyn SettingsStore) {
        let group = SettingsGroupRef::new(store, &self.key);
        let loaded: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, default)| (name.clone(), group.value(name, default)))
            .collect();
        self.state.original = Value::Object(loaded);
        self.state.reset();
    }

    /// Merge the fields of an object into the current value
    ///
    /// Fields missing from `value` keep their current value.
    fn set_value(&mut self, value: Value) {
        let Value::Object(update) = value else {
            tracing::debug!(key = %self.key, "ignoring non-object value");
            return;
        };

        let merged: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, _)| {
                let v = update.get(name).cloned().unwrap_or_else(|| self.field(name));
                (name.clone(), v)
            })
            .collect();
        self.state.set_current(Value::Object(merged));
    }

    fn commit(&mut self, store: &mut dyn SettingsStore) {
        let mut group = SettingsGroup::new(store, &self.key);
        if let Value::Object(current) = &self.state.current {
            for (name, _) in &self.fields {
                if let Some(v) = current.get(name) {
                    group.write(name, v.clone());
                }
            }
        }
        self.state.accept();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_bounded_clamps_set_value() {
        let store = MemoryStore::scratch();
        let mut setting = BoundedSetting::new(Scope::DEFAULT, "volume", 50.0, 0.0, 100.0);
        setting.initialize(&store);
        assert_eq!(setting.value(), json!(50));

        setting.set_value(json!(150));
        assert_eq!(setting.value(), json!(100));
        assert!(setting.is_modified());

        setting.set_value(json!(-0.5));
        assert_eq!(setting.value(), json!(0.0));

        setting.set_value(json!(42));
        assert_eq!(setting.value(), json!(42));
    }

    #[test]
    fn test_bounded_ignores_non_numeric() {
        let store = MemoryStore::scratch();
        let mut setting = BoundedSetting::new(Scope::DEFAULT, "volume", 10.0, 0.0, 20.0);
        setting.initialize(&store);

        setting.set_value(json!("loud"));
        assert_eq!(setting.value(), json!(10));
        assert!(!setting.is_modified());
    }

    #[test]
    fn test_bounded_clamps_persisted_value_on_load() {
        let mut store = MemoryStore::scratch();
        store.write("volume", json!(500));

        let mut setting = BoundedSetting::new(Scope::DEFAULT, "volume", 10.0, 0.0, 100.0);
        setting.initialize(&store);

        assert_eq!(setting.state().original, json!(500));
        assert_eq!(setting.value(), json!(100));
        assert!(setting.is_modified());

        setting.commit(&mut store);
        assert_eq!(store.read("volume"), Some(json!(100)));
    }

    #[test]
    fn test_bounded_swaps_inverted_range() {
        let setting = BoundedSetting::new(Scope::DEFAULT, "x", 5.0, 10.0, 0.0);
        assert_eq!(setting.range(), (0.0, 10.0));
    }

    #[test]
    fn test_bounded_nan_bounds_are_open() {
        let mut store = MemoryStore::scratch();
        store.write("v", json!(-40));

        let mut setting = BoundedSetting::new(Scope::DEFAULT, "v", 5.0, f64::NAN, 10.0);
        assert_eq!(setting.range(), (f64::NEG_INFINITY, 10.0));
        setting.initialize(&store);
        assert_eq!(setting.value(), json!(-40));

        setting.set_value(json!(25));
        assert_eq!(setting.value(), json!(10));

        let both = BoundedSetting::new(Scope::DEFAULT, "w", f64::NAN, f64::NAN, f64::NAN);
        assert_eq!(both.range(), (f64::NEG_INFINITY, f64::INFINITY));
        assert_eq!(both.value(), json!(0));
    }

    #[test]
    fn test_composite_loads_fields_from_group() {
        let mut store = MemoryStore::scratch();
        store.write("window/width", json!(1024));

        let mut setting = CompositeSetting::new(
            Scope::DEFAULT,
            "window",
            [("width", json!(800)), ("height", json!(600))],
        );
        setting.initialize(&store);

        assert_eq!(setting.field("width"), json!(1024));
        assert_eq!(setting.field("height"), json!(600));
        assert!(!setting.is_modified());
    }

    #[test]
    fn test_composite_merges_and_commits_fields() {
        let mut store = MemoryStore::scratch();
        let mut setting = CompositeSetting::new(
            Scope::DEFAULT,
            "window",
            [("width", json!(800)), ("height", json!(600))],
        );
        setting.initialize(&store);

        setting.set_value(json!({"height": 700, "depth": 3}));
        assert_eq!(setting.value(), json!({"width": 800, "height": 700}));
        assert!(setting.is_modified());

        setting.commit(&mut store);
        assert_eq!(store.read("window/width"), Some(json!(800)));
        assert_eq!(store.read("window/height"), Some(json!(700)));
        assert_eq!(store.read("window/depth"), None);
        assert!(!setting.is_modified());
    }
}
