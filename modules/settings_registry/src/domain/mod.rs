//! Domain layer - settings, the registry and the store seam

pub mod registry;
pub mod setting;
pub mod store;
pub mod variants;

pub use registry::SettingRegistry;
pub use setting::{Setting, SettingState, StandardSetting};
pub use store::{SettingsGroup, SettingsGroupRef, SettingsStore, StoreProvider};
pub use variants::{BoundedSetting, CompositeSetting};
