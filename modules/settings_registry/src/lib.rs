//! Settings Registry
//!
//! Scoped application settings with deferred persistence. Settings are
//! declared against a [`SettingRegistry`] with a default value and a
//! [`Scope`]; reads and writes happen in memory, and
//! [`SettingRegistry::commit`] flushes every modified setting to the backing
//! store of its scope in one batch.

// Public exports
pub mod contract;
pub use contract::{AppIdentity, Scope, SettingsError, StoreLocation, Visibility};

pub mod domain;
pub use domain::{
    BoundedSetting, CompositeSetting, Setting, SettingRegistry, SettingState, SettingsGroup,
    SettingsGroupRef, SettingsStore, StandardSetting, StoreProvider,
};

pub mod config;
pub use config::Config;

pub mod infra;

mod macros;
