//! Contract layer - public types shared by the domain and storage layers
//!
//! This layer contains the scope model and the error type.

pub mod error;
pub mod model;

pub use error::SettingsError;
pub use model::{AppIdentity, Scope, StoreLocation, Visibility};
