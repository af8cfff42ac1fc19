//! Contract error types for the settings registry

use super::model::Scope;

/// Settings registry errors
///
/// Unknown keys are never an error: reads return `Value::Null` and writes are
/// ignored.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The backing store for a scope could not be opened
    #[error("settings store for scope {scope} is unavailable: {source}")]
    StoreUnavailable {
        scope: Scope,
        #[source]
        source: anyhow::Error,
    },

    /// A store failed to flush staged writes
    ///
    /// In-memory state has already been committed when this is returned, so
    /// it may be ahead of what is durable.
    #[error("failed to sync settings store for scope {scope}: {source}")]
    Sync {
        scope: Scope,
        #[source]
        source: anyhow::Error,
    },

    /// A typed value could not be converted to a setting value
    #[error("failed to serialize setting value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be read or parsed
    #[error("invalid settings configuration: {message}")]
    Config { message: String },
}

impl SettingsError {
    /// Scope the error relates to, if any
    pub fn scope(&self) -> Option<Scope> {
        match self {
            Self::StoreUnavailable { scope, .. } | Self::Sync { scope, .. } => Some(*scope),
            Self::Serialization(_) | Self::Config { .. } => None,
        }
    }
}
