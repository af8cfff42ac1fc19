//! Configuration for the settings registry

use crate::contract::{AppIdentity, SettingsError};
use crate::infra::storage::FileStoreProvider;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings registry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Organization name used to locate stores
    pub organization: String,

    /// Application name used to locate application-specific stores
    pub application: String,

    /// Root of per-user stores; defaults to the platform config directory
    #[serde(default)]
    pub user_dir: Option<PathBuf>,

    /// Root of system-wide stores
    #[serde(default)]
    pub system_dir: Option<PathBuf>,

    /// Write indented JSON
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Config {
    pub fn new(organization: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            application: application.into(),
            user_dir: None,
            system_dir: None,
            pretty: true,
        }
    }

    /// Parse a YAML configuration document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        serde_yaml::from_str(yaml).map_err(|e| SettingsError::Config {
            message: e.to_string(),
        })
    }

    /// Load a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| SettingsError::Config {
            message: format!("reading {}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn identity(&self) -> AppIdentity {
        AppIdentity::new(self.organization.clone(), self.application.clone())
    }

    pub fn resolved_user_dir(&self) -> PathBuf {
        self.user_dir
            .clone()
            .or_else(dirs::config_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn resolved_system_dir(&self) -> PathBuf {
        self.system_dir.clone().unwrap_or_else(default_system_dir)
    }

    /// File store provider for this configuration
    pub fn file_store_provider(&self) -> FileStoreProvider {
        FileStoreProvider::new(self.identity(), self.resolved_user_dir(), self.resolved_system_dir())
            .with_pretty(self.pretty)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(windows)]
fn default_system_dir() -> PathBuf {
    std::env::var_os("ProgramData")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
}

#[cfg(not(windows))]
fn default_system_dir() -> PathBuf {
    PathBuf::from("/etc/xdg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Scope;

    #[test]
    fn test_parse_minimal_yaml() {
        let cfg = Config::from_yaml_str("organization: Acme\napplication: Editor\n").unwrap();
        assert_eq!(cfg.identity(), AppIdentity::new("Acme", "Editor"));
        assert!(cfg.pretty);
        assert!(cfg.user_dir.is_none());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = Config::from_yaml_str("organization: Acme\napplication: Editor\ncolor: red\n").unwrap_err();
        assert!(matches!(err, SettingsError::Config { .. }));
    }

    #[test]
    fn test_missing_identity_is_an_error() {
        assert!(Config::from_yaml_str("application: Editor\n").is_err());
    }

    #[test]
    fn test_explicit_dirs_drive_provider_paths() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = format!(
            "organization: Acme\napplication: Editor\nuser_dir: {}\nsystem_dir: {}\npretty: false\n",
            dir.path().join("u").display(),
            dir.path().join("s").display(),
        );
        let cfg = Config::from_yaml_str(&yaml).unwrap();
        assert!(!cfg.pretty);

        let provider = cfg.file_store_provider();
        assert_eq!(provider.path_for(Scope::DEFAULT), dir.path().join("u/Acme/Editor.json"));
        assert_eq!(provider.path_for(Scope::SYSTEM), dir.path().join("s/Acme.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "organization: Acme\napplication: Editor\n").unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.application, "Editor");

        assert!(Config::load(dir.path().join("missing.yaml")).is_err());
    }
}
