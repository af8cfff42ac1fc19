//! JSON file store
//!
//! Each store location maps to one JSON document holding a flat object of
//! key to value. Group keys keep their `/` separators inside the key.

use crate::contract::{AppIdentity, Scope, StoreLocation, Visibility};
use crate::domain::store::{SettingsStore, StoreProvider};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const UNKNOWN_ORGANIZATION: &str = "Unknown Organization";

/// Store backed by a single JSON file
///
/// Writes are staged in memory. `sync` re-reads the file and applies the
/// staged writes on top of it, so entries synced through other handles since
/// this one was opened are kept.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// File content as last read or written, with staged writes applied
    entries: Map<String, Value>,
    staged: Map<String, Value>,
    /// `clear_all` was called since the last sync
    cleared: bool,
    pretty: bool,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>, pretty: bool) -> Result<Self> {
        let path = path.into();
        let entries = read_entries(&path)?;

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened settings file");
        Ok(Self {
            path,
            entries,
            staged: Map::new(),
            cleared: false,
            pretty,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether writes are waiting for `sync`
    pub fn has_staged_changes(&self) -> bool {
        self.cleared || !self.staged.is_empty()
    }

    fn write_file(&self, entries: &Map<String, Value>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)
            .with_context(|| format!("creating settings directory {}", dir.display()))?;

        let json = if self.pretty {
            serde_json::to_string_pretty(entries)?
        } else {
            serde_json::to_string(entries)?
        };

        // Replace atomically so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("replacing settings file {}", self.path.display()))?;
        Ok(())
    }
}

/// Entries of the file at `path`; missing or blank files are empty
fn read_entries(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(&contents).with_context(|| format!("parsing settings file {}", path.display()))
}

impl SettingsStore for JsonFileStore {
    fn read(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value.clone());
        self.staged.insert(key.to_string(), value);
    }

    fn sync(&mut self) -> Result<()> {
        if !self.has_staged_changes() {
            return Ok(());
        }

        let mut merged = if self.cleared {
            Map::new()
        } else {
            read_entries(&self.path)?
        };
        merged.extend(self.staged.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.write_file(&merged)?;

        tracing::debug!(path = %self.path.display(), staged = self.staged.len(), "synced settings file");
        self.entries = merged;
        self.staged.clear();
        self.cleared = false;
        Ok(())
    }

    fn clear_all(&mut self) {
        self.entries.clear();
        self.staged.clear();
        self.cleared = true;
    }
}

/// Opens JSON file stores under per-visibility root directories
///
/// Application stores live at `<root>/<organization>/<application>.json`,
/// organization stores at `<root>/<organization>.json`.
#[derive(Debug, Clone)]
pub struct FileStoreProvider {
    identity: AppIdentity,
    user_dir: PathBuf,
    system_dir: PathBuf,
    pretty: bool,
}

impl FileStoreProvider {
    pub fn new(identity: AppIdentity, user_dir: impl Into<PathBuf>, system_dir: impl Into<PathBuf>) -> Self {
        Self {
            identity,
            user_dir: user_dir.into(),
            system_dir: system_dir.into(),
            pretty: true,
        }
    }

    /// Write compact instead of indented JSON
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// File backing `scope`
    pub fn path_for(&self, scope: Scope) -> PathBuf {
        self.path_for_location(&StoreLocation::resolve(scope, &self.identity))
    }

    pub fn path_for_location(&self, location: &StoreLocation) -> PathBuf {
        let root = match location.visibility {
            Visibility::User => &self.user_dir,
            Visibility::System => &self.system_dir,
        };
        let organization = if location.organization.is_empty() {
            UNKNOWN_ORGANIZATION
        } else {
            location.organization.as_str()
        };
        match &location.application {
            Some(application) if !application.is_empty() => {
                root.join(organization).join(format!("{}.json", application))
            }
            _ => root.join(format!("{}.json", organization)),
        }
    }
}

impl StoreProvider for FileStoreProvider {
    fn open(&self, scope: Scope) -> Result<Box<dyn SettingsStore>> {
        let store = JsonFileStore::open(self.path_for(scope), self.pretty)?;
        Ok(Box::new(store))
    }
}
