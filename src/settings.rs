//! Settings, read from an optional `lexgraph.json` and then `LEXGRAPH_*`
//! environment variables (nested keys separated by `__`, so
//! `LEXGRAPH_STORE__BACKEND=sqlite`).

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::dataset::DatasetStore;
use crate::error::Result;
use crate::memory::MemoryStore;
use crate::persist::{PersistenceMode, SqliteStore};
use crate::store::{Requirement, Store};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Sqlite,
    Dataset,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: Backend,
    /// SQLite file; in-memory when absent.
    pub path: Option<String>,
    /// Overrides the backend's own transaction requirement.
    pub requirement: Option<Requirement>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MigrationSettings {
    pub input_dir: PathBuf,
    pub separator: String,
    /// Where to write the migrated graph as N-Triples, if anywhere.
    pub export: Option<PathBuf>,
}

impl MigrationSettings {
    /// The field separator; only its first character counts.
    pub fn separator(&self) -> char {
        self.separator.chars().next().unwrap_or('@')
    }
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            separator: "@".to_string(),
            export: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub migration: MigrationSettings,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            migration: MigrationSettings::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Loads `lexgraph.json` (if present) from the working directory.
    pub fn load() -> Result<Self> {
        Self::from_file("lexgraph")
    }
    /// `name` is a config file name without extension, as the `config` crate expects.
    pub fn from_file(name: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(
                Environment::with_prefix("LEXGRAPH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// Opens the configured backend.
pub fn open_store(settings: &StoreSettings) -> Result<Box<dyn Store>> {
    let store: Box<dyn Store> = match settings.backend {
        Backend::Memory => Box::new(MemoryStore::new()),
        Backend::Sqlite => {
            let mode = match &settings.path {
                Some(path) => PersistenceMode::File(path.clone()),
                None => PersistenceMode::InMemory,
            };
            let store = SqliteStore::new(mode)?;
            Box::new(match settings.requirement {
                Some(requirement) => store.with_requirement(requirement),
                None => store,
            })
        }
        Backend::Dataset => {
            let store = DatasetStore::new();
            Box::new(match settings.requirement {
                Some(requirement) => store.with_requirement(requirement),
                None => store,
            })
        }
    };
    Ok(store)
}
