use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::Settings;

/// Errors raised by a settings store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Settings encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Could not create data directory {path}: {source}")]
    DataDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistence for user preferences.
///
/// `load` never fails: a missing or unreadable entry yields `default`.
/// Callers treat `save` as fire-and-forget and only log its errors.
pub trait SettingsStore {
    fn load(&self, key: &str, default: Settings) -> Settings;
    fn save(&self, key: &str, settings: &Settings) -> Result<(), StoreError>;
}

/// Key-value settings table in a SQLite file.
pub struct SqliteStore {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the settings database inside `data_dir`.
    ///
    /// The default data directory is:
    /// - Linux: ~/.local/share/product-copy/settings.db
    /// - macOS: ~/Library/Application Support/product-copy/settings.db
    /// - Windows: %APPDATA%\product-copy\settings.db
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(data_dir).map_err(|source| StoreError::DataDirectory {
            path: data_dir.to_path_buf(),
            source,
        })?;

        let db_path = data_dir.join("settings.db");
        let conn = Connection::open(&db_path)?;

        tracing::info!("📁 Settings database at: {}", db_path.display());

        let store = SqliteStore { conn, db_path };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory database
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = SqliteStore {
            conn,
            db_path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key             TEXT PRIMARY KEY,
                value_json      TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    #[cfg(test)]
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    fn read_json(&self, key: &str) -> Result<Option<String>, StoreError> {
        let json = self
            .conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json)
    }
}

impl SettingsStore for SqliteStore {
    fn load(&self, key: &str, default: Settings) -> Settings {
        match self.read_json(key) {
            Ok(Some(json)) => match Settings::from_json(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("⚠️  Stored settings under '{}' are unreadable ({}), using defaults", key, e);
                    default
                }
            },
            Ok(None) => {
                tracing::debug!("No settings stored under '{}' yet", key);
                default
            }
            Err(e) => {
                tracing::warn!("⚠️  Failed to read settings '{}': {}", key, e);
                default
            }
        }
    }

    fn save(&self, key: &str, settings: &Settings) -> Result<(), StoreError> {
        let json = settings.to_json()?;
        self.conn.execute(
            "INSERT INTO settings (key, value_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            rusqlite::params![key, json, Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Volatile store.
///
/// Used when the database cannot be opened, so the app still runs
/// (preferences just won't outlive the process). Test builds also keep
/// a log of every write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Settings>>,
    #[cfg(test)]
    writes: RefCell<Vec<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing entry
    #[cfg(test)]
    pub fn with_entry(key: &str, settings: Settings) -> Self {
        let store = Self::default();
        store.entries.borrow_mut().insert(key.to_string(), settings);
        store
    }

    /// Every settings value written so far, oldest first
    #[cfg(test)]
    pub fn writes(&self) -> Vec<Settings> {
        self.writes.borrow().clone()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str, default: Settings) -> Settings {
        self.entries.borrow().get(key).cloned().unwrap_or(default)
    }

    fn save(&self, key: &str, settings: &Settings) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), settings.clone());
        #[cfg(test)]
        self.writes.borrow_mut().push(settings.clone());
        Ok(())
    }
}

/// Shared handle so a test can keep inspecting a store the session owns
impl<S: SettingsStore> SettingsStore for std::rc::Rc<S> {
    fn load(&self, key: &str, default: Settings) -> Settings {
        (**self).load(key, default)
    }

    fn save(&self, key: &str, settings: &Settings) -> Result<(), StoreError> {
        (**self).save(key, settings)
    }
}
