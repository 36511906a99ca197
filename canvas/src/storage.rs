//! Key/value persistence for state that outlives a session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Three values survive a reload: the last placement timestamp, the last
//! selected color and the grid-overlay toggle. The sync client never touches
//! a concrete backend; it is handed a [`KeyValueStore`]. Backends:
//!
//! - [`MemoryStore`]: tests and throwaway sessions.
//! - [`FileStore`]: a JSON object on disk for the native host.
//! - `LocalStore` (feature `web`): `window.localStorage` in the browser.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::consts::{KEY_CURRENT_COLOR, KEY_LAST_PIXEL_TIME, KEY_SHOW_GRID};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("storage file {path} is not a JSON object: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("browser storage unavailable: {0}")]
    Browser(String),
}

/// String key/value capability injected into the sync client.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot persist the value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile store backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// JSON-object file store shared by every process pointed at the same path.
///
/// Reads go to disk so a placement made by another process is seen on the
/// next check. `set` merges into the current file contents before rewriting
/// it. The last good contents are kept for when the file is briefly
/// unreadable.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read and
    /// [`StorageError::Json`] if it is not a string-valued JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        Ok(Self { path, entries: RefCell::new(entries) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file into the cache. On failure the cache is kept.
    fn refresh(&self) {
        match read_entries(&self.path) {
            Ok(entries) => *self.entries.borrow_mut() = entries,
            Err(error) => tracing::warn!(%error, "state file unreadable, using last known values"),
        }
    }

    fn flush(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(&*self.entries.borrow())
            .map_err(|source| StorageError::Json { path: self.path.clone(), source })?;
        let io_err = |source: io::Error| StorageError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.refresh();
        self.entries.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.refresh();
        self.entries.get_mut().insert(key.to_owned(), value.to_owned());
        self.flush()
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Json { path: path.to_owned(), source }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(source) => Err(StorageError::Io { path: path.to_owned(), source }),
    }
}

/// `window.localStorage` in the browser.
#[cfg(feature = "web")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(feature = "web")]
impl LocalStore {
    /// Grab the window's local storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Browser`] outside a window or when storage is disabled.
    pub fn from_window() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Browser("no window".to_owned()))?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::Browser("localStorage disabled".to_owned())),
            Err(e) => Err(StorageError::Browser(format!("{e:?}"))),
        }
    }
}

#[cfg(feature = "web")]
impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value,
            Err(_) => None,
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Browser(format!("{e:?}")))
    }
}

/// Persisted user state, read at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub last_pixel_time: i64,
    pub current_color: Color,
    pub show_grid: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { last_pixel_time: 0, current_color: Color::BLACK, show_grid: false }
    }
}

impl Preferences {
    /// Read all preferences, falling back per key when absent or unparsable.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let defaults = Self::default();
        let last_pixel_time = load_last_pixel_time(store).unwrap_or(defaults.last_pixel_time);
        let current_color = store
            .get(KEY_CURRENT_COLOR)
            .and_then(|raw| Color::parse_hex(&raw))
            .unwrap_or(defaults.current_color);
        let show_grid = store
            .get(KEY_SHOW_GRID)
            .map_or(defaults.show_grid, |raw| raw.trim() == "true");
        Self { last_pixel_time, current_color, show_grid }
    }
}

/// The stored placement timestamp, `None` when absent or unparsable.
pub fn load_last_pixel_time(store: &impl KeyValueStore) -> Option<i64> {
    store.get(KEY_LAST_PIXEL_TIME).and_then(|raw| match raw.trim().parse::<i64>() {
        Ok(ms) => Some(ms),
        Err(_) => None,
    })
}

/// Persist the last placement timestamp.
///
/// # Errors
///
/// Propagates the backend's [`StorageError`].
pub fn save_last_pixel_time(store: &mut impl KeyValueStore, ms: i64) -> Result<(), StorageError> {
    store.set(KEY_LAST_PIXEL_TIME, &ms.to_string())
}

/// Persist the selected color as `#rrggbb`.
///
/// # Errors
///
/// Propagates the backend's [`StorageError`].
pub fn save_current_color(store: &mut impl KeyValueStore, color: Color) -> Result<(), StorageError> {
    store.set(KEY_CURRENT_COLOR, &color.to_hex())
}

/// Persist the grid-overlay toggle.
///
/// # Errors
///
/// Propagates the backend's [`StorageError`].
pub fn save_show_grid(store: &mut impl KeyValueStore, show: bool) -> Result<(), StorageError> {
    store.set(KEY_SHOW_GRID, if show { "true" } else { "false" })
}
