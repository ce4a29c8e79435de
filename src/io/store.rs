//! Key-value record store: one JSON file per key inside the data directory.
//!
//! Collections (`sessions`, `tasks`, ...) are JSON arrays of records;
//! singletons (`profile`, `theme`, `timer`) are a single JSON value. Reads
//! never fail: a missing or unparsable key reads as empty. Writes are atomic
//! per key and serialized across processes by [`StoreLock`]. There is no
//! transaction spanning keys.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::io::lock::{DEFAULT_LOCK_TIMEOUT, LockError, StoreLock};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::{Habit, Note, Project, Session, Task};

pub const KEY_SESSIONS: &str = "sessions";
pub const KEY_TASKS: &str = "tasks";
pub const KEY_PROJECTS: &str = "projects";
pub const KEY_HABITS: &str = "habits";
pub const KEY_NOTES: &str = "notes";
pub const KEY_PROFILE: &str = "profile";
pub const KEY_THEME: &str = "theme";
pub const KEY_TIMER: &str = "timer";

/// Every key a bulk reset removes.
pub const ALL_KEYS: &[&str] = &[
    KEY_SESSIONS,
    KEY_TASKS,
    KEY_PROJECTS,
    KEY_HABITS,
    KEY_NOTES,
    KEY_PROFILE,
    KEY_THEME,
    KEY_TIMER,
];

/// A record living in a keyed collection, identified by a numeric id.
pub trait Record: Serialize + DeserializeOwned {
    const KEY: &'static str;
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

macro_rules! impl_record {
    ($ty:ty, $key:expr) => {
        impl Record for $ty {
            const KEY: &'static str = $key;
            fn id(&self) -> u64 {
                self.id
            }
            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
        }
    };
}

impl_record!(Session, KEY_SESSIONS);
impl_record!(Task, KEY_TASKS);
impl_record!(Project, KEY_PROJECTS);
impl_record!(Habit, KEY_HABITS);
impl_record!(Note, KEY_NOTES);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("could not encode records: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0}: no ids left above the largest stored id")]
    IdsExhausted(String),
}

/// Raw contents of one key as found on disk.
enum RawKey {
    Missing,
    Values(Vec<Value>),
    Corrupt(String),
}

#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Store {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    /// All records under `key`, in stored order. Records that do not decode
    /// as `T` are skipped.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let values = match self.read_raw(key) {
            RawKey::Values(values) => values,
            RawKey::Missing | RawKey::Corrupt(_) => return Vec::new(),
        };
        let total = values.len();
        let records: Vec<T> = values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if records.len() < total {
            log::warn!(
                "{}: skipped {} unreadable record(s)",
                key,
                total - records.len()
            );
        }
        records
    }

    /// Typed read of a record collection.
    pub fn all<T: Record>(&self) -> Vec<T> {
        self.get(T::KEY)
    }

    /// Replace everything under `key`.
    ///
    /// Stored records that would be silently lost (because they never decoded
    /// as `T`) are copied to the recovery log first.
    pub fn set<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        records: &[T],
    ) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        match self.read_raw(key) {
            RawKey::Values(values) => {
                let lost: Vec<&Value> = values
                    .iter()
                    .filter(|v| serde_json::from_value::<T>((*v).clone()).is_err())
                    .collect();
                if !lost.is_empty() {
                    let body = serde_json::to_string_pretty(&lost).unwrap_or_default();
                    recovery::log_recovery(
                        &self.dir,
                        RecoveryEntry::new(RecoveryCategory::Corrupt, "unreadable records overwritten")
                            .field("Key", key)
                            .body(body),
                    );
                }
            }
            RawKey::Corrupt(content) => self.log_corrupt(key, content),
            RawKey::Missing => {}
        }
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.write_values(key, &values)
    }

    /// Append `record` under `key`, assigning it a fresh id. Returns the
    /// record as stored.
    pub fn append<T: Record>(&self, key: &str, mut record: T) -> Result<T, StoreError> {
        let _lock = self.lock()?;
        let mut values = self.values_for_write(key);
        let id = next_id(&values).ok_or_else(|| StoreError::IdsExhausted(key.to_string()))?;
        record.set_id(id);
        values.push(serde_json::to_value(&record)?);
        self.write_values(key, &values)?;
        Ok(record)
    }

    /// Merge the fields of `patch` into the record with `id`. Returns whether
    /// a record matched.
    pub fn update(&self, key: &str, id: u64, patch: &Map<String, Value>) -> Result<bool, StoreError> {
        let _lock = self.lock()?;
        let mut values = self.values_for_write(key);
        let Some(Value::Object(target)) = values.iter_mut().find(|v| value_id(v) == Some(id)) else {
            return Ok(false);
        };
        for (field, value) in patch {
            if field != "id" {
                target.insert(field.clone(), value.clone());
            }
        }
        self.write_values(key, &values)?;
        Ok(true)
    }

    /// Remove the record with `id`, returning it as raw JSON if it existed.
    pub fn remove(&self, key: &str, id: u64) -> Result<Option<Value>, StoreError> {
        let _lock = self.lock()?;
        let mut values = self.values_for_write(key);
        let Some(pos) = values.iter().position(|v| value_id(v) == Some(id)) else {
            return Ok(None);
        };
        let removed = values.remove(pos);
        self.write_values(key, &values)?;
        Ok(Some(removed))
    }

    /// Locked read-modify-write over a typed collection.
    ///
    /// Stored values that do not decode as `T` are not handed to `f`; they
    /// are written back unchanged after the decoded records.
    pub fn modify<T, R, F>(&self, f: F) -> Result<R, StoreError>
    where
        T: Record,
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let _lock = self.lock()?;
        let mut records: Vec<T> = Vec::new();
        let mut undecoded: Vec<Value> = Vec::new();
        for value in self.values_for_write(T::KEY) {
            match serde_json::from_value(value.clone()) {
                Ok(record) => records.push(record),
                Err(_) => undecoded.push(value),
            }
        }
        if !undecoded.is_empty() {
            log::warn!("{}: kept {} unreadable record(s) as-is", T::KEY, undecoded.len());
        }
        let result = f(&mut records);
        let mut values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        values.extend(undecoded);
        self.write_values(T::KEY, &values)?;
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Singletons
    // -----------------------------------------------------------------------

    pub fn get_one<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = fs::read_to_string(self.key_path(key)).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("{}: unreadable, using default ({})", key, e);
                None
            }
        }
    }

    pub fn put_one<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        let content = serde_json::to_string_pretty(value)?;
        self.write_text(key, content)
    }

    /// Remove a single key. Missing keys are fine.
    pub fn clear(&self, key: &str) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        self.remove_file(key)
    }

    /// Remove every known key (bulk reset).
    pub fn clear_all(&self) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        for key in ALL_KEYS {
            self.remove_file(key)?;
        }
        log::info!("cleared all data in {}", self.dir.display());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock(&self) -> Result<StoreLock, StoreError> {
        Ok(StoreLock::acquire(&self.dir, DEFAULT_LOCK_TIMEOUT)?)
    }

    fn read_raw(&self, key: &str) -> RawKey {
        let content = match fs::read_to_string(self.key_path(key)) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return RawKey::Missing,
            Err(e) => {
                log::warn!("{}: could not read ({}), treating as empty", key, e);
                return RawKey::Missing;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(values)) => RawKey::Values(values),
            Ok(Value::Null) => RawKey::Missing,
            Ok(_) | Err(_) => {
                log::warn!("{}: not a JSON array, treating as empty", key);
                RawKey::Corrupt(content)
            }
        }
    }

    /// Current values for a write path. A corrupt key is preserved in the
    /// recovery log before it gets overwritten.
    fn values_for_write(&self, key: &str) -> Vec<Value> {
        match self.read_raw(key) {
            RawKey::Values(values) => values,
            RawKey::Missing => Vec::new(),
            RawKey::Corrupt(content) => {
                self.log_corrupt(key, content);
                Vec::new()
            }
        }
    }

    fn log_corrupt(&self, key: &str, content: String) {
        recovery::log_recovery(
            &self.dir,
            RecoveryEntry::new(RecoveryCategory::Corrupt, "unparsable key replaced")
                .field("Key", key)
                .body(content),
        );
    }

    fn write_values(&self, key: &str, values: &[Value]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(values)?;
        self.write_text(key, content)
    }

    fn write_text(&self, key: &str, content: String) -> Result<(), StoreError> {
        let path = self.key_path(key);
        if let Err(source) = recovery::atomic_write(&path, content.as_bytes()) {
            recovery::log_recovery(
                &self.dir,
                RecoveryEntry::new(RecoveryCategory::Write, format!("{} write failed", key))
                    .field("Target", path.display().to_string())
                    .field("Error", source.to_string())
                    .body(content),
            );
            return Err(StoreError::Write { path, source });
        }
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn remove_file(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write { path, source }),
        }
    }
}

fn value_id(value: &Value) -> Option<u64> {
    value.get("id").and_then(Value::as_u64)
}

/// Time-based id that is strictly greater than every id already stored.
/// `None` once the largest stored id is `u64::MAX`.
fn next_id(values: &[Value]) -> Option<u64> {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    let max_existing = values.iter().filter_map(value_id).max();
    match max_existing {
        Some(max) if max >= now => max.checked_add(1),
        _ => Some(now),
    }
}
