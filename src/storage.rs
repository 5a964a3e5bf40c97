use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// The record collections kept by taskdesk. Each is stored and rewritten
/// as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Employees,
    Tasks,
}

impl Collection {
    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Users => "users.json",
            Collection::Employees => "employees.json",
            Collection::Tasks => "tasks.json",
        }
    }

    /// Tasks are created by this tool, so a collection that was never
    /// written is simply empty. Users and employees are reference data
    /// that must be provided.
    fn may_be_absent(self) -> bool {
        matches!(self, Collection::Tasks)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Users => f.write_str("users"),
            Collection::Employees => f.write_str("employees"),
            Collection::Tasks => f.write_str("tasks"),
        }
    }
}

/// Whole-collection persistence.
///
/// Implementors only move raw bytes. [`Storage::load`] and
/// [`Storage::save`] handle the JSON encoding, so every backend reads
/// and writes the same format.
pub trait Storage {
    /// Returns the stored bytes, or `None` if the collection has never
    /// been written.
    fn read(&self, collection: Collection) -> Result<Option<Vec<u8>>>;

    /// Replaces the stored bytes of a collection.
    fn write(&self, collection: Collection, contents: &[u8]) -> Result<()>;

    /// Loads every record of a collection in stored order.
    fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        match self.read(collection)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| Error::Parse { collection, source }),
            None if collection.may_be_absent() => Ok(Vec::new()),
            None => Err(Error::MissingCollection(collection)),
        }
    }

    /// Serializes and stores the full collection, replacing what was there.
    fn save<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()>
    where
        Self: Sized,
    {
        let bytes = to_json(records)?;
        debug!(%collection, records = records.len(), "saving collection");
        self.write(collection, &bytes)
    }
}

/// Pretty JSON with 4-space indentation, the layout of existing data files.
fn to_json<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut ser)?;
    Ok(buf)
}

/// Returns the default data directory.
///
/// `~/.local/share/taskdesk` on Linux, `./taskdesk` if the platform has
/// no data directory.
pub fn default_data_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("taskdesk");
    p
}

/// Stores each collection as a JSON file in one directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    dir: PathBuf,
}

impl JsonStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of a collection's file.
    pub fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }
}

impl Storage for JsonStorage {
    fn read(&self, collection: Collection) -> Result<Option<Vec<u8>>> {
        let path = self.path(collection);
        debug!(path = %path.display(), "loading collection");
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Io { path, source }),
        }
    }

    /// Writes a sibling `.tmp` file and renames it over the target, so a
    /// crash mid-write leaves the previous contents intact.
    fn write(&self, collection: Collection, contents: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path(collection);
        let temp_path = self.dir.join(format!("{}.tmp", collection.file_name()));
        fs::write(&temp_path, contents).map_err(|source| Error::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| Error::Io { path, source })?;
        Ok(())
    }
}

/// Keeps collections in memory. Used by tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    collections: Mutex<HashMap<Collection, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style seeding of a collection.
    pub fn with<T: Serialize>(self, collection: Collection, records: &[T]) -> Result<Self> {
        self.save(collection, records)?;
        Ok(self)
    }

    /// The exact bytes currently stored for a collection.
    pub fn raw(&self, collection: Collection) -> Option<Vec<u8>> {
        self.collections
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&collection)
            .cloned()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, collection: Collection) -> Result<Option<Vec<u8>>> {
        Ok(self.raw(collection))
    }

    fn write(&self, collection: Collection, contents: &[u8]) -> Result<()> {
        self.collections
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(collection, contents.to_vec());
        Ok(())
    }
}
