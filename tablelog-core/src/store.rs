//! Keyed JSON document store
//!
//! Maps a logical name to one JSON file on disk and keeps a single cached
//! copy of its contents per name. The store is an explicit value owned by
//! the caller; nothing here is global.
//!
//! ## Lifecycle
//!
//! - [`DocumentStore::init`] creates the file from a default when missing and
//!   always refreshes the cache from disk.
//! - [`DocumentStore::get`] serves the cached copy; external edits are not
//!   seen until [`DocumentStore::get_fresh`] or another `init`.
//! - [`DocumentStore::update`] replaces the cache and overwrites the file.
//!
//! Writes are plain full-file overwrites with no locking: callers must not
//! interleave writes to the same name from parallel contexts.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One registered document
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub name: String,
    pub path: PathBuf,
    pub data: Value,
}

/// Cache of JSON documents keyed by logical name.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, StoredDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` at `path`, writing `default` when the file is absent,
    /// then load the file contents into the cache.
    pub fn init<T: Serialize>(&mut self, name: &str, path: &Path, default: &T) -> Result<()> {
        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            write_document(path, &serde_json::to_value(default)?)?;
            tracing::info!(name, path = %path.display(), "Created document from default");
        }

        let data = read_document(path)?;
        match self.documents.get_mut(name) {
            Some(doc) => doc.data = data,
            None => {
                self.documents.insert(
                    name.to_string(),
                    StoredDocument {
                        name: name.to_string(),
                        path: path.to_path_buf(),
                        data,
                    },
                );
            }
        }
        Ok(())
    }

    /// Cached copy of `name`.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.documents
            .get(name)
            .map(|doc| &doc.data)
            .ok_or_else(|| Error::NotInitialized(name.to_string()))
    }

    /// Cached copy of `name` decoded as `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let doc = self.document(name)?;
        serde_json::from_value(doc.data.clone()).map_err(|source| Error::MalformedDocument {
            path: doc.path.clone(),
            source,
        })
    }

    /// Re-read `name` from disk, replacing the cached copy.
    pub fn reload(&mut self, name: &str) -> Result<()> {
        let doc = self
            .documents
            .get_mut(name)
            .ok_or_else(|| Error::NotInitialized(name.to_string()))?;
        doc.data = read_document(&doc.path)?;
        tracing::debug!(name, path = %doc.path.display(), "Reloaded document");
        Ok(())
    }

    /// Re-read `name` from disk and return the fresh copy.
    pub fn get_fresh(&mut self, name: &str) -> Result<&Value> {
        self.reload(name)?;
        self.get(name)
    }

    /// Replace the cached copy and overwrite the backing file.
    pub fn update(&mut self, name: &str, data: Value) -> Result<()> {
        let doc = self
            .documents
            .get_mut(name)
            .ok_or_else(|| Error::NotInitialized(name.to_string()))?;
        write_document(&doc.path, &data)?;
        doc.data = data;
        tracing::debug!(name, path = %doc.path.display(), "Wrote document");
        Ok(())
    }

    /// Serialize `data` and [`update`](Self::update) `name` with it.
    pub fn update_as<T: Serialize>(&mut self, name: &str, data: &T) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.update(name, value)
    }

    /// Whether `name` has been initialized. No I/O.
    pub fn is_defined(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    /// Backing file of `name`
    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.documents.get(name).map(|doc| doc.path.as_path())
    }

    /// Unregister `name` and delete its backing file.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let doc = self
            .documents
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        match fs::remove_file(&doc.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::info!(name, path = %doc.path.display(), "Deleted document");
        Ok(())
    }

    /// [`delete`](Self::delete) every registered document.
    pub fn clear(&mut self) -> Result<()> {
        let names: Vec<String> = self.documents.keys().cloned().collect();
        for name in names {
            self.delete(&name)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn document(&self, name: &str) -> Result<&StoredDocument> {
        self.documents
            .get(name)
            .ok_or_else(|| Error::NotInitialized(name.to_string()))
    }
}

fn read_document(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read {}: {}", path.display(), e),
        ))
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::MalformedDocument {
        path: path.to_path_buf(),
        source,
    })
}

fn write_document(path: &Path, data: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to write {}: {}", path.display(), e),
        ))
    })
}
