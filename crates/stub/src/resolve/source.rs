use crate::body::Compression;
use crate::error::{DecompressError, ResolveError};
use bytes::Bytes;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Name of the store that [`FileSource`] lookups are reported against.
pub const FILE_STORE: &str = "file";

/// Fetches body files by their symbolic name.
#[cfg_attr(test, mockall::automock)]
pub trait FileSource: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<Bytes, ResolveError>;
}

/// Fetches payloads from named data stores (`db`, or any custom store name).
#[cfg_attr(test, mockall::automock)]
pub trait DataStore: Send + Sync {
    fn fetch(&self, store: &str, reference: &str) -> Result<Bytes, ResolveError>;
}

/// Undoes the compression of a stored payload.
#[cfg_attr(test, mockall::automock)]
pub trait Decompress: Send + Sync {
    fn decompress(&self, bytes: &[u8], algorithm: Compression) -> Result<Bytes, DecompressError>;
}

/// A file source with no files.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoFiles;

impl FileSource for NoFiles {
    fn fetch(&self, reference: &str) -> Result<Bytes, ResolveError> {
        Err(ResolveError::not_found(FILE_STORE, reference))
    }
}

/// A data store with no stores.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoStores;

impl DataStore for NoStores {
    fn fetch(&self, store: &str, reference: &str) -> Result<Bytes, ResolveError> {
        Err(ResolveError::not_found(store, reference))
    }
}

/// Serves body files from a directory.
///
/// References are relative to the root; a leading `/` is ignored and references that would
/// escape the root are rejected.
#[derive(Debug, Clone)]
pub struct FsFileSource {
    root: PathBuf,
}

impl FsFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, reference: &str) -> Result<PathBuf, ResolveError> {
        let relative = Path::new(reference.trim_start_matches('/'));
        let escapes = relative.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(ResolveError::store(format!("file reference {reference:?} is outside the file root")));
        }
        Ok(self.root.join(relative))
    }
}

impl FileSource for FsFileSource {
    fn fetch(&self, reference: &str) -> Result<Bytes, ResolveError> {
        let path = self.path_of(reference)?;
        match std::fs::read(&path) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ResolveError::not_found(FILE_STORE, reference)),
            Err(e) => Err(ResolveError::io(e)),
        }
    }
}

/// Named stores of keyed payloads held in memory.
///
/// Also usable as a [`FileSource`], serving the entries of the [`FILE_STORE`] store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    stores: HashMap<String, HashMap<String, Bytes>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, store: impl Into<String>, reference: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        self.insert(store, reference, payload);
        self
    }

    pub fn insert(&mut self, store: impl Into<String>, reference: impl Into<String>, payload: impl Into<Bytes>) {
        self.stores.entry(store.into()).or_default().insert(reference.into(), payload.into());
    }
}

impl DataStore for InMemoryStore {
    fn fetch(&self, store: &str, reference: &str) -> Result<Bytes, ResolveError> {
        self.stores
            .get(store)
            .and_then(|entries| entries.get(reference))
            .cloned()
            .ok_or_else(|| ResolveError::not_found(store, reference))
    }
}

impl FileSource for InMemoryStore {
    fn fetch(&self, reference: &str) -> Result<Bytes, ResolveError> {
        DataStore::fetch(self, FILE_STORE, reference)
    }
}
