//! Filesystem storage for the file-backed Data API.
//!
//! Each collection lives in `<root>/<database>/<collection>.json` as a
//! JSON array of documents. Every access holds an exclusive `fs2` lock on
//! a sibling `.lock` file, so concurrent processes see whole collections.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde_json::Value;
use tracing::trace;
use uuid::Uuid;

use atlas_core::error::{DecodeError, Error, InvalidInputError, TransportError};
use atlas_core::{Namespace, Result};

pub(crate) fn map_io(err: std::io::Error) -> Error {
    Error::Transport(TransportError::Io {
        message: err.to_string(),
    })
}

/// Filesystem-backed document storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn database_dir(&self, ns: &Namespace) -> PathBuf {
        self.root.join(ns.database())
    }

    /// Get the path of a collection's document file.
    pub fn collection_path(&self, ns: &Namespace) -> PathBuf {
        self.database_dir(ns)
            .join(format!("{}.json", ns.collection()))
    }

    fn lock_path(&self, ns: &Namespace) -> PathBuf {
        self.database_dir(ns)
            .join(format!("{}.lock", ns.collection()))
    }

    /// Generate a 24 hex digit document id, the same width as an ObjectId.
    pub fn generate_id() -> String {
        let uuid_str = Uuid::new_v4().simple().to_string();
        uuid_str[..24].to_string()
    }

    fn lock(&self, ns: &Namespace) -> Result<File> {
        fs::create_dir_all(self.database_dir(ns)).map_err(map_io)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path(ns))
            .map_err(map_io)?;

        lock_file.lock_exclusive().map_err(map_io)?;
        Ok(lock_file)
    }

    fn read_documents(path: &Path) -> Result<Vec<Value>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path).map_err(map_io)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str(&content).map_err(DecodeError::from)? {
            Value::Array(documents) => Ok(documents),
            _ => Err(DecodeError::Shape {
                message: format!("{} does not hold a JSON array", path.display()),
            }
            .into()),
        }
    }

    fn write_documents(path: &Path, documents: &[Value]) -> Result<()> {
        let content = serde_json::to_string_pretty(documents).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: e.to_string(),
            })
        })?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(map_io)?;
        fs::rename(&temp_path, path).map_err(map_io)?;
        Ok(())
    }

    /// Read every document in a collection. A missing collection is empty.
    pub fn load(&self, ns: &Namespace) -> Result<Vec<Value>> {
        let lock_file = self.lock(ns)?;
        let documents = Self::read_documents(&self.collection_path(ns));
        lock_file.unlock().map_err(map_io)?;

        let documents = documents?;
        trace!(namespace = %ns, count = documents.len(), "loaded collection");
        Ok(documents)
    }

    /// Read, change and persist a collection under one lock.
    ///
    /// `apply` returns its result and whether the documents changed; the
    /// file is rewritten only when they did.
    pub fn modify<T, F>(&self, ns: &Namespace, apply: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Value>) -> Result<(T, bool)>,
    {
        let lock_file = self.lock(ns)?;
        let path = self.collection_path(ns);

        let outcome = Self::read_documents(&path).and_then(|mut documents| {
            let (result, changed) = apply(&mut documents)?;
            if changed {
                Self::write_documents(&path, &documents)?;
                trace!(namespace = %ns, count = documents.len(), "wrote collection");
            }
            Ok(result)
        });

        lock_file.unlock().map_err(map_io)?;
        outcome
    }
}
