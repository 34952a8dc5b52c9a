use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::debug;

use super::GraphStore;
use crate::collab::GraphData;
use crate::error::{GraphError, Result};

/// One JSON file per key under a cache directory.
///
/// Entries are written to a temporary file in the same directory and renamed
/// into place, so readers observe either the previous state or the complete
/// new entry.
#[derive(Clone, Debug)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|error| GraphError::io(error, &dir))?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(GraphError::InvalidConfig(format!("invalid cache key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl GraphStore for DiskStore {
    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.entry_path(key)?.is_file())
    }

    fn read(&self, key: &str) -> Result<Option<GraphData>> {
        let path = self.entry_path(key)?;
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(GraphError::io(error, path)),
        };
        let graph = serde_json::from_slice(&raw)?;
        debug!(key, "cache hit");
        Ok(Some(graph))
    }

    fn write(&self, key: &str, graph: &GraphData) -> Result<()> {
        let path = self.entry_path(key)?;
        let mut staging =
            NamedTempFile::new_in(&self.dir).map_err(|error| GraphError::io(error, &self.dir))?;
        serde_json::to_writer(staging.as_file_mut(), graph)?;
        staging
            .as_file_mut()
            .flush()
            .map_err(|error| GraphError::io(error, staging.path()))?;
        staging
            .persist(&path)
            .map_err(|error| GraphError::io(error.error, &path))?;
        debug!(key, path = %path.display(), "cache entry written");
        Ok(())
    }
}
