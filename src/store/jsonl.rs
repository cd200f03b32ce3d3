use crate::error::StoreError;
use crate::store::{EntityStore, MemoryStore};
use crate::types::Keyed;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A store persisted as one JSON document per line.
///
/// Entities are indexed in memory; [`JsonlStore::flush`] rewrites the whole
/// file. Writes made since the last flush are lost if the store is dropped
/// without flushing.
pub struct JsonlStore<T> {
    path: PathBuf,
    entries: MemoryStore<T>,
    dirty: bool,
}

impl<T> JsonlStore<T>
where
    T: Keyed + Clone + Serialize + DeserializeOwned,
{
    /// Open the store at `path`, loading any existing entries.
    ///
    /// When the file holds several lines for the same id the last one wins.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut entries: MemoryStore<T> = MemoryStore::new();

        if path.exists() {
            let file = File::open(&path).map_err(io_err(&path))?;

            for (idx, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(io_err(&path))?;
                if line.trim().is_empty() {
                    continue;
                }
                let entity: T = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    line: idx + 1,
                    source,
                })?;
                entries.save(entity)?;
            }

            tracing::debug!(path = %path.display(), entries = entries.len(), "loaded store");
        }

        Ok(JsonlStore {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every entity to disk, replacing the previous file
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let tmp_path = self.path.with_extension("jsonl.tmp");
        {
            let file = File::create(&tmp_path).map_err(io_err(&tmp_path))?;
            let mut writer = BufWriter::new(file);

            for entity in self.entries.values() {
                let json = serde_json::to_string(entity).map_err(|source| StoreError::Serialize {
                    id: entity.id().to_string(),
                    source,
                })?;
                writeln!(writer, "{}", json).map_err(io_err(&tmp_path))?;
            }
            writer.flush().map_err(io_err(&tmp_path))?;
        }

        std::fs::rename(&tmp_path, &self.path).map_err(io_err(&self.path))?;
        self.dirty = false;

        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "flushed store");
        Ok(())
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

impl<T> EntityStore<T> for JsonlStore<T>
where
    T: Keyed + Clone + Serialize + DeserializeOwned,
{
    fn save(&mut self, entity: T) -> Result<(), StoreError> {
        self.entries.save(entity)?;
        self.dirty = true;
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.entries.find_by_id(id)
    }

    fn ids(&self) -> Vec<String> {
        self.entries.ids()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
