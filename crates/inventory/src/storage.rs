//! Whole-collection persistence to the inventory file.

use std::path::{Path, PathBuf};

use thiserror::Error;

use gearcage_core::ItemId;

use crate::codec::{self, DecodeError, FIELD_COUNT};
use crate::inventory::Inventory;
use crate::item::Item;

/// Storage failure. A failed `load` leaves the in-memory collection untouched.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode record for {id}: {source}")]
    Encode {
        id: ItemId,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: {source}")]
    Decode {
        line: u64,
        #[source]
        source: DecodeError,
    },

    #[error("line {line}: duplicate item id {id}")]
    DuplicateId { line: u64, id: ItemId },
}

impl Inventory {
    /// Replace the in-memory items with the file's contents.
    ///
    /// Records with fewer than eight fields are skipped. Any other bad record fails
    /// the whole load.
    pub fn load(&mut self) -> Result<usize, StorageError> {
        let items = read_items(&self.path)?;
        self.items = items;
        tracing::info!(path = %self.path.display(), items = self.items.len(), "inventory loaded");
        Ok(self.items.len())
    }

    /// Overwrite the file with every item, in collection order.
    ///
    /// Writes a sibling temp file and renames it over the target.
    pub fn save(&self) -> Result<(), StorageError> {
        let path = &self.path;
        let write_err = |source| StorageError::Write {
            path: path.clone(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;

        {
            let mut writer = csv::WriterBuilder::new()
                .quote_style(csv::QuoteStyle::Necessary)
                .from_writer(tmp.as_file());
            for item in &self.items {
                writer
                    .write_record(codec::encode_record(item))
                    .map_err(|source| StorageError::Encode {
                        id: item.id().clone(),
                        source,
                    })?;
            }
            writer.flush().map_err(write_err)?;
        }

        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        tracing::debug!(path = %path.display(), items = self.items.len(), "inventory saved");
        Ok(())
    }
}

fn read_items(path: &Path) -> Result<Vec<Item>, StorageError> {
    let read_err = |source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let mut items: Vec<Item> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() < FIELD_COUNT {
            tracing::debug!(line, fields = record.len(), "skipping short record");
            continue;
        }

        let item = codec::decode_record(&record)
            .map_err(|source| StorageError::Decode { line, source })?;
        if items.contains(&item) {
            return Err(StorageError::DuplicateId {
                line,
                id: item.id().clone(),
            });
        }
        items.push(item);
    }

    Ok(items)
}
