//! Raw medicine store - the flat list of scraped name/unit records awaiting curation.
//!
//! Records are read and written as a whole. Backends implement [`RawStore`];
//! callers that modify the list go through [`RawMedicineStore::begin`], which
//! serializes read-modify-write cycles inside the process.

use crate::{core::names::normalize_units, errors::Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// One scraped medicine record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredRecord")]
pub struct RawMedicine {
    /// Name as scraped (may be misspelled)
    pub name: String,
    /// Units of sale seen for this name
    pub units: Vec<String>,
    /// Set once the record has been promoted to a valid name
    pub edited: bool,
    /// Corrected spelling used when the record was promoted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correctedname: Option<String>,
}

impl RawMedicine {
    /// Creates an unpromoted record.
    pub fn new<I, S>(name: impl Into<String>, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            units: normalize_units(units),
            edited: false,
            correctedname: None,
        }
    }
}

/// On-disk shape; older files carry a single `unit` per record.
#[derive(Deserialize)]
struct StoredRecord {
    name: String,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    units: Vec<String>,
    #[serde(default)]
    edited: bool,
    #[serde(default, alias = "correctedName")]
    correctedname: Option<String>,
}

impl From<StoredRecord> for RawMedicine {
    fn from(record: StoredRecord) -> Self {
        Self {
            name: record.name,
            units: normalize_units(record.unit.into_iter().chain(record.units)),
            edited: record.edited,
            correctedname: record.correctedname,
        }
    }
}

/// Persistence backend for the raw list with all-or-nothing reads and writes
#[async_trait]
pub trait RawStore: Send + Sync {
    /// Reads the whole list.
    async fn load(&self) -> Result<Vec<RawMedicine>>;

    /// Replaces the whole list.
    async fn save(&self, records: &[RawMedicine]) -> Result<()>;
}

/// Raw list kept in a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileRawStore {
    path: PathBuf,
}

impl JsonFileRawStore {
    /// Creates a store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RawStore for JsonFileRawStore {
    async fn load(&self) -> Result<Vec<RawMedicine>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Raw medicines file {:?} not found, treating as empty", self.path);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, records: &[RawMedicine]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(records)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!("Wrote {} raw medicines to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// Raw list held in memory
#[derive(Debug, Default)]
pub struct MemoryRawStore {
    records: std::sync::Mutex<Vec<RawMedicine>>,
}

impl MemoryRawStore {
    /// Creates a store pre-filled with `records`.
    #[must_use]
    pub fn new(records: Vec<RawMedicine>) -> Self {
        Self {
            records: std::sync::Mutex::new(records),
        }
    }
}

#[async_trait]
impl RawStore for MemoryRawStore {
    async fn load(&self) -> Result<Vec<RawMedicine>> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, records: &[RawMedicine]) -> Result<()> {
        *self
            .records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = records.to_vec();
        Ok(())
    }
}

/// A raw store plus the lock that serializes writers
pub struct RawMedicineStore {
    backend: Box<dyn RawStore>,
    write_lock: Mutex<()>,
}

impl RawMedicineStore {
    /// Wraps a backend.
    pub fn new(backend: impl RawStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            write_lock: Mutex::new(()),
        }
    }

    /// Reads the current list without taking the write lock.
    pub async fn load(&self) -> Result<Vec<RawMedicine>> {
        self.backend.load().await
    }

    /// Takes the write lock and loads the list for modification.
    ///
    /// The lock is held until the batch is committed or dropped.
    pub async fn begin(&self) -> Result<RawBatch<'_>> {
        let guard = self.write_lock.lock().await;
        let records = self.backend.load().await?;
        Ok(RawBatch {
            _guard: guard,
            backend: self.backend.as_ref(),
            records,
        })
    }
}

/// Records loaded under the write lock; dropping without commit discards changes
pub struct RawBatch<'a> {
    _guard: MutexGuard<'a, ()>,
    backend: &'a dyn RawStore,
    /// Working copy of the list
    pub records: Vec<RawMedicine>,
}

impl RawBatch<'_> {
    /// Saves the working copy and releases the lock.
    pub async fn commit(self) -> Result<()> {
        self.backend.save(&self.records).await
    }
}
