use crate::errors::StorageError;
use std::collections::BTreeMap;
use std::{fs, io, path::Path, path::PathBuf};

/// Slot the live document is saved to.
pub const PRIMARY_SLOT: &str = "habit-tracker-v1";
/// Older slots `load` migrates from, in priority order.
pub const LEGACY_SLOTS: [&str; 1] = ["habit-tracker-v2"];
/// Any slot whose name contains this is considered by the recovery scan.
pub const RECOVERY_MARKER: &str = "habit-tracker";

/// Named blobs of raw text, the on-device storage the state lives in.
pub trait SlotStore {
    /// Returns `Ok(None)` when the slot does not exist.
    fn load_raw(&self, slot: &str) -> Result<Option<String>, StorageError>;
    fn save_raw(&mut self, slot: &str, data: &str) -> Result<(), StorageError>;
    /// All slot names, sorted.
    fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// One `<slot>.json` file per slot inside a data directory.
#[derive(Debug, Clone)]
pub struct FsSlotStore {
    dir: PathBuf,
}

impl FsSlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, slot: &str) -> Result<PathBuf, StorageError> {
        if slot.is_empty() || slot == "." || slot == ".." || slot.contains(['/', '\\']) {
            return Err(StorageError::InvalidSlotName(slot.to_string()));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

impl SlotStore for FsSlotStore {
    fn load_raw(&self, slot: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(slot)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn save_raw(&mut self, slot: &str, data: &str) -> Result<(), StorageError> {
        let path = self.path_for(slot)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, data).map_err(|source| StorageError::Io { path, source })
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut slots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            if let Some(slot) = name.to_str().and_then(|name| name.strip_suffix(".json")) {
                if !slot.is_empty() {
                    slots.push(slot.to_string());
                }
            }
        }
        slots.sort();
        Ok(slots)
    }
}

/// Slots held in memory. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: BTreeMap<String, String>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, slot: &str, data: impl Into<String>) -> Self {
        self.slots.insert(slot.to_string(), data.into());
        self
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }
}

impl SlotStore for MemorySlotStore {
    fn load_raw(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(slot).cloned())
    }

    fn save_raw(&mut self, slot: &str, data: &str) -> Result<(), StorageError> {
        self.slots.insert(slot.to_string(), data.to_string());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.slots.keys().cloned().collect())
    }
}
