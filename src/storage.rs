use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Named durable string slots.
pub trait SlotStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per slot under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.slot_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        // Rename replaces the slot in one step; readers see the old or the new snapshot.
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: &str, value: &str) -> Self {
        let storage = Self::default();
        if let Ok(mut slots) = storage.slots.lock() {
            slots.insert(key.to_string(), value.to_string());
        }
        storage
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.read("nothing").unwrap(), None);
    }

    #[test]
    fn write_creates_directory_and_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        storage.write("slot", "[1]").unwrap();
        storage.write("slot", "[1,2]").unwrap();
        assert_eq!(storage.read("slot").unwrap().as_deref(), Some("[1,2]"));
        assert!(!storage.dir().join(".slot.json.tmp").exists());
    }

    #[test]
    fn memory_storage_round_trips() {
        let storage = MemoryStorage::with_slot("a", "x");
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("x"));
        storage.write("a", "y").unwrap();
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("y"));
        assert_eq!(storage.read("b").unwrap(), None);
    }
}
