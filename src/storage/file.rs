use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use super::{SlotError, SlotStore};

pub const SLOTS_FILE: &str = "slots.json";

/// Write `bytes` to `path` by persisting a sibling temp file over it.
///
/// The parent directory must already exist; on failure the previous file is
/// left untouched.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Slots kept as a single JSON object file of `key -> string` pairs.
///
/// The file is re-read on every access so that another process writing the
/// same file is observed.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn open(dir: &Path) -> Result<Self, SlotError> {
        fs::create_dir_all(dir)?;
        Ok(Self::at(dir.join(SLOTS_FILE)))
    }

    pub fn at(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SlotError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, slots: &BTreeMap<String, String>) -> Result<(), SlotError> {
        let payload = serde_json::to_vec_pretty(slots)?;
        write_atomic(&self.path, &payload)?;
        debug!(
            target: "folio",
            event = "slots_written",
            path = %self.path.display(),
            keys = slots.len()
        );
        Ok(())
    }
}

impl SlotStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SlotError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut slots = self.read_all()?;
        slots.insert(key.to_string(), value.to_string());
        self.write_all(&slots)
    }

    fn remove(&self, key: &str) -> Result<(), SlotError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut slots = self.read_all()?;
        if slots.remove(key).is_some() {
            self.write_all(&slots)?;
        }
        Ok(())
    }
}
