// JSON file per slot

use crate::error::{Error, Result};
use crate::storage::Storage;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores slot `key` in `{dir}/{key}.json`
///
/// Writes go to `{key}.json.tmp` and are renamed over the slot file, so a
/// reader sees either the previous value or the new one. `{key}.lock`
/// serializes writers against each other and against readers.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let base_path = dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Path of the file backing `key`
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        Self::validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    fn lock_file(&self, key: &str) -> Result<File> {
        let path = self.base_path.join(format!("{}.lock", key));
        let file = OpenOptions::new().create(true).write(true).truncate(false).open(path)?;
        Ok(file)
    }

    fn validate_key(key: &str) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if key.is_empty() {
            return Err(invalid("empty"));
        }
        if key.len() > 64 {
            return Err(invalid("max 64 chars"));
        }
        if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
            return Err(invalid("must be alphanumeric with _/-"));
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;

        let lock = self.lock_file(key)?;
        lock.lock_shared()?;

        if !path.exists() {
            debug!(file = ?path, "slot file missing");
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        debug!(file = ?path, bytes = bytes.len(), "slot file read");

        // Decoded lossily; the replacement characters fail JSON parsing like any other corrupt content
        let value = match String::from_utf8(bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!(file = ?path, error = ?e.utf8_error(), "Slot file is not valid UTF-8");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));

        let lock = self.lock_file(key)?;
        lock.lock_exclusive()?;

        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(value.as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &path)?;

        debug!(file = ?path, bytes = value.len(), "slot file written");
        Ok(())
    }
}
