//! In-memory directory implementation.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{Result, ShrikeError};
use crate::storage::directory::Directory;

/// An in-memory directory.
///
/// Backs temp indexes until they grow past the configured byte threshold,
/// and tests. Files are finalized as `Box<[u8]>` to keep the per-file
/// overhead low.
#[derive(Debug, Default)]
pub struct RamDirectory {
    files: Mutex<HashMap<String, Box<[u8]>>>,
    closed: Mutex<bool>,
}

impl RamDirectory {
    /// Create a new empty in-memory directory.
    pub fn new() -> Self {
        RamDirectory {
            files: Mutex::new(HashMap::new()),
            closed: Mutex::new(false),
        }
    }

    fn check_closed(&self) -> Result<()> {
        if *self.closed.lock() {
            Err(ShrikeError::storage("directory is closed"))
        } else {
            Ok(())
        }
    }

    /// The number of files held.
    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }
}

impl Directory for RamDirectory {
    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.check_closed()?;
        let files = self.files.lock();
        files
            .get(name)
            .map(|data| data.to_vec())
            .ok_or_else(|| ShrikeError::storage(format!("file not found: {name}")))
    }

    fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        self.check_closed()?;
        let mut files = self.files.lock();
        files.insert(name.to_string(), data.to_vec().into_boxed_slice());
        Ok(())
    }

    fn file_exists(&self, name: &str) -> bool {
        if *self.closed.lock() {
            return false;
        }
        self.files.lock().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.check_closed()?;
        self.files.lock().remove(name);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        self.check_closed()?;
        let mut names: Vec<String> = self.files.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn size_in_bytes(&self) -> Result<u64> {
        self.check_closed()?;
        let files = self.files.lock();
        Ok(files.values().map(|data| data.len() as u64).sum())
    }

    fn is_in_memory(&self) -> bool {
        true
    }

    fn close(&self) -> Result<()> {
        *self.closed.lock() = true;
        self.files.lock().clear();
        Ok(())
    }
}
