//! Filesystem directory implementation.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Result, ShrikeError};
use crate::storage::directory::Directory;

/// A directory backed by a filesystem path.
#[derive(Debug)]
pub struct FsDirectory {
    root: PathBuf,
    closed: Mutex<bool>,
}

impl FsDirectory {
    /// Open or create a filesystem directory at the given path.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root)
                .map_err(|e| ShrikeError::storage(format!("failed to create directory: {e}")))?;
        }
        if !root.is_dir() {
            return Err(ShrikeError::storage(format!(
                "path is not a directory: {}",
                root.display()
            )));
        }

        Ok(FsDirectory {
            root,
            closed: Mutex::new(false),
        })
    }

    /// The filesystem path of this directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn check_closed(&self) -> Result<()> {
        if *self.closed.lock() {
            Err(ShrikeError::storage("directory is closed"))
        } else {
            Ok(())
        }
    }
}

impl Directory for FsDirectory {
    fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        self.check_closed()?;
        fs::read(self.file_path(name))
            .map_err(|e| ShrikeError::storage(format!("failed to read {name}: {e}")))
    }

    fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        self.check_closed()?;
        // Write through a temp name and rename so readers never see a
        // half-written file.
        let tmp = self.file_path(&format!("{name}.tmp"));
        fs::write(&tmp, data)
            .map_err(|e| ShrikeError::storage(format!("failed to write {name}: {e}")))?;
        fs::rename(&tmp, self.file_path(name))
            .map_err(|e| ShrikeError::storage(format!("failed to publish {name}: {e}")))?;
        Ok(())
    }

    fn file_exists(&self, name: &str) -> bool {
        if *self.closed.lock() {
            return false;
        }
        self.file_path(name).is_file()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        self.check_closed()?;
        match fs::remove_file(self.file_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ShrikeError::storage(format!("failed to delete {name}: {e}"))),
        }
    }

    fn list_files(&self) -> Result<Vec<String>> {
        self.check_closed()?;
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.root)
            .map_err(|e| ShrikeError::storage(format!("failed to list directory: {e}")))?;
        for entry in entries {
            let entry = entry.map_err(|e| ShrikeError::storage(e.to_string()))?;
            if entry.path().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn size_in_bytes(&self) -> Result<u64> {
        self.check_closed()?;
        let mut total = 0;
        for name in self.list_files()? {
            let meta = fs::metadata(self.file_path(&name))
                .map_err(|e| ShrikeError::storage(e.to_string()))?;
            total += meta.len();
        }
        Ok(total)
    }

    fn close(&self) -> Result<()> {
        *self.closed.lock() = true;
        Ok(())
    }
}
