//! The directory abstraction index storage is written through.

use crate::error::Result;

/// An opaque storage backend holding the files of one index.
///
/// The index core never inspects file contents; it reads and writes whole
/// files and asks for aggregate size when deciding on RAM-to-disk
/// promotion. A directory is exclusively owned by its index.
pub trait Directory: Send + Sync + std::fmt::Debug {
    /// Read the full contents of a file.
    fn read_file(&self, name: &str) -> Result<Vec<u8>>;

    /// Create or replace a file with the given contents.
    fn write_file(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Check whether a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all files in the directory.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Total size of all files in bytes.
    fn size_in_bytes(&self) -> Result<u64>;

    /// Whether this directory lives in memory.
    fn is_in_memory(&self) -> bool {
        false
    }

    /// Copy every file into `target`. Used when a RAM-resident index is
    /// promoted to persistent storage; the source stays readable so
    /// in-flight snapshot leases are unaffected.
    fn copy_to(&self, target: &dyn Directory) -> Result<()> {
        for name in self.list_files()? {
            target.write_file(&name, &self.read_file(&name)?)?;
        }
        Ok(())
    }

    /// Close the directory and release resources.
    fn close(&self) -> Result<()>;
}
