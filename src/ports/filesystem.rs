//! Disk access used by manifest resolution, sync, and the state store.

use std::path::Path;

use super::PortError;

/// Reads and writes workspace files and the state store.
///
/// Every path handed to the port is absolute or relative to the process
/// working directory; the port does no path resolution of its own.
pub trait FileSystem: Send + Sync {
    /// Reads a whole UTF-8 file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, PortError>;

    /// Replaces a file, creating missing parent directories.
    ///
    /// Readers see either the old or the new contents, never a mix.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError>;

    /// Returns `true` if `path` names a file or directory.
    fn exists(&self, path: &Path) -> bool;

    /// Entry names of a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a readable directory.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError>;

    /// Creates `path` and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<(), PortError>;
}
