//! Recording adapter for the `FileSystem` port.

use std::path::Path;

use serde::Serialize;

use super::{record_result, record_value};
use crate::cassette::session::SharedRecorder;
use crate::ports::{FileSystem, PortError};

/// Filesystem that records every call made on an inner filesystem.
pub struct RecordingFileSystem {
    inner: Box<dyn FileSystem>,
    recorder: SharedRecorder,
}

impl RecordingFileSystem {
    /// Wraps `inner`, logging to `recorder`.
    pub fn new(inner: Box<dyn FileSystem>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct PathInput {
    path: String,
}

impl PathInput {
    fn of(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
        }
    }
}

#[derive(Serialize)]
struct WriteInput<'a> {
    path: String,
    bytes: usize,
    contents: &'a str,
}

impl FileSystem for RecordingFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        let result = self.inner.read_to_string(path);
        record_result(&self.recorder, "read_to_string", &PathInput::of(path), &result);
        result
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        let result = self.inner.write(path, contents);
        let input = WriteInput {
            path: path.display().to_string(),
            bytes: contents.len(),
            contents,
        };
        record_result(&self.recorder, "write", &input, &result);
        result
    }

    fn exists(&self, path: &Path) -> bool {
        let exists = self.inner.exists(path);
        record_value(&self.recorder, "exists", &PathInput::of(path), &exists);
        exists
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let result = self.inner.list_dir(path);
        record_result(&self.recorder, "list_dir", &PathInput::of(path), &result);
        result
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), PortError> {
        let result = self.inner.create_dir_all(path);
        record_result(&self.recorder, "create_dir_all", &PathInput::of(path), &result);
        result
    }
}
