//! Replaying adapter for the `FileSystem` port.

use std::path::Path;
use std::sync::Mutex;

use serde_json::json;

use super::{next_matching, replay_result};
use crate::cassette::format::Port;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{FileSystem, PortError};

/// Answers filesystem calls from a cassette. Writes are not applied.
pub struct ReplayingFileSystem {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSystem {
    /// Creates a replaying filesystem over `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self {
            replayer: Mutex::new(replayer),
        }
    }

    fn next(&self, method: &str, path: &Path) -> serde_json::Value {
        let input = json!({ "path": path.display().to_string() });
        next_matching(&self.replayer, Port::Fs, method, &input)
    }
}

impl FileSystem for ReplayingFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        replay_result(&self.next("read_to_string", path), "fs::read_to_string")
    }

    fn write(&self, path: &Path, _contents: &str) -> Result<(), PortError> {
        replay_result(&self.next("write", path), "fs::write")
    }

    fn exists(&self, path: &Path) -> bool {
        self.next("exists", path).as_bool().unwrap_or(false)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        replay_result(&self.next("list_dir", path), "fs::list_dir")
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), PortError> {
        replay_result(&self.next("create_dir_all", path), "fs::create_dir_all")
    }
}
