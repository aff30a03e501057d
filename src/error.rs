//! Error taxonomy shared across resolution, extraction, and persistence.

use thiserror::Error;

/// A manifest that is malformed, ambiguous, or names an invalid origin.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {path}: {message}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O message.
        message: String,
    },

    /// The document is not well-formed XML.
    #[error("manifest is not well-formed: {0}")]
    Parse(#[from] roxmltree::Error),

    /// An element that may appear at most once appeared several times.
    #[error("manifest contains multiple <{element} /> elements")]
    Duplicate {
        /// Element name.
        element: &'static str,
    },

    /// A required element is missing.
    #[error("manifest is missing the <{element} /> element")]
    MissingElement {
        /// Element name.
        element: &'static str,
    },

    /// A required attribute is missing or blank.
    #[error("<{element} /> element is missing attribute [{attribute}]")]
    MissingAttribute {
        /// Element name.
        element: &'static str,
        /// Attribute name.
        attribute: &'static str,
    },

    /// An origin is not a usable repository URL.
    #[error("invalid origin {origin:?}: {reason}")]
    InvalidOrigin {
        /// The origin as written in the manifest.
        origin: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A relative origin has nothing to resolve against.
    #[error("cannot resolve relative origin {origin:?}: {reason}")]
    UnresolvableOrigin {
        /// The relative origin.
        origin: String,
        /// Why resolution failed.
        reason: String,
    },

    /// Two modules resolve to the same workspace path.
    #[error("more than one module resolves to path {path:?}")]
    DuplicatePath {
        /// The contested path.
        path: String,
    },
}

/// A version-control invocation that failed.
#[derive(Debug, Error)]
pub enum VcsCommandError {
    /// The command ran and exited with a non-zero status.
    #[error("git failed to execute [{command}] (exit code {exit_code}){}", stderr_suffix(.stderr))]
    Failed {
        /// Rendered command line.
        command: String,
        /// Exit status reported by the process.
        exit_code: i32,
        /// Captured standard error.
        stderr: String,
    },

    /// The command could not be started at all.
    #[error("git failed to execute [{command}]: {message}")]
    Spawn {
        /// Rendered command line.
        command: String,
        /// Launcher error message.
        message: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// A persisted change log that cannot be read or written.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The document could not be read.
    #[error("failed to read change log {path}: {message}")]
    Read {
        /// Source path.
        path: String,
        /// Underlying I/O message.
        message: String,
    },

    /// The document could not be written.
    #[error("failed to write change log {path}: {message}")]
    Write {
        /// Destination path.
        path: String,
        /// Underlying I/O message.
        message: String,
    },

    /// The document is not a structurally valid change log.
    #[error("change log is corrupt: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// The document was written by an incompatible version.
    #[error("unsupported change log version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },
}

/// Failures of the snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the store failed.
    #[error("snapshot store I/O failed for {path}: {message}")]
    Io {
        /// Path involved.
        path: String,
        /// Underlying message.
        message: String,
    },

    /// A persisted snapshot could not be decoded.
    #[error("snapshot {path} is corrupt: {source}")]
    Malformed {
        /// Path of the document.
        path: String,
        /// Decoder error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Serializing a snapshot failed.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_yaml::Error),
}

/// Crate-level error umbrella.
#[derive(Debug, Error)]
pub enum Error {
    /// Manifest resolution failed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A version-control command failed.
    #[error(transparent)]
    Vcs(#[from] VcsCommandError),

    /// Change-log persistence failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Snapshot persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid runtime configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias for results that bubble [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
