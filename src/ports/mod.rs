//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the resolution/change-log core
//! and the outside world (disk, subprocesses, version control).
//! Implementations live in `src/adapters/`.

pub mod filesystem;
pub mod runner;
pub mod vcs;

pub use filesystem::FileSystem;
pub use runner::{CommandOutput, CommandRunner};
pub use vcs::{CheckoutMode, VersionControl};

/// Error type of the filesystem and runner ports. Adapters wrap whatever
/// their backend raises.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;
