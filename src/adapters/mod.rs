//! Adapters implementing the port traits.
//!
//! `live` talks to the real disk and spawns real processes, `recording`
//! wraps another adapter and captures every interaction into a cassette,
//! and `replaying` serves previously captured interactions back. The
//! [`git::GitCli`] facade sits on top of whichever runner is wired in.

pub mod git;
pub mod live;
pub mod recording;
pub mod replaying;
