//! Core library for the `manifold` CLI.
//!
//! A workspace is a project repository whose manifest (`repo.xml` by
//! default) lists module repositories checked out beneath it. `manifold`
//! resolves the manifest into a [`state::Snapshot`], records snapshots as
//! numbered runs, and derives a change log of commits between consecutive
//! runs on the same branch.

pub mod adapters;
pub mod cassette;
pub mod changelog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod ports;
pub mod state;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli)
}
