//! Binary entrypoint for the `manifold` CLI.

use std::process::ExitCode;

use clap::Parser;
use manifold::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    manifold::logging::init(cli.global.verbose);

    // Recording is handled in commands::dispatch via MANIFOLD_RECORD=<dir>.
    match manifold::commands::dispatch(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
