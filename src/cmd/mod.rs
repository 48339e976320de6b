//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`] or [`health`]. Each handler lives in its
//! own submodule.

pub mod health;
pub mod run;

use crate::cli::{Cli, Commands};
use crate::error::TagRelayError;

pub async fn dispatch(cli: Cli) -> Result<(), TagRelayError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  tagrelay v{version} \u{2014} first-party analytics collection proxy\n\n  \
         No command provided. To get started:\n\n    \
         tagrelay run --allow-origins https://example.com    Start the proxy on :8080\n    \
         tagrelay health                                     Check a running instance\n    \
         tagrelay --help                                     See all commands and options\n"
    );
}
