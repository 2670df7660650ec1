//! Command implementations

mod config;
mod crs;
mod extract;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Extract(args) => extract::execute(args, config_path, output),
        Commands::Config => config::execute(config_path, output),
        Commands::Crs(args) => crs::execute(args, output),
    }
}
