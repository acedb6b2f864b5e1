//! RogueFS CLI Binary

use clap::Parser;
use roguefs::cli::{map_error, Cli, RunContext};
use roguefs::config::ConfigLoader;
use roguefs::index::StorageLocation;
use roguefs::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    debug!("RogueFS CLI starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error opening index: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    if let StorageLocation::Fallback { wanted, used, reason } = context.location() {
        eprintln!(
            "warning: could not open index at {} ({}); using {}",
            wanted.display(),
            reason,
            used.display()
        );
    }

    match context.execute(&cli.command, cli.format) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Logging config from the config files, then CLI flags on top.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = ConfigLoader::new(cli.workspace.clone())
        .with_file(cli.config.clone())
        .load()
        .map(|c| c.logging)
        .unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }
    config
}
