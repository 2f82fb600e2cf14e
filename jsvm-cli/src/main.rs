//! # jsvm
//!
//! Command-line host for jsvm scripts.
//!
//! ## Running
//!
//! ```bash
//! # Call main(3, 4) from a script
//! jsvm run script.js --arg 3 --arg 4
//!
//! # Call another function
//! jsvm run script.js --function transform --arg '{"name": "x"}'
//!
//! # Only load the script
//! jsvm check script.js
//!
//! # With debug logging
//! RUST_LOG=debug jsvm run script.js
//! ```
//!
//! ## Configuration
//!
//! Read from `--config` or `$XDG_CONFIG_HOME/jsvm/config.toml`.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use jsvm_cli::cli::{Cli, Command};
use jsvm_cli::commands;
use jsvm_cli::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is configured from the config file, so load it first and
    // report how it went once the subscriber is up.
    let (mut config, config_note) = match &cli.config {
        Some(path) => (Config::load(path)?, format!("Loaded configuration from {}", path.display())),
        None => match Config::load_default() {
            Ok(cfg) => (cfg, "Loaded configuration from default path".to_string()),
            Err(e) => (Config::default(), format!("Failed to load config, using defaults: {:#}", e)),
        },
    };

    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
        config.validate()?;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level().map(|l| l.as_str()).unwrap_or("warn")));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!("{}", config_note);
    info!("Starting jsvm v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Run(args) => {
            let result = commands::run(&config, args)?;
            println!("{}", commands::render(&result, args.pretty)?);
        }
        Command::Check(args) => {
            commands::check(&config, args)?;
            println!("ok");
        }
    }

    Ok(())
}
