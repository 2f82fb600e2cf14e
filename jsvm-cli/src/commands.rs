//! Command handlers.
//!
//! Handlers return values instead of printing so they can be exercised from
//! tests; `main` owns all output.

use crate::cli::{CheckArgs, RunArgs};
use crate::config::Config;
use anyhow::{Context, Result};
use jsvm_runtime::Runtime;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Parse `--arg` values. Text that is not valid JSON becomes a string.
pub fn parse_args(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

fn load(config: &Config, script: &Path) -> Result<Runtime> {
    Runtime::from_file_with_config(script, config.runtime.clone())
        .with_context(|| format!("Failed to load script: {}", script.display()))
}

/// Handle `jsvm run`.
pub fn run(config: &Config, args: &RunArgs) -> Result<Value> {
    let runtime = load(config, &args.script)?;
    let function = args
        .function
        .as_deref()
        .unwrap_or(&config.runtime.entry_point);
    let call_args = parse_args(&args.args);

    debug!("Calling {} with {} argument(s)", function, call_args.len());
    let result = runtime.run_func(function, &call_args)?;

    info!("Function {} returned", function);
    Ok(result)
}

/// Handle `jsvm check`.
pub fn check(config: &Config, args: &CheckArgs) -> Result<()> {
    load(config, &args.script)?;
    info!("Script {} loaded", args.script.display());
    Ok(())
}

/// Render a result for printing.
pub fn render(value: &Value, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}
