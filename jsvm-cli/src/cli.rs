use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Load a JavaScript file and call its functions.
#[derive(Parser, Debug)]
#[command(name = "jsvm", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/jsvm/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a function from a script and print its result as JSON.
    Run(RunArgs),

    /// Load a script and run its top-level code without calling anything.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the script file.
    pub script: PathBuf,

    /// Function to call (defaults to the configured entry point).
    #[arg(short, long)]
    pub function: Option<String>,

    /// Argument for the function, as JSON. Repeat for more arguments.
    /// Text that is not valid JSON is passed as a string.
    #[arg(short = 'a', long = "arg", value_name = "JSON")]
    pub args: Vec<String>,

    /// Pretty-print the result.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the script file.
    pub script: PathBuf,
}
