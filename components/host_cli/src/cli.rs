//! Command-line interface definition.

use clap::Parser;

/// Command-line arguments for the host.
#[derive(Debug, Parser)]
#[command(
    name = "rivet-host",
    about = "Runs script-host wasm guests on a plain interpreter",
    version
)]
pub struct Cli {
    /// Path to the guest wasm module
    pub module: String,

    /// Arguments passed through to the guest program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Cap on resume turns serviced after the entry point returns
    #[arg(long, default_value_t = 64)]
    pub max_resumes: u32,
}
