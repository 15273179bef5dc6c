//! Rivet host CLI.
//!
//! Entry point for running a guest wasm module. Parses CLI arguments
//! and delegates to the Runtime for instantiation and execution.

use clap::Parser;
use host_cli::{Cli, CliError, CliResult, Runtime};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(&cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code as i32),
        Err(CliError::Io(e)) => {
            eprintln!("Error: could not read module '{}': {}", cli.module, e);
            std::process::exit(1);
        }
        Err(CliError::Wasm(e)) => {
            eprintln!("Error: guest module failed: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn execute(cli: &Cli) -> CliResult<u32> {
    let mut runtime = Runtime::from_file(&cli.module)?
        .with_args(&cli.args)
        .with_max_resumes(cli.max_resumes);
    runtime.run()
}
