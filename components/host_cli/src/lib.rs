//! Host CLI library.
//!
//! Provides the [`Runtime`] that instantiates a guest module on the VM,
//! binds the bridge import surface, and drives the entry and resume
//! points.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod runtime;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runtime::Runtime;
