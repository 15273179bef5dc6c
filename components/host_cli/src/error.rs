//! Error types for the CLI.

use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Module file I/O error.
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse, instantiation, or execution error from the VM.
    #[error("wasm error: {0}")]
    Wasm(#[from] wasmi::Error),

    /// Import binding failed.
    #[error("link error: {0}")]
    Link(#[from] wasmi::errors::LinkerError),

    /// Guest memory access outside the module's bounds.
    #[error("guest memory error: {0}")]
    Memory(#[from] wasmi::errors::MemoryError),

    /// The module lacks a required export.
    #[error("guest module exports no {0:?}")]
    MissingExport(&'static str),

    /// Re-entry was requested after the guest signaled termination.
    #[error("guest has already exited")]
    GuestExited,
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
