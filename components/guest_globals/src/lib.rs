//! Stub namespaces injected into the guest's global object.
//!
//! The guest's runtime resolves `fs`, `process`, and a byte-buffer
//! constructor during startup. Apart from `fs.write`, which forwards to
//! the host's standard streams, these are inert placeholders: addressable
//! and typed, answering unimplemented or no-op.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fs;
pub mod global;
pub mod process;

// Re-export main types at crate root
pub use fs::fs_namespace;
pub use global::{default_global, default_scope};
pub use process::process_namespace;
