//! Typed access to the guest's linear memory.
//!
//! This component provides:
//! - The [`MemoryAccessor`] trait: little-endian typed reads and writes at
//!   guest addresses, plus the compound (pointer, length) loaders used by
//!   the stack-pointer calling convention
//! - [`SliceMemory`]: a borrowed view over a VM's exported memory
//! - [`VecMemory`]: an owned memory image for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;

// Re-export main types at crate root
pub use accessor::{MemoryAccessor, SliceMemory, VecMemory};
