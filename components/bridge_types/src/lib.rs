//! Core value types shared across the bridge.
//!
//! This component provides:
//! - The [`HostValue`] enum describing every host value the guest can see
//! - Capability wrappers: [`Mapping`], [`Record`], [`ByteArray`], [`Callable`]
//! - The [`CallError`] type raised by host callables
//! - The [`StreamSink`] trait for guest-visible output streams

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod error;
pub mod sink;
pub mod value;

// Re-export main types at crate root
pub use buffer::ByteArray;
pub use error::{CallError, CallResult};
pub use sink::{CaptureSink, SinkHandle, StderrSink, StdoutSink, StreamSink};
pub use value::{Callable, HostValue, Mapping, Record};
