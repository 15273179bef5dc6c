//! Errors raised by host callables and the call dispatcher.

use thiserror::Error;

/// Failure of a call or construction on a host value.
///
/// These errors never cross the guest boundary as panics; the bridge
/// encodes them as guest-visible error values with a cleared ok flag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The receiver has no member with the requested name.
    #[error("no method {method:?} on {target}")]
    MissingMethod {
        /// The member name that was looked up.
        method: String,
        /// Kind of the receiver value.
        target: &'static str,
    },

    /// The resolved member is not callable.
    #[error("{0:?} is not a function")]
    NotCallable(String),

    /// The record's schema has no field with the requested name.
    #[error("unknown field {0:?} on record")]
    UnknownField(String),

    /// An argument had the wrong kind or an out-of-range value.
    #[error("invalid argument: {0}")]
    BadArgument(String),

    /// The value kind does not support the attempted operation.
    #[error("{kind} does not support {operation}")]
    Unsupported {
        /// Kind of the value the operation was attempted on.
        kind: &'static str,
        /// The unsupported operation, e.g. "construction".
        operation: &'static str,
    },

    /// The callee panicked; the panic was contained at the call boundary.
    #[error("callee panicked: {0}")]
    Panicked(String),

    /// The callee returned a failure of its own.
    #[error("{0}")]
    Failed(String),
}

/// Result type for operations on host values.
pub type CallResult<T> = Result<T, CallError>;
