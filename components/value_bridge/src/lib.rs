//! The foreign-value bridge between host values and guest memory.
//!
//! This component provides:
//! - [`ForeignTable`]: reference-counted integer identities for host values
//! - The wire codec: 8-byte NaN-boxed encode/decode of host values
//! - The call dispatcher with panic containment
//! - [`BridgeContext`]: per-guest state and the named bridge operations
//!   invoked through the stack-pointer calling convention

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod context;
pub mod dispatch;
pub mod ops;
pub mod ref_table;

// Re-export main types at crate root
pub use codec::{decode_value, encode_value, load_value_slice, NAN_HEAD};
pub use context::BridgeContext;
pub use dispatch::{construct, dispatch_call, resolve_method};
pub use ops::IMPORT_NAMES;
pub use ref_table::{reserved, ForeignTable};
