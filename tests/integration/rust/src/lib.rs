//! Integration test suite for the Rivet WASM host bridge
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use bridge_types;
    pub use guest_globals;
    pub use guest_memory;
    pub use host_cli;
    pub use value_bridge;
}
