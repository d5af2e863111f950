//! togethercal - integration test support.
//!
//! This crate re-exports the workspace crates to support integration tests
//! that use `togethercal::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    // Re-export core and service modules at the component level
    pub use togethercal_core::*;
    pub use togethercal_service::*;

    // Re-export the store crate with all its public modules
    pub mod store {
        pub use togethercal_store::*;
    }
}
