//! Shared foundation for the togethercal workspace: error taxonomy,
//! configuration loading, and the event kind tag.

pub mod config;
pub mod error;
pub mod types;
