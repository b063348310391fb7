//! Core data model types for a part's metadata and headers.

pub mod header;
pub mod metadata;
