//! Header parsing helpers: header blocks, structured values, and part scanning.

pub mod header;
pub mod part;
