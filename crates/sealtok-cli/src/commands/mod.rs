//! CLI command implementations for sealtok.

pub mod keys;
pub mod token;
