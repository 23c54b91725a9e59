//! Utilities shared by the Tayori binaries.

pub mod logger;
pub mod time;
