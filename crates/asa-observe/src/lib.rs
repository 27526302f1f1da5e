//! Logging setup shared by ASA binaries.
mod logger;

pub use logger::*;
