//! Shared infrastructure: errors, logging, styling and build metadata

pub mod error_handling;
pub mod logging;
pub mod styles;
pub mod version;
