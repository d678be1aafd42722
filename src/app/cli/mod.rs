//! Argument parsing, configuration and output formatting

pub mod args;
pub mod config;
pub mod date_parser;
pub mod display;
