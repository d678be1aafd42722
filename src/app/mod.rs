//! Command line host around the feed library

pub mod cli;
pub mod commands;
pub mod startup;
