//! Command line arguments
//!
//! Global options apply to every command and override the configuration file.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "tweetbucket")]
#[command(about = "Tweet canonicalization and time-bucket aggregation")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true, value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", global = true, value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Force colored output
    #[arg(long = "color", global = true, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Aggregation bucket width in minutes
    #[arg(short = 'b', long = "bucket-minutes", value_name = "MINUTES", global = true)]
    pub bucket_minutes: Option<i64>,

    /// What to return when canonicalization strips everything
    #[arg(long = "empty-text", value_name = "POLICY", global = true, value_parser = ["original", "empty"])]
    pub empty_text: Option<String>,

    /// Decode HTML entities before canonicalizing
    #[arg(long = "decode-entities", global = true)]
    pub decode_entities: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the canonical form of each text (reads stdin lines when none given)
    Canonicalize {
        /// Texts to canonicalize
        texts: Vec<String>,
    },
    /// Aggregate tweets into time buckets and print a summary
    Buckets {
        #[command(flatten)]
        input: InputArgs,

        /// Output format
        #[arg(long = "format", value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Find the busiest bucket near a point in time
    Locate {
        #[command(flatten)]
        input: InputArgs,

        /// Point in time (RFC 3339, YYYY-MM-DD HH:MM, epoch ms, or relative)
        #[arg(long = "at", value_name = "DATE_TIME")]
        at: String,

        /// Search tolerance either side of --at, in minutes
        #[arg(long = "tolerance-minutes", value_name = "MINUTES")]
        tolerance_minutes: Option<i64>,
    },
    /// Compute the chart window end after scrolling by whole buckets
    Scroll {
        #[command(flatten)]
        input: InputArgs,

        /// Current window end (defaults to the last loaded bucket)
        #[arg(long = "end", value_name = "DATE_TIME")]
        end: Option<String>,

        /// Buckets to scroll; negative scrolls back in time
        #[arg(long = "distance", value_name = "BUCKETS", allow_hyphen_values = true)]
        distance: i64,

        /// Skip closed market hours
        #[arg(long = "market-hours-only")]
        market_hours_only: bool,

        /// Days of data retained before the last tweet
        #[arg(long = "days-to-sync", value_name = "DAYS")]
        days_to_sync: Option<u32>,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InputArgs {
    /// JSON Lines file with one tweet per line
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Args {
    /// Color override from the command line: `Some` only when a flag was given
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
