//! Command implementations
//!
//! Each command reads its input, runs the feed operations and writes its
//! result to the given writer.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::cli::args::{Command, OutputFormat};
use super::cli::config::{minutes_to_millis, Settings};
use super::cli::date_parser::{format_millis, parse_date};
use super::cli::display;
use crate::feed::loader::load_tweets;
use crate::feed::{
    AlwaysOpen, FeedError, FeedResult, MarketCalendar, Millis, Normalizer, ScrollBounds,
    ScrollCursor, TimeBucket, TimeBucketAggregator,
};

/// Run `command` with the resolved settings
pub fn run<W: Write>(
    command: &Command,
    settings: &Settings,
    use_color: bool,
    out: &mut W,
) -> FeedResult<()> {
    match command {
        Command::Canonicalize { texts } => {
            let normalizer = settings.normalizer();
            if texts.is_empty() {
                let stdin = std::io::stdin();
                canonicalize_lines(stdin.lock(), &normalizer, out)
            } else {
                canonicalize_texts(texts, &normalizer, out)
            }
        }
        Command::Buckets { input, format } => {
            let aggregator = aggregate(&input.input, settings)?;
            let summaries = display::summarize(aggregator.buckets());
            match format {
                OutputFormat::Table => display::print_table(out, &summaries, use_color),
                OutputFormat::Json => display::write_json(out, &summaries),
            }
        }
        Command::Locate {
            input,
            at,
            tolerance_minutes,
        } => {
            let aggregator = aggregate(&input.input, settings)?;
            let timestamp = parse_date(at)?;
            let tolerance = match tolerance_minutes {
                Some(minutes) => minutes_to_millis(*minutes, "tolerance-minutes")?,
                None => settings.tolerance(),
            };
            match locate(&aggregator, timestamp, tolerance) {
                Some(bucket) => {
                    let summaries = display::summarize(std::slice::from_ref(bucket));
                    display::write_json(out, &summaries)
                }
                None => {
                    eprintln!(
                        "No bucket within {} minutes of {}",
                        tolerance / crate::feed::MILLIS_PER_MINUTE,
                        format_millis(timestamp)
                    );
                    Ok(())
                }
            }
        }
        Command::Scroll {
            input,
            end,
            distance,
            market_hours_only,
            days_to_sync,
        } => {
            let aggregator = aggregate(&input.input, settings)?;
            let current_end = end.as_deref().map(parse_date).transpose()?;
            let request = ScrollRequest {
                distance: *distance,
                current_end,
                market_hours_only: *market_hours_only || settings.market_hours_only,
                days_to_sync: days_to_sync.unwrap_or(settings.days_to_sync),
            };
            match scroll(&aggregator, settings, &request) {
                Some(new_end) => {
                    write_line(out, &format!("{}\t{}", new_end, format_millis(new_end)))
                }
                None => {
                    eprintln!("No tweets loaded; nothing to scroll");
                    Ok(())
                }
            }
        }
    }
}

/// Canonicalize each argument, one result per line
pub fn canonicalize_texts<W: Write>(
    texts: &[String],
    normalizer: &Normalizer,
    out: &mut W,
) -> FeedResult<()> {
    for text in texts {
        write_line(out, &normalizer.canonicalize(text))?;
    }
    Ok(())
}

/// Canonicalize each input line, one result per line
pub fn canonicalize_lines<R: BufRead, W: Write>(
    reader: R,
    normalizer: &Normalizer,
    out: &mut W,
) -> FeedResult<()> {
    for line in reader.lines() {
        let line = line.map_err(|source| FeedError::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
        write_line(out, &normalizer.canonicalize(&line))?;
    }
    Ok(())
}

/// Load `path` and aggregate it with the configured width and normalizer
pub fn aggregate(path: &Path, settings: &Settings) -> FeedResult<TimeBucketAggregator> {
    let tweets = load_tweets(path)?;
    let mut aggregator = TimeBucketAggregator::new(settings.bucket_width(), settings.normalizer());
    aggregator.extend(tweets);
    log::info!(
        "Aggregated {} tweets into {} buckets",
        aggregator.item_count(),
        aggregator.buckets().len()
    );
    Ok(aggregator)
}

/// Busiest bucket within `tolerance` of `timestamp`
pub fn locate(
    aggregator: &TimeBucketAggregator,
    timestamp: Millis,
    tolerance: Millis,
) -> Option<&TimeBucket> {
    aggregator
        .find_bucket_position_near(timestamp, tolerance)
        .map(|position| &aggregator.buckets()[position])
}

/// Parameters of one scroll gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub distance: i64,
    /// Window end before scrolling; the last bucket when `None`
    pub current_end: Option<Millis>,
    pub market_hours_only: bool,
    pub days_to_sync: u32,
}

/// New window end, or `None` when no buckets are loaded.
///
/// Buckets starting after the current end are treated as not yet on screen.
pub fn scroll(
    aggregator: &TimeBucketAggregator,
    settings: &Settings,
    request: &ScrollRequest,
) -> Option<Millis> {
    let starts = aggregator.bucket_starts();
    let last = *starts.last()?;
    let current_end = request.current_end.unwrap_or(last);
    let visible: Vec<Millis> = starts
        .iter()
        .copied()
        .filter(|start| *start <= current_end)
        .collect();

    let bounds = ScrollBounds::from_retention(last, request.days_to_sync);
    let trading_hours = settings.calendar();
    let calendar: &dyn MarketCalendar = if request.market_hours_only {
        &trading_hours
    } else {
        &AlwaysOpen
    };
    let cursor = ScrollCursor::new(
        settings.bucket_width(),
        request.market_hours_only,
        calendar,
        bounds,
    );
    Some(cursor.scroll(request.distance, &visible, current_end))
}

fn write_line<W: Write>(out: &mut W, line: &str) -> FeedResult<()> {
    writeln!(out, "{}", line).map_err(|source| FeedError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    })
}
