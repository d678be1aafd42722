//! Bucket summaries for the terminal (prettytable) and for scripts (JSON)

use std::io::Write;

use prettytable::{format, Cell, Row, Table};
use serde::Serialize;

use super::date_parser::format_millis;
use crate::core::styles::StyleRole;
use crate::feed::{FeedError, FeedResult, Millis, TimeBucket};

/// Longest text shown in a table cell before truncation
const TEXT_COLUMN_WIDTH: usize = 60;

/// One bucket as reported by the `buckets` and `locate` commands
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub start: Millis,
    pub start_utc: String,
    pub item_count: usize,
    pub max_repeat_count: u32,
    /// Canonical text of the top-ranked item
    pub most_repeated: Option<String>,
    /// Repeat total (retweets) of the top-ranked item
    pub retweets: u32,
    /// Whether the top-ranked item links out
    pub has_links: bool,
}

impl From<&TimeBucket> for BucketSummary {
    fn from(bucket: &TimeBucket) -> Self {
        let top = bucket.most_repeated();
        Self {
            start: bucket.start(),
            start_utc: format_millis(bucket.start()),
            item_count: bucket.item_count(),
            max_repeat_count: bucket.max_repeat_count(),
            most_repeated: top.map(|item| item.canonical_text().to_string()),
            retweets: top.map_or(0, |item| item.repeat_total()),
            has_links: top.is_some_and(|item| item.has_links()),
        }
    }
}

pub fn summarize(buckets: &[TimeBucket]) -> Vec<BucketSummary> {
    buckets.iter().map(BucketSummary::from).collect()
}

/// Build the bucket table; color specs are only attached when `use_color` is set
pub fn bucket_table(summaries: &[BucketSummary], use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

    let header = StyleRole::Header.table_spec(use_color);
    table.set_titles(Row::new(
        ["Bucket (UTC)", "Tweets", "Max repeats", "Retweets", "Most repeated"]
            .iter()
            .map(|title| Cell::new(title).style_spec(&header))
            .collect(),
    ));

    for summary in summaries {
        let text = summary
            .most_repeated
            .as_deref()
            .map(|t| truncate(t, TEXT_COLUMN_WIDTH))
            .unwrap_or_default();
        table.add_row(Row::new(vec![
            Cell::new(&summary.start_utc).style_spec(&StyleRole::Timestamp.table_spec(use_color)),
            Cell::new(&summary.item_count.to_string()).style_spec("r"),
            Cell::new(&summary.max_repeat_count.to_string())
                .style_spec(&format!("r{}", StyleRole::Count.table_spec(use_color))),
            Cell::new(&summary.retweets.to_string()).style_spec("r"),
            Cell::new(&text),
        ]));
    }
    table
}

/// Print summaries as a table.
///
/// Colored tables go to the terminal directly, since prettytable only colors
/// terminal output; plain tables are written to `out`.
pub fn print_table<W: Write>(
    out: &mut W,
    summaries: &[BucketSummary],
    use_color: bool,
) -> FeedResult<()> {
    if summaries.is_empty() {
        eprintln!("No buckets.");
        return Ok(());
    }
    let table = bucket_table(summaries, use_color);
    if use_color {
        table.print_tty(true).map_err(output_error)?;
    } else {
        table.print(out).map_err(output_error)?;
    }
    Ok(())
}

/// Write summaries as pretty JSON
pub fn write_json<W: Write>(out: &mut W, summaries: &[BucketSummary]) -> FeedResult<()> {
    serde_json::to_writer_pretty(&mut *out, summaries)?;
    writeln!(out).map_err(output_error)
}

fn output_error(source: std::io::Error) -> FeedError {
    FeedError::Io {
        path: "<stdout>".into(),
        source,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{TimeBucketAggregator, TimestampedText};

    const NINE_AM: Millis = 1_430_384_400_000;

    fn sample_buckets() -> Vec<TimeBucket> {
        let mut aggregator = TimeBucketAggregator::default();
        aggregator.extend([
            TimestampedText::new("1", NINE_AM, "u1", "alice", "RT $AAPL to the moon http://t.co/x", 0),
            TimestampedText::new("2", NINE_AM + 1_000, "u2", "bob", "$AAPL to the moon", 0),
            TimestampedText::new("3", NINE_AM + 400_000, "u3", "carol", "quiet", 0),
        ]);
        aggregator.into_buckets()
    }

    #[test]
    fn test_summaries() {
        let summaries = summarize(&sample_buckets());
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].start, NINE_AM);
        assert_eq!(summaries[0].start_utc, "2015-04-30 09:00:00");
        assert_eq!(summaries[0].item_count, 2);
        assert_eq!(summaries[0].max_repeat_count, 2);
        assert_eq!(summaries[0].most_repeated.as_deref(), Some("$AAPL to the moon"));
        assert_eq!(summaries[1].max_repeat_count, 1);
        assert!(summaries[0].has_links);
        assert!(!summaries[1].has_links);
    }

    #[test]
    fn test_summary_uses_ranked_top_item() {
        let mut aggregator = TimeBucketAggregator::default();
        aggregator.extend([
            TimestampedText::new("1", NINE_AM, "u1", "a", "first story", 3),
            TimestampedText::new("2", NINE_AM + 1, "u2", "b", "second story https://t.co/x", 90),
        ]);
        let summaries = summarize(aggregator.buckets());
        assert_eq!(summaries[0].most_repeated.as_deref(), Some("second story"));
        assert_eq!(summaries[0].retweets, 90);
        assert!(summaries[0].has_links);
    }

    #[test]
    fn test_plain_table_rendering() {
        let table = bucket_table(&summarize(&sample_buckets()), false);
        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("Most repeated"));
        assert!(rendered.contains("2015-04-30 09:05:00"));
        assert!(!rendered.contains("\x1b["));
    }

    #[test]
    fn test_plain_table_goes_to_writer() {
        let mut out = Vec::new();
        print_table(&mut out, &summarize(&sample_buckets()), false).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("Retweets"));
        assert!(rendered.contains("$AAPL to the moon"));
    }

    #[test]
    fn test_json_output() {
        let mut out = Vec::new();
        write_json(&mut out, &summarize(&sample_buckets())).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["item_count"], 2);
        assert_eq!(parsed[1]["most_repeated"], "quiet");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
