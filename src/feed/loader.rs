//! JSON Lines tweet input
//!
//! One [`TweetRecord`] per line; blank lines are skipped.

use std::io::BufRead;
use std::path::Path;

use super::error::{FeedError, FeedResult};
use super::item::{TimestampedText, TweetRecord};

/// Parse tweet records from a reader
pub fn read_records<R: BufRead>(reader: R) -> FeedResult<Vec<TweetRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| FeedError::MalformedRecord {
            line: line_number,
            message: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<TweetRecord>(trimmed).map_err(|e| {
            FeedError::MalformedRecord {
                line: line_number,
                message: e.to_string(),
            }
        })?;
        records.push(record);
    }
    log::debug!("Read {} tweet records", records.len());
    Ok(records)
}

/// Load tweets from a JSON Lines file
pub fn load_tweets(path: &Path) -> FeedResult<Vec<TimestampedText>> {
    let file = std::fs::File::open(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(std::io::BufReader::new(file))?;
    log::info!("Loaded {} tweets from {}", records.len(), path.display());
    Ok(records.into_iter().map(TimestampedText::from).collect())
}
