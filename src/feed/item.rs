//! Timestamped text items (one record per tweet)

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::bucket::{floor_to_bucket, Millis, DEFAULT_BUCKET_WIDTH};
use super::normalizer::{has_links, Normalizer};

/// One tweet record as seen by the aggregator
#[derive(Debug, Clone)]
pub struct TimestampedText {
    id: String,
    created_at: Millis,
    bucketed_at: Millis,
    author_id: String,
    author_name: String,
    raw_text: String,
    canonical_text: OnceCell<String>,
    repeat_count_in_bucket: u32,
    repeat_total: u32,
}

impl TimestampedText {
    /// Create an item bucketed with [`DEFAULT_BUCKET_WIDTH`]
    pub fn new(
        id: impl Into<String>,
        created_at: Millis,
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        raw_text: impl Into<String>,
        repeat_total: u32,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            bucketed_at: floor_to_bucket(created_at, DEFAULT_BUCKET_WIDTH),
            author_id: author_id.into(),
            author_name: author_name.into(),
            raw_text: raw_text.into(),
            canonical_text: OnceCell::new(),
            repeat_count_in_bucket: 0,
            repeat_total,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> Millis {
        self.created_at
    }

    /// Creation time floored to the bucket width currently in effect
    pub fn bucketed_at(&self) -> Millis {
        self.bucketed_at
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Whether the raw text carries an `http(s)://` link
    pub fn has_links(&self) -> bool {
        has_links(&self.raw_text)
    }

    /// Canonical text using the default normalizer
    pub fn canonical_text(&self) -> &str {
        self.canonical_text_with(&Normalizer::default())
    }

    /// Canonical text, computed with `normalizer` on first access.
    ///
    /// The first computed value is cached; later calls return it regardless of
    /// the normalizer passed.
    pub fn canonical_text_with(&self, normalizer: &Normalizer) -> &str {
        self.canonical_text
            .get_or_init(|| normalizer.canonicalize(&self.raw_text))
    }

    pub fn repeat_count_in_bucket(&self) -> u32 {
        self.repeat_count_in_bucket
    }

    pub fn repeat_total(&self) -> u32 {
        self.repeat_total
    }

    pub(crate) fn rebucket(&mut self, bucket_width: Millis) {
        self.bucketed_at = floor_to_bucket(self.created_at, bucket_width);
    }

    pub(crate) fn set_repeat_count_in_bucket(&mut self, count: u32) {
        self.repeat_count_in_bucket = count;
    }
}

/// Serialized form of a tweet, as read from JSON Lines input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id: String,
    /// Creation time in milliseconds since the epoch
    pub created_at: Millis,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub text: String,
    #[serde(default)]
    pub retweet_total: u32,
}

impl From<TweetRecord> for TimestampedText {
    fn from(record: TweetRecord) -> Self {
        TimestampedText::new(
            record.id,
            record.created_at,
            record.user_id,
            record.user_name,
            record.text,
            record.retweet_total,
        )
    }
}
