//! Groups timestamped items into fixed-width time buckets

use super::bucket::{find_bucket_position_near, Millis, TimeBucket, DEFAULT_BUCKET_WIDTH};
use super::item::TimestampedText;
use super::normalizer::Normalizer;

/// Assigns items to buckets and tracks duplicate canonical text per bucket.
///
/// Buckets are kept ordered by start time and are never evicted; retention is
/// the caller's concern. Not synchronized: one writer per aggregation session.
#[derive(Debug, Clone)]
pub struct TimeBucketAggregator {
    bucket_width: Millis,
    normalizer: Normalizer,
    buckets: Vec<TimeBucket>,
}

impl Default for TimeBucketAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_WIDTH, Normalizer::default())
    }
}

impl TimeBucketAggregator {
    /// Create an aggregator. `bucket_width` must be positive.
    pub fn new(bucket_width: Millis, normalizer: Normalizer) -> Self {
        debug_assert!(bucket_width > 0, "bucket width must be positive");
        Self {
            bucket_width,
            normalizer,
            buckets: Vec::new(),
        }
    }

    pub fn bucket_width(&self) -> Millis {
        self.bucket_width
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Buckets in ascending start order
    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    pub fn into_buckets(self) -> Vec<TimeBucket> {
        self.buckets
    }

    /// Total number of items across all buckets
    pub fn item_count(&self) -> usize {
        self.buckets.iter().map(TimeBucket::item_count).sum()
    }

    /// Bucket starting at `start`, if any
    pub fn bucket_at(&self, start: Millis) -> Option<&TimeBucket> {
        self.buckets
            .binary_search_by_key(&start, TimeBucket::start)
            .ok()
            .map(|position| &self.buckets[position])
    }

    /// Bucket start times in ascending order
    pub fn bucket_starts(&self) -> Vec<Millis> {
        self.buckets.iter().map(TimeBucket::start).collect()
    }

    /// Place `item` in its bucket, creating the bucket on first use
    pub fn add_item(&mut self, mut item: TimestampedText) -> &TimeBucket {
        item.rebucket(self.bucket_width);
        let start = item.bucketed_at();
        let canonical = item.canonical_text_with(&self.normalizer).to_string();

        let position = match self.buckets.binary_search_by_key(&start, TimeBucket::start) {
            Ok(position) => position,
            Err(position) => {
                log::trace!("Creating bucket at {}", start);
                self.buckets.insert(position, TimeBucket::new(start));
                position
            }
        };

        let bucket = &mut self.buckets[position];
        let repeats = bucket.push(&canonical, item);
        if repeats > 1 {
            log::debug!(
                "Duplicate text in bucket {} ({} repeats): {}",
                start,
                repeats,
                canonical
            );
        }
        bucket
    }

    /// Add every item from `items`, in order
    pub fn extend<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = TimestampedText>,
    {
        for item in items {
            self.add_item(item);
        }
    }

    /// See [`find_bucket_position_near`]
    pub fn find_bucket_position_near(&self, timestamp: Millis, tolerance: Millis) -> Option<usize> {
        find_bucket_position_near(&self.buckets, timestamp, tolerance)
    }
}
