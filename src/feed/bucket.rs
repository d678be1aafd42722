//! Fixed-width time buckets

use std::cmp::Ordering;
use std::collections::HashMap;

use super::item::TimestampedText;

/// Milliseconds since the Unix epoch
pub type Millis = i64;

pub const MILLIS_PER_MINUTE: Millis = 60_000;
pub const MILLIS_PER_HOUR: Millis = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: Millis = 24 * MILLIS_PER_HOUR;

/// Default aggregation width: 5 minutes
pub const DEFAULT_BUCKET_WIDTH: Millis = 5 * MILLIS_PER_MINUTE;

/// Floor `timestamp` to the nearest multiple of `bucket_width` at or below it.
///
/// `bucket_width` must be positive.
pub fn floor_to_bucket(timestamp: Millis, bucket_width: Millis) -> Millis {
    debug_assert!(bucket_width > 0, "bucket width must be positive");
    timestamp - timestamp.rem_euclid(bucket_width)
}

/// Items sharing one aggregation interval, in arrival order
#[derive(Debug, Clone)]
pub struct TimeBucket {
    start: Millis,
    items: Vec<TimestampedText>,
    /// Canonical text -> indices of the items carrying it
    duplicates: HashMap<String, Vec<usize>>,
    max_repeat_count: u32,
}

impl TimeBucket {
    pub fn new(start: Millis) -> Self {
        Self {
            start,
            items: Vec::new(),
            duplicates: HashMap::new(),
            max_repeat_count: 0,
        }
    }

    pub fn start(&self) -> Millis {
        self.start
    }

    pub fn items(&self) -> &[TimestampedText] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Largest duplicate group in this bucket (0 when empty)
    pub fn max_repeat_count(&self) -> u32 {
        self.max_repeat_count
    }

    /// Top item by [`rank_order`]: most repeated, then highest repeat total, then lowest id
    pub fn most_repeated(&self) -> Option<&TimestampedText> {
        self.items.iter().min_by(|a, b| rank_order(a, b))
    }

    /// Items sorted by [`rank_order`]
    pub fn ranked(&self) -> Vec<&TimestampedText> {
        let mut ranked: Vec<&TimestampedText> = self.items.iter().collect();
        ranked.sort_by(|a, b| rank_order(a, b));
        ranked
    }

    /// Append `item` under `canonical`, updating the duplicate group sizes.
    ///
    /// Every member of the group is set to the new group size. Returns that size.
    pub fn push(&mut self, canonical: &str, mut item: TimestampedText) -> u32 {
        debug_assert_eq!(
            item.bucketed_at(),
            self.start,
            "item {} does not belong to bucket {}",
            item.id(),
            self.start
        );
        let index = self.items.len();
        let group = self.duplicates.entry(canonical.to_string()).or_default();
        group.push(index);

        let count = group.len() as u32;
        for &member in group.iter() {
            if let Some(existing) = self.items.get_mut(member) {
                existing.set_repeat_count_in_bucket(count);
            }
        }
        item.set_repeat_count_in_bucket(count);
        self.items.push(item);

        self.max_repeat_count = self.max_repeat_count.max(count);
        count
    }
}

/// In-bucket ranking: repeat count descending, repeat total descending, id ascending
pub fn rank_order(a: &TimestampedText, b: &TimestampedText) -> Ordering {
    b.repeat_count_in_bucket()
        .cmp(&a.repeat_count_in_bucket())
        .then_with(|| b.repeat_total().cmp(&a.repeat_total()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Position of the busiest bucket starting within `[timestamp - tolerance, timestamp + tolerance]`.
///
/// Ties go to the earliest position. Returns `None` when no bucket starts in range.
pub fn find_bucket_position_near(
    buckets: &[TimeBucket],
    timestamp: Millis,
    tolerance: Millis,
) -> Option<usize> {
    let lower = timestamp.saturating_sub(tolerance);
    let upper = timestamp.saturating_add(tolerance);

    let mut best: Option<(usize, usize)> = None;
    for (position, bucket) in buckets.iter().enumerate() {
        if bucket.start() < lower || bucket.start() > upper {
            continue;
        }
        match best {
            Some((_, count)) if bucket.item_count() <= count => {}
            _ => best = Some((position, bucket.item_count())),
        }
    }
    best.map(|(position, _)| position)
}
