//! Tweet canonicalization and time-bucket aggregation
//!
//! Everything here is synchronous, in-memory computation. Callers own the
//! bucket sequence and must serialize access to it.

pub mod aggregator;
pub mod bucket;
pub mod calendar;
pub mod error;
pub mod item;
pub mod loader;
pub mod normalizer;
pub mod scroll;

pub use aggregator::TimeBucketAggregator;
pub use bucket::{
    find_bucket_position_near, floor_to_bucket, rank_order, Millis, TimeBucket,
    DEFAULT_BUCKET_WIDTH, MILLIS_PER_DAY, MILLIS_PER_HOUR, MILLIS_PER_MINUTE,
};
pub use calendar::{AlwaysOpen, ClosedPeriod, MarketCalendar, TradingHoursCalendar};
pub use error::{FeedError, FeedResult};
pub use item::{TimestampedText, TweetRecord};
pub use normalizer::{canonicalize, has_links, EmptyTextPolicy, Normalizer};
pub use scroll::{scroll_distance, ScrollBounds, ScrollCursor, ScrollDirection};
