//! Feed Integration Tests
//!
//! Canonicalization, bucketing, busiest-bucket lookup and market-hours
//! scrolling exercised through the public library API.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use tweetbucket::feed::{
    canonicalize, find_bucket_position_near, floor_to_bucket, AlwaysOpen, EmptyTextPolicy,
    MarketCalendar, Millis, Normalizer, ScrollBounds, ScrollCursor, TimeBucket, TimeBucketAggregator,
    TimestampedText, TradingHoursCalendar, MILLIS_PER_DAY, MILLIS_PER_MINUTE,
};

const NINE_AM: Millis = 1_430_384_400_000; // 2015-04-30 09:00:00 UTC
const WIDTH: Millis = 5 * MILLIS_PER_MINUTE;

fn at(rfc3339: &str) -> Millis {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .timestamp_millis()
}

fn tweet(id: &str, created_at: Millis, text: &str) -> TimestampedText {
    TimestampedText::new(id, created_at, format!("u{id}"), format!("user{id}"), text, 0)
}

#[test]
fn test_canonical_examples() {
    let cases = [
        ("RT text", "text"),
        ("text #tag", "text"),
        ("text @tag", "text"),
        ("text $tag", "text"),
        ("text $123.12", "text $123.12"),
        ("@tag1 @tag2: text", "text"),
        ("@tag1 @tag2 @tag text", "@tag text"),
        ("text...", "text"),
        ("text…", "text"),
        ("text http://t.co/blah", "text"),
        ("RT text https://t.co/blah blah", "text https://t.co/blah blah"),
        (
            "RT @tag1 @tag2: text $123.12 @tag3 http://t.co/x...",
            "text $123.12",
        ),
        ("a   b\t\tc", "a b c"),
    ];
    for (raw, expected) in cases {
        assert_eq!(canonicalize(raw), expected, "canonicalize({raw:?})");
    }
}

#[test]
fn test_canonicalization_is_idempotent() {
    for raw in [
        "RT @tag1 @tag2: text $123.12 @tag3 http://t.co/x...",
        "@a @b @c hello world #x",
        "plain words",
    ] {
        let once = canonicalize(raw);
        assert_eq!(canonicalize(&once), once);
    }
}

#[test]
fn test_fully_stripped_text_follows_policy() {
    assert_eq!(canonicalize("#only #tags"), "#only #tags");
    let allow_empty = Normalizer::new(EmptyTextPolicy::AllowEmpty, false);
    assert_eq!(allow_empty.canonicalize("#only #tags"), "");
}

#[test]
fn test_three_tweets_three_minutes_apart() {
    let mut aggregator = TimeBucketAggregator::default();
    aggregator.extend([
        tweet("1", NINE_AM, "opening bell"),
        tweet("2", NINE_AM + 3 * MILLIS_PER_MINUTE, "opening bell"),
        tweet("3", NINE_AM + 6 * MILLIS_PER_MINUTE, "later"),
    ]);

    let buckets = aggregator.buckets();
    assert_eq!(aggregator.bucket_starts(), vec![NINE_AM, NINE_AM + WIDTH]);
    assert_eq!(buckets[0].item_count(), 2);
    assert_eq!(buckets[0].max_repeat_count(), 2);
    assert!(buckets[0]
        .items()
        .iter()
        .all(|item| item.repeat_count_in_bucket() == 2));
    assert_eq!(buckets[1].item_count(), 1);
    assert_eq!(buckets[1].items()[0].repeat_count_in_bucket(), 1);
}

#[test]
fn test_bucket_invariants_hold_for_unordered_input() {
    let times = [7, 0, 13, 2, 25, 9, 31, 4, 18, 12];
    let mut aggregator = TimeBucketAggregator::default();
    for (i, minutes) in times.iter().enumerate() {
        let text = if i % 2 == 0 { "even" } else { "odd" };
        aggregator.add_item(tweet(&i.to_string(), NINE_AM + minutes * MILLIS_PER_MINUTE, text));
    }

    let buckets = aggregator.buckets();
    assert!(buckets.windows(2).all(|pair| pair[0].start() < pair[1].start()));
    assert_eq!(aggregator.item_count(), times.len());
    for bucket in buckets {
        assert_eq!(bucket.start() % WIDTH, 0);
        for item in bucket.items() {
            assert_eq!(item.bucketed_at(), bucket.start());
            assert_eq!(floor_to_bucket(item.created_at(), WIDTH), bucket.start());
            let same = bucket
                .items()
                .iter()
                .filter(|other| other.canonical_text() == item.canonical_text())
                .count() as u32;
            assert_eq!(item.repeat_count_in_bucket(), same);
            assert!(item.repeat_count_in_bucket() <= bucket.max_repeat_count());
        }
    }
}

#[test]
fn test_busiest_bucket_in_tolerance_window() {
    let counts = [3, 7, 2];
    let buckets: Vec<TimeBucket> = counts
        .iter()
        .enumerate()
        .map(|(position, count)| {
            let start = NINE_AM + position as Millis * WIDTH;
            let mut bucket = TimeBucket::new(start);
            for i in 0..*count {
                let text = format!("tweet {i}");
                bucket.push(&text, tweet(&i.to_string(), start, &text));
            }
            bucket
        })
        .collect();

    assert_eq!(find_bucket_position_near(&buckets, NINE_AM + WIDTH, WIDTH), Some(1));
    assert_eq!(find_bucket_position_near(&buckets, NINE_AM, 0), Some(0));
    assert_eq!(
        find_bucket_position_near(&buckets, NINE_AM - MILLIS_PER_DAY, WIDTH),
        None
    );
}

#[test]
fn test_forward_scroll_snaps_past_weekend() {
    let calendar = TradingHoursCalendar::us_equities();
    let last = at("2015-05-01T15:55:00-05:00"); // Friday
    let bounds = ScrollBounds::new(last - MILLIS_PER_DAY, at("2015-05-08T16:00:00-05:00"));
    let cursor = ScrollCursor::new(WIDTH, true, &calendar, bounds);

    let new_end = cursor.scroll(2, &[last - WIDTH, last], last);
    assert_eq!(new_end, at("2015-05-04T09:30:00-05:00"));
}

#[test]
fn test_forward_scroll_skips_three_week_closure() {
    let closure = NaiveDate::from_ymd_opt(2015, 5, 4).unwrap();
    let calendar = TradingHoursCalendar::new(
        FixedOffset::west_opt(5 * 3600).unwrap(),
        NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        closure.iter_days().take(21),
    );
    let last = at("2015-05-01T15:55:00-05:00"); // Friday
    let bounds = ScrollBounds::new(last - MILLIS_PER_DAY, at("2015-06-30T16:00:00-05:00"));
    let cursor = ScrollCursor::new(WIDTH, true, &calendar, bounds);

    let new_end = cursor.scroll(2, &[last - WIDTH, last], last);
    assert_eq!(new_end, at("2015-05-25T09:30:00-05:00"));
    assert!(calendar.is_open(new_end));
}

#[test]
fn test_backward_scroll_snaps_to_market_close() {
    let calendar = TradingHoursCalendar::us_equities();
    let friday_close = at("2015-05-01T16:00:00-05:00");
    let saturday = at("2015-05-02T12:00:00-05:00");
    let monday = at("2015-05-04T09:30:00-05:00");
    let bounds = ScrollBounds::from_retention(monday, 7);
    let cursor = ScrollCursor::new(WIDTH, true, &calendar, bounds);

    assert_eq!(cursor.scroll(-1, &[saturday, monday], monday), friday_close);
}

#[test]
fn test_scroll_without_market_hours_ignores_closures() {
    let last = at("2015-05-01T15:55:00-05:00");
    let bounds = ScrollBounds::new(last - MILLIS_PER_DAY, last + MILLIS_PER_DAY);
    let cursor = ScrollCursor::new(WIDTH, false, &AlwaysOpen, bounds);
    assert_eq!(cursor.scroll(2, &[last], last), last + 2 * WIDTH);
    assert_eq!(cursor.scroll(0, &[last], 42), 42);
    assert_eq!(cursor.scroll(-1, &[], 42), 42);
}
