//! Time math for the chart scroller
//!
//! Gesture detection and drawing live with the caller. This module only turns
//! a scroll distance, measured in buckets, into the new end timestamp of the
//! visible window.

use super::bucket::{Millis, DEFAULT_BUCKET_WIDTH, MILLIS_PER_DAY};
use super::calendar::MarketCalendar;

/// Earliest and latest end timestamps the scroller may reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBounds {
    pub min_allowed: Millis,
    pub max_allowed: Millis,
}

impl ScrollBounds {
    pub fn new(min_allowed: Millis, max_allowed: Millis) -> Self {
        Self {
            min_allowed,
            max_allowed,
        }
    }

    /// Bounds for data retained for `days` days ending at `last_timestamp`
    pub fn from_retention(last_timestamp: Millis, days: u32) -> Self {
        let span = (i64::from(days.max(1)) - 1) * MILLIS_PER_DAY;
        Self::new(last_timestamp.saturating_sub(span), last_timestamp)
    }
}

/// Direction of a scroll gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Backward,
    Forward,
    None,
}

impl ScrollDirection {
    pub fn of(distance: i64) -> Self {
        match distance {
            d if d < 0 => ScrollDirection::Backward,
            d if d > 0 => ScrollDirection::Forward,
            _ => ScrollDirection::None,
        }
    }
}

/// Round a horizontal gesture distance in pixels to whole buckets
pub fn scroll_distance(pixels: f32, pixels_per_bucket: f32) -> i64 {
    if pixels_per_bucket <= 0.0 || !pixels.is_finite() {
        return 0;
    }
    (pixels / pixels_per_bucket).round() as i64
}

/// Computes new window end timestamps, optionally skipping closed market hours
pub struct ScrollCursor<'a> {
    bucket_width: Millis,
    market_hours_only: bool,
    calendar: &'a dyn MarketCalendar,
    bounds: ScrollBounds,
}

impl<'a> ScrollCursor<'a> {
    pub fn new(
        bucket_width: Millis,
        market_hours_only: bool,
        calendar: &'a dyn MarketCalendar,
        bounds: ScrollBounds,
    ) -> Self {
        debug_assert!(bucket_width > 0, "bucket width must be positive");
        Self {
            bucket_width,
            market_hours_only,
            calendar,
            bounds,
        }
    }

    /// Cursor with the default bucket width and market hours ignored
    pub fn with_defaults(calendar: &'a dyn MarketCalendar, bounds: ScrollBounds) -> Self {
        Self::new(DEFAULT_BUCKET_WIDTH, false, calendar, bounds)
    }

    /// New end timestamp after scrolling `distance` buckets.
    ///
    /// `loaded_starts` are the bucket starts currently on screen, ascending.
    /// Backward scrolls land on a loaded bucket; forward scrolls step past the
    /// last one. A zero distance or nothing loaded leaves `current_end` as is.
    pub fn scroll(&self, distance: i64, loaded_starts: &[Millis], current_end: Millis) -> Millis {
        let Some(&last_start) = loaded_starts.last() else {
            return current_end;
        };

        match ScrollDirection::of(distance) {
            ScrollDirection::None => current_end,
            ScrollDirection::Backward => {
                let position = (loaded_starts.len() as i64)
                    .saturating_add(distance)
                    .saturating_sub(1)
                    .max(0) as usize;
                let mut time = loaded_starts[position];
                if let Some(closed_start) = self.enclosing_closed_period(time).map(|(s, _)| s) {
                    log::debug!("Scroll target {} is closed, snapping back to {}", time, closed_start);
                    time = closed_start;
                }
                if time < self.bounds.min_allowed {
                    log::debug!("Scroll target {} clamped to {}", time, self.bounds.min_allowed);
                    time = self.bounds.min_allowed;
                }
                time
            }
            ScrollDirection::Forward => {
                let mut time =
                    last_start.saturating_add(distance.saturating_mul(self.bucket_width));
                if let Some(closed_end) = self.enclosing_closed_period(time).map(|(_, e)| e) {
                    log::debug!("Scroll target {} is closed, snapping forward to {}", time, closed_end);
                    time = closed_end;
                }
                if time > self.bounds.max_allowed {
                    log::debug!("Scroll target {} clamped to {}", time, self.bounds.max_allowed);
                    time = self.bounds.max_allowed;
                }
                time
            }
        }
    }

    /// Closed period around `time` when collapsing market hours
    fn enclosing_closed_period(&self, time: Millis) -> Option<(Millis, Millis)> {
        if !self.market_hours_only || self.calendar.is_open(time) {
            return None;
        }
        self.calendar
            .closed_periods(time, time)
            .first()
            .map(|period| (period.start, period.end))
    }
}
