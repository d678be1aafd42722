//! Market calendar collaborator
//!
//! The scroll cursor asks a [`MarketCalendar`] whether an instant falls in
//! trading hours and, if not, which closed period encloses it. Hosts supply
//! the calendar; [`TradingHoursCalendar`] covers the common case of one
//! weekday session in a fixed UTC offset.

use std::collections::BTreeSet;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday,
};

use super::bucket::Millis;

/// Half-open closed interval `[start, end)` in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedPeriod {
    pub start: Millis,
    pub end: Millis,
}

impl ClosedPeriod {
    pub fn contains(&self, timestamp: Millis) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

/// Source of market open/closed hours
pub trait MarketCalendar {
    /// Whether the market is open at `timestamp`
    fn is_open(&self, timestamp: Millis) -> bool;

    /// Closed periods overlapping `[from, to]`, ordered by start
    fn closed_periods(&self, from: Millis, to: Millis) -> Vec<ClosedPeriod>;
}

/// A market that never closes
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOpen;

impl MarketCalendar for AlwaysOpen {
    fn is_open(&self, _timestamp: Millis) -> bool {
        true
    }

    fn closed_periods(&self, _from: Millis, _to: Millis) -> Vec<ClosedPeriod> {
        Vec::new()
    }
}

/// Longest run of closed days walked when looking for the neighbouring
/// session. Past this the closure is treated as unbounded.
const MAX_CLOSED_DAYS: usize = 3_660;

/// One trading session per weekday, in a fixed UTC offset. Weekends and the
/// listed holidays are closed all day.
#[derive(Debug, Clone)]
pub struct TradingHoursCalendar {
    offset: FixedOffset,
    open: NaiveTime,
    close: NaiveTime,
    holidays: BTreeSet<NaiveDate>,
}

impl TradingHoursCalendar {
    /// `open` must be earlier than `close`
    pub fn new(
        offset: FixedOffset,
        open: NaiveTime,
        close: NaiveTime,
        holidays: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        debug_assert!(open < close, "session must open before it closes");
        Self {
            offset,
            open,
            close,
            holidays: holidays.into_iter().collect(),
        }
    }

    /// US equity hours: 09:30-16:00 at UTC-05:00
    pub fn us_equities() -> Self {
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap_or_else(|| Utc.fix());
        let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN);
        let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(eastern, open, close, [])
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.holidays.contains(&date)
    }

    fn local_date(&self, timestamp: Millis) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp_millis(timestamp)
            .map(|utc| utc.with_timezone(&self.offset).date_naive())
    }

    fn local_millis(&self, date: NaiveDate, time: NaiveTime) -> Option<Millis> {
        self.offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .map(|dt| dt.timestamp_millis())
    }

    /// Trading sessions `(open, close)` on local dates in `[first, last]`
    fn sessions(&self, first: NaiveDate, last: NaiveDate) -> Vec<(Millis, Millis)> {
        first
            .iter_days()
            .take_while(|date| *date <= last)
            .filter(|date| self.is_trading_day(*date))
            .filter_map(|date| {
                Some((
                    self.local_millis(date, self.open)?,
                    self.local_millis(date, self.close)?,
                ))
            })
            .collect()
    }

    fn session_on(&self, date: NaiveDate) -> Option<(Millis, Millis)> {
        if !self.is_trading_day(date) {
            return None;
        }
        Some((
            self.local_millis(date, self.open)?,
            self.local_millis(date, self.close)?,
        ))
    }

    /// Last session on a local date before `date`
    fn previous_session(&self, date: NaiveDate) -> Option<(Millis, Millis)> {
        std::iter::successors(date.pred_opt(), |day| day.pred_opt())
            .take(MAX_CLOSED_DAYS)
            .find_map(|day| self.session_on(day))
    }

    /// First session on a local date after `date`
    fn next_session(&self, date: NaiveDate) -> Option<(Millis, Millis)> {
        std::iter::successors(date.succ_opt(), |day| day.succ_opt())
            .take(MAX_CLOSED_DAYS)
            .find_map(|day| self.session_on(day))
    }
}

impl MarketCalendar for TradingHoursCalendar {
    fn is_open(&self, timestamp: Millis) -> bool {
        let Some(date) = self.local_date(timestamp) else {
            return false;
        };
        self.sessions(date, date)
            .iter()
            .any(|(open, close)| timestamp >= *open && timestamp < *close)
    }

    fn closed_periods(&self, from: Millis, to: Millis) -> Vec<ClosedPeriod> {
        let (Some(first), Some(last)) = (self.local_date(from), self.local_date(to)) else {
            return Vec::new();
        };
        let sessions = self.sessions(first, last);
        let previous_close = self
            .previous_session(first)
            .map_or(Millis::MIN, |(_, close)| close);
        let next_open = self.next_session(last).map_or(Millis::MAX, |(open, _)| open);

        // Gaps between consecutive sessions, from the session before the
        // range to the session after it
        let mut gaps = Vec::with_capacity(sessions.len() + 1);
        let mut previous_close = previous_close;
        for (open, close) in &sessions {
            if *open > previous_close {
                gaps.push(ClosedPeriod {
                    start: previous_close,
                    end: *open,
                });
            }
            previous_close = *close;
        }
        if next_open > previous_close {
            gaps.push(ClosedPeriod {
                start: previous_close,
                end: next_open,
            });
        }

        gaps.into_iter()
            .filter(|gap| gap.start <= to && gap.end > from)
            .collect()
    }
}
