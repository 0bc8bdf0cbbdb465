//! Calendar bucketing for days, Sunday-aligned weeks and months.
//!
//! Timestamps are stored in UTC, but which day an entry "belongs to" depends
//! on the viewer's time zone. Everything here works on the local calendar
//! date of a timestamp, so buckets never need DST-sensitive midnight
//! conversions.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// An inclusive Sunday..=Saturday span of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekBounds {
    /// Whether `date` falls within the week, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The week immediately before this one, if the calendar reaches it.
    pub fn previous(&self) -> Option<Self> {
        week_bounds(self.start.checked_sub_days(Days::new(1))?)
    }
}

/// Returns the Sunday-aligned week containing `date`.
///
/// `start` is the Sunday on or before `date`; `end` is six days later.
/// `None` when either end falls outside chrono's representable dates.
pub fn week_bounds(date: NaiveDate) -> Option<WeekBounds> {
    let days_since_sunday = date.weekday().num_days_from_sunday();
    let start = date.checked_sub_days(Days::new(u64::from(days_since_sunday)))?;
    let end = start.checked_add_days(Days::new(6))?;
    Some(WeekBounds { start, end })
}

/// The calendar date of `timestamp` as seen in `tz`.
pub fn local_date<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    timestamp.with_timezone(tz).date_naive()
}

/// Whether two dates share a calendar month.
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}
