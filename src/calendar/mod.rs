//! Calendar view-model math
//!
//! Pure functions behind the therapist dashboard calendar: month grid
//! construction, per-day session bucketing, the cancellation window rule,
//! and pixel geometry for the day view. Everything here is deterministic
//! and free of I/O so it can be tested exhaustively.

use crate::models::{CalendarSession, Session};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

/// First hour shown in the day view (inclusive).
pub const WINDOW_START_HOUR: u32 = 8;
/// Hour at which the day view ends (exclusive).
pub const WINDOW_END_HOUR: u32 = 20;
/// Vertical pixels per hour in the day view.
pub const PIXELS_PER_HOUR: f64 = 50.0;
/// Minimum rendered height of a session block.
pub const MIN_BLOCK_HEIGHT_PX: f64 = 30.0;
/// Sessions starting less than this far in the future cannot be cancelled.
pub const CANCEL_WINDOW_HOURS: i64 = 24;

/// One day cell of the month grid, with its zero-padded ISO date ready for
/// bucket lookups and links.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MonthCell {
    pub day: u32,
    /// `YYYY-MM-DD`
    pub date: String,
}

/// One month of calendar cells, Sunday-first.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonthGrid {
    pub year: i32,
    /// One-based calendar month (1 = January)
    pub month: u32,
    /// Leading `None` cells pad to the weekday of the 1st; the rest are the
    /// month's days in order.
    pub cells: Vec<Option<MonthCell>>,
}

/// Build the grid for a zero-based month index. Indices past December roll
/// into the following year, so index 12 is January of `year + 1`.
pub fn month_grid(year: i32, month_index: u32) -> Option<MonthGrid> {
    let year = year.checked_add((month_index / 12) as i32)?;
    let month = month_index % 12 + 1;

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = first.weekday().num_days_from_sunday();
    let days = days_in_month(year, month)?;

    let mut cells: Vec<Option<MonthCell>> = vec![None; offset as usize];
    cells.extend((1..=days).map(|day| {
        Some(MonthCell {
            day,
            date: format!("{:04}-{:02}-{:02}", year, month, day),
        })
    }));
    Some(MonthGrid { year, month, cells })
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some((next - first).num_days() as u32)
}

/// Group sessions under their zero-padded `YYYY-MM-DD` key, dropping any
/// whose date falls outside the given month. Within a day, backend order
/// is preserved.
pub fn bucket_sessions(
    year: i32,
    month: u32,
    sessions: &[(NaiveDate, CalendarSession)],
) -> BTreeMap<String, Vec<CalendarSession>> {
    let mut buckets: BTreeMap<String, Vec<CalendarSession>> = BTreeMap::new();
    for (date, session) in sessions {
        if date.year() != year || date.month() != month {
            continue;
        }
        buckets
            .entry(date.format("%Y-%m-%d").to_string())
            .or_default()
            .push(session.clone());
    }
    buckets
}

/// Whether a session may still be cancelled: not in a terminal status, and
/// starting at least 24 hours from `now`. Exactly 24 hours out is eligible.
pub fn is_cancellable(session: &Session, now: DateTime<Utc>) -> bool {
    if session.status.is_terminal() {
        return false;
    }
    session.scheduled_start_datetime - now >= Duration::hours(CANCEL_WINDOW_HOURS)
}

/// Pixel geometry of one session block in the day view.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SlotGeometry {
    /// Offset from the top of the 8:00 line, in pixels
    pub top: f64,
    pub height: f64,
}

/// Anything the day view can place on its timeline.
pub trait DaySlot {
    /// (hour, minute) of the start time
    fn start_parts(&self) -> Option<(u32, u32)>;
    /// Duration in minutes
    fn duration_minutes(&self) -> u32;
}

impl DaySlot for CalendarSession {
    fn start_parts(&self) -> Option<(u32, u32)> {
        CalendarSession::start_parts(self)
    }

    fn duration_minutes(&self) -> u32 {
        self.duration
    }
}

impl DaySlot for Session {
    fn start_parts(&self) -> Option<(u32, u32)> {
        use chrono::Timelike;
        let t = self.scheduled_start_datetime.time();
        Some((t.hour(), t.minute()))
    }

    fn duration_minutes(&self) -> u32 {
        self.duration
    }
}

/// Compute the block geometry for a slot, or `None` when the start hour
/// falls outside the 8:00-20:00 window (or cannot be parsed).
pub fn slot_geometry<S: DaySlot>(slot: &S) -> Option<SlotGeometry> {
    let (hour, minute) = slot.start_parts()?;
    if !(WINDOW_START_HOUR..WINDOW_END_HOUR).contains(&hour) {
        return None;
    }
    let top = (hour - WINDOW_START_HOUR) as f64 * PIXELS_PER_HOUR
        + minute as f64 / 60.0 * PIXELS_PER_HOUR;
    let height =
        (slot.duration_minutes() as f64 / 60.0 * PIXELS_PER_HOUR).max(MIN_BLOCK_HEIGHT_PX);
    Some(SlotGeometry { top, height })
}

/// Lay out a day's sessions, skipping any that fall outside the window.
pub fn day_view_layout<S: DaySlot>(slots: &[S]) -> Vec<(usize, SlotGeometry)> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| slot_geometry(slot).map(|g| (i, g)))
        .collect()
}
