//! Per-space availability calendar.
//!
//! A space's calendar is the set of its `confirmed` bookings, kept as
//! half-open `[start, end)` intervals sorted by start. A new interval may be
//! confirmed only if it intersects none of them, so back-to-back bookings
//! (one ending exactly when the next starts) are allowed.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Booking;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::ValidationError(
                "end_time must be after start_time".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Rows coming back from the store already satisfy `start_time < end_time`
    /// (enforced by a CHECK constraint).
    pub(crate) fn from_stored(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Default)]
pub struct Availability {
    confirmed: Vec<(Uuid, TimeRange)>,
}

impl Availability {
    /// Builds the calendar from any set of bookings; only confirmed ones count.
    pub fn from_bookings<'a, I>(bookings: I) -> Self
    where
        I: IntoIterator<Item = &'a Booking>,
    {
        let mut confirmed: Vec<(Uuid, TimeRange)> = bookings
            .into_iter()
            .filter(|b| b.is_confirmed())
            .map(|b| (b.id, b.range()))
            .collect();
        confirmed.sort_by_key(|(_, range)| range.start());
        Self { confirmed }
    }

    /// How many confirmed bookings hold the space.
    pub fn held(&self) -> usize {
        self.confirmed.len()
    }

    /// Returns the id of a confirmed booking that intersects `range`, if any.
    pub fn conflict(&self, range: &TimeRange) -> Option<Uuid> {
        // Everything at or past `upper` starts no earlier than `range` ends.
        let upper = self
            .confirmed
            .partition_point(|(_, held)| held.start() < range.end());
        self.confirmed[..upper]
            .iter()
            .rev()
            .find(|(_, held)| held.overlaps(range))
            .map(|(id, _)| *id)
    }

    pub fn ensure_free(&self, range: &TimeRange) -> AppResult<()> {
        match self.conflict(range) {
            None => Ok(()),
            Some(booking_id) => Err(AppError::Conflict(format!(
                "Space is already booked between {} and {} (booking {booking_id})",
                range.start().to_rfc3339(),
                range.end().to_rfc3339()
            ))),
        }
    }

    pub fn intervals(&self) -> Vec<TimeRange> {
        self.confirmed.iter().map(|(_, range)| *range).collect()
    }
}
