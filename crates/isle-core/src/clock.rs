//! World clock and calendar for the island simulation.
//!
//! The clock is the single source of truth for temporal state. It tracks the
//! day counter and derives everything else from it: the position within the
//! weekly market cycle, the cycle index, and the calendar date.
//!
//! # Design Principles
//!
//! - All temporal derivations use checked arithmetic (no silent overflow).
//! - Cycle day and date are computed from the day counter, never stored
//!   independently.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use isle_world::CYCLE_LENGTH;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Day counter would overflow.
    #[error("day counter overflow: cannot advance beyond u64::MAX")]
    DayOverflow,
}

/// World clock tracking the simulation's day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClock {
    /// Current day (0-indexed).
    day: u64,

    /// Calendar date of day 0.
    start_date: NaiveDate,
}

impl WorldClock {
    /// Create a clock at day 0.
    pub const fn new(start_date: NaiveDate) -> Self {
        Self { day: 0, start_date }
    }

    /// Create a clock at an arbitrary day (useful for testing).
    pub const fn from_parts(day: u64, start_date: NaiveDate) -> Self {
        Self { day, start_date }
    }

    /// Advance the clock by one day. Returns the new day number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::DayOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.day = self.day.checked_add(1).ok_or(ClockError::DayOverflow)?;
        Ok(self.day)
    }

    /// Return to day 0.
    pub const fn reset(&mut self) {
        self.day = 0;
    }

    /// Current day number.
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// Calendar date of day 0.
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Position within the market cycle: `day % 7`.
    pub fn cycle_day(&self) -> u64 {
        self.day.checked_rem(CYCLE_LENGTH).unwrap_or(0)
    }

    /// Number of completed market cycles: `day / 7`.
    pub fn cycle_index(&self) -> u64 {
        self.day.checked_div(CYCLE_LENGTH).unwrap_or(0)
    }

    /// Calendar date of the current day.
    ///
    /// Saturates at [`NaiveDate::MAX`] for days beyond chrono's range.
    pub fn date(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(self.day))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Day of the week of the current day.
    pub fn weekday(&self) -> Weekday {
        self.date().weekday()
    }
}
