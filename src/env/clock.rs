//! Simulation clock with calendar-aware time features.

use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike, Weekday};

/// A simulation clock that advances by a fixed step interval.
///
/// The clock holds the current simulated timestamp and derives the
/// time-of-day and day-of-week features consumed by the tariff lookup and
/// the observation encoder. Wrapping across midnight and week boundaries
/// falls out of ordinary calendar arithmetic.
///
/// # Examples
///
/// ```
/// use bms_sim::env::clock::SimClock;
/// use chrono::{NaiveDate, Weekday};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1)
///     .and_then(|d| d.and_hms_opt(23, 0, 0))
///     .expect("valid timestamp");
/// let mut clock = SimClock::new(start, 1.0);
/// assert_eq!(clock.hour(), 23);
///
/// clock.advance();
/// assert_eq!(clock.hour(), 0);
/// assert_eq!(clock.weekday(), Weekday::Tue);
/// ```
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Current simulated timestamp.
    current: NaiveDateTime,
    /// Duration of one step.
    step: TimeDelta,
}

/// Cyclic encoding of the clock's (hour, weekday) pair.
///
/// Sine/cosine pairs avoid the discontinuity a raw hour or weekday index
/// would introduce at day and week wraparound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeEncoding {
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub weekday_sin: f64,
    pub weekday_cos: f64,
}

impl SimClock {
    /// Creates a clock at `start` advancing by `step_hours` per step.
    ///
    /// # Panics
    ///
    /// Panics if `step_hours` is not strictly positive.
    pub fn new(start: NaiveDateTime, step_hours: f64) -> Self {
        assert!(step_hours > 0.0, "step_hours must be > 0");
        Self {
            current: start,
            step: TimeDelta::milliseconds((step_hours * 3_600_000.0).round() as i64),
        }
    }

    /// Returns the current simulated timestamp.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.current
    }

    /// Returns the whole hour of day in `[0, 24)`.
    pub fn hour(&self) -> u32 {
        self.current.hour()
    }

    /// Returns the hour of day including the minute fraction.
    pub fn hour_frac(&self) -> f64 {
        f64::from(self.current.hour()) + f64::from(self.current.minute()) / 60.0
    }

    /// Returns the current day of week.
    pub fn weekday(&self) -> Weekday {
        self.current.weekday()
    }

    /// Advances the clock by exactly one step interval.
    pub fn advance(&mut self) {
        self.current += self.step;
    }

    /// Returns the cyclic (hour, weekday) encoding at the current time.
    pub fn time_encoding(&self) -> TimeEncoding {
        use std::f64::consts::TAU;

        let hour_angle = TAU * self.hour_frac() / 24.0;
        let day = f64::from(self.weekday().num_days_from_monday());
        let day_angle = TAU * day / 7.0;

        TimeEncoding {
            hour_sin: hour_angle.sin(),
            hour_cos: hour_angle.cos(),
            weekday_sin: day_angle.sin(),
            weekday_cos: day_angle.cos(),
        }
    }
}
