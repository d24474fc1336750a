//! When a background job fires.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};

/// Firing rule of a [`PeriodicJob`](super::PeriodicJob).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed delay between the end of one run and the start of the next.
    Every(Duration),

    /// Once a day at a local wall-clock time.
    DailyAt { hour: u32, minute: u32 },
}

impl Schedule {
    pub fn daily_at(hour: u32, minute: u32) -> Self {
        Schedule::DailyAt { hour, minute }
    }

    /// Time to wait from `now` until the next firing.
    ///
    /// A daily schedule whose time of day has already been reached fires
    /// tomorrow. Out-of-range times fall back to midnight.
    pub fn delay_from(&self, now: NaiveDateTime) -> Duration {
        match *self {
            Schedule::Every(interval) => interval,
            Schedule::DailyAt { hour, minute } => {
                let at = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
                let mut next = now.date().and_time(at);
                if next <= now {
                    next += chrono::Duration::days(1);
                }
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schedule::Every(d) => write!(f, "every {}s", d.as_secs()),
            Schedule::DailyAt { hour, minute } => write!(f, "daily at {:02}:{:02}", hour, minute),
        }
    }
}
