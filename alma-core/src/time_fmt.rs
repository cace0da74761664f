//! Canonical `HH:MM:SS` rendering of clock times and durations.

use chrono::{NaiveTime, TimeDelta};

/// Rendering used for every time-of-day field on the read path.
pub trait ClockText {
    fn clock_text(&self) -> String;
}

/// Text for a time that is not set.
pub const MIDNIGHT_TEXT: &str = "00:00:00";

impl ClockText for NaiveTime {
    fn clock_text(&self) -> String {
        self.format("%H:%M:%S").to_string()
    }
}

/// Absolute total seconds split into hours, minutes and seconds. Hours are
/// not wrapped at 24.
impl ClockText for TimeDelta {
    fn clock_text(&self) -> String {
        let total = self.num_seconds().unsigned_abs();
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl<T: ClockText> ClockText for Option<T> {
    fn clock_text(&self) -> String {
        match self {
            Some(value) => value.clock_text(),
            None => MIDNIGHT_TEXT.to_string(),
        }
    }
}
