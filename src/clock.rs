//! Wall-clock times with minute granularity.
//!
//! Visits carry their start/end as `"HH:MM"` strings in stored snapshots.
//! `ClockTime` parses those once at the boundary so the optimizer works in
//! plain minutes from midnight.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::OptimizeError;

/// Latest representable time (47:59). Timing adjustment can push a late
/// tour past midnight, so the range covers one extra day.
pub const MAX_MINUTES: u32 = 48 * 60 - 1;

/// Minutes since midnight, rendered as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(u32);

impl ClockTime {
    /// Creates a time from minutes since midnight, clamped to [`MAX_MINUTES`].
    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes.min(MAX_MINUTES))
    }

    pub fn from_hm(hours: u32, minutes: u32) -> Self {
        Self::from_minutes(hours * 60 + minutes)
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Rounds up to the next multiple of `step` minutes.
    pub fn ceil_to(&self, step: u32) -> Self {
        Self::from_minutes(ceil_to(self.0, step))
    }
}

/// Rounds `minutes` up to the next multiple of `step`.
pub fn ceil_to(minutes: u32, step: u32) -> u32 {
    if step == 0 {
        return minutes;
    }
    minutes.div_ceil(step) * step
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for ClockTime {
    type Err = OptimizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OptimizeError::InvalidClockTime(s.to_string());

        let (hours, minutes) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hours: u32 = hours.parse().map_err(|_| invalid())?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;

        if minutes >= 60 || hours * 60 + minutes > MAX_MINUTES {
            return Err(invalid());
        }

        Ok(Self(hours * 60 + minutes))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let time: ClockTime = "08:05".parse().unwrap();
        assert_eq!(time.minutes(), 8 * 60 + 5);
        assert_eq!(time.to_string(), "08:05");

        let short: ClockTime = "7:30".parse().unwrap();
        assert_eq!(short.to_string(), "07:30");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<ClockTime>().is_err());
        assert!("0830".parse::<ClockTime>().is_err());
        assert!("08:60".parse::<ClockTime>().is_err());
        assert!("48:00".parse::<ClockTime>().is_err());
        assert!("ab:cd".parse::<ClockTime>().is_err());
    }

    #[test]
    fn test_past_midnight_round_trips() {
        let late: ClockTime = "25:10".parse().unwrap();
        assert_eq!(late.to_string(), "25:10");
    }

    #[test]
    fn test_ceil_to_five() {
        assert_eq!(ceil_to(480, 5), 480);
        assert_eq!(ceil_to(481, 5), 485);
        assert_eq!(ceil_to(484, 5), 485);
        assert_eq!(ClockTime::from_hm(9, 2).ceil_to(5), ClockTime::from_hm(9, 5));
    }

    #[test]
    fn test_from_minutes_clamps() {
        assert_eq!(ClockTime::from_minutes(10_000).minutes(), MAX_MINUTES);
    }
}
