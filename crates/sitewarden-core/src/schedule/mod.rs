//! Access schedules: recurring time-of-day windows filtered by day of week.
//!
//! A [`Schedule`] is the unit users configure, either globally or per site.
//! [`evaluator`] decides whether a moment falls inside a window and
//! [`trigger`] computes when a window boundary will next be crossed.

pub mod evaluator;
pub mod trigger;

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub use evaluator::{active_schedule, is_active};
pub use trigger::{next_trigger, next_trigger_local};

/// Stable identifier for a schedule.
pub type ScheduleId = String;

/// Wall-clock minute of the day, written as zero-padded 24h `HH:MM`.
///
/// Ordering matches the lexical ordering of the string form, so window
/// checks behave exactly like comparing the stored strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Truncate a time of day to its minute.
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// The boundary instant within a day: seconds and fractions zeroed.
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(invalid());
        }
        let digits = |pair: &[u8]| -> Option<u8> {
            if pair.iter().all(u8::is_ascii_digit) {
                Some((pair[0] - b'0') * 10 + (pair[1] - b'0'))
            } else {
                None
            }
        };
        let hour = digits(&bytes[0..2]).ok_or_else(invalid)?;
        let minute = digits(&bytes[3..5]).ok_or_else(invalid)?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Which days of the week a schedule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayFilter {
    #[default]
    All,
    /// Monday through Friday.
    Weekdays,
    /// Saturday and Sunday.
    Weekends,
}

impl DayFilter {
    pub fn matches(self, day: Weekday) -> bool {
        let weekend = matches!(day, Weekday::Sat | Weekday::Sun);
        match self {
            DayFilter::All => true,
            DayFilter::Weekdays => !weekend,
            DayFilter::Weekends => weekend,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayFilter::All => "all",
            DayFilter::Weekdays => "weekdays",
            DayFilter::Weekends => "weekends",
        }
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DayFilter::All),
            "weekdays" => Ok(DayFilter::Weekdays),
            "weekends" => Ok(DayFilter::Weekends),
            other => Err(ValidationError::InvalidValue {
                field: "days".into(),
                message: format!("'{other}' is not one of all, weekdays, weekends"),
            }),
        }
    }
}

/// Which edge of a window a timer tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => f.write_str("start"),
            Boundary::End => f.write_str("end"),
        }
    }
}

/// A recurring access window.
///
/// Stored with camelCase keys (`startTime`, `endTime`, `days`) so records
/// written by the browser settings page deserialize unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSchedule")]
pub struct Schedule {
    pub id: ScheduleId,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub days: DayFilter,
}

/// On-disk shape. Records written before schedules carried an id get one
/// derived from their fields, so it stays the same across reads.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSchedule {
    #[serde(default)]
    id: Option<ScheduleId>,
    start_time: ClockTime,
    end_time: ClockTime,
    #[serde(default)]
    days: DayFilter,
}

impl From<StoredSchedule> for Schedule {
    fn from(stored: StoredSchedule) -> Self {
        let id = stored
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| derived_id(stored.start_time, stored.end_time, stored.days));
        Self {
            id,
            start_time: stored.start_time,
            end_time: stored.end_time,
            days: stored.days,
        }
    }
}

fn generate_id() -> ScheduleId {
    uuid::Uuid::new_v4().to_string()
}

fn derived_id(start_time: ClockTime, end_time: ClockTime, days: DayFilter) -> ScheduleId {
    format!(
        "{:02}{:02}-{:02}{:02}-{}",
        start_time.hour, start_time.minute, end_time.hour, end_time.minute, days
    )
}

/// Make ids unique within one list, keeping list order. A repeated id gets
/// `-2`, `-3`, ... appended, so records stored without an id and sharing a
/// window can still be told apart.
pub(crate) fn disambiguate_ids(schedules: &mut [Schedule]) {
    let mut seen = HashSet::new();
    for schedule in schedules.iter_mut() {
        if seen.insert(schedule.id.clone()) {
            continue;
        }
        let base = schedule.id.clone();
        let mut n = 2;
        while seen.contains(&format!("{base}-{n}")) {
            n += 1;
        }
        schedule.id = format!("{base}-{n}");
        seen.insert(schedule.id.clone());
    }
}

impl Schedule {
    /// Create a schedule with a fresh id.
    ///
    /// # Errors
    ///
    /// Windows that start after they end are rejected: they would never be
    /// active.
    pub fn new(start_time: ClockTime, end_time: ClockTime, days: DayFilter) -> Result<Self, ValidationError> {
        if start_time > end_time {
            return Err(ValidationError::InvalidTimeRange {
                start: start_time.to_string(),
                end: end_time.to_string(),
            });
        }
        Ok(Self {
            id: generate_id(),
            start_time,
            end_time,
            days,
        })
    }

    /// Parse `HH:MM` strings and build a schedule.
    pub fn parse(start_time: &str, end_time: &str, days: DayFilter) -> Result<Self, ValidationError> {
        Self::new(start_time.parse()?, end_time.parse()?, days)
    }

    pub fn boundary(&self, boundary: Boundary) -> ClockTime {
        match boundary {
            Boundary::Start => self.start_time,
            Boundary::End => self.end_time,
        }
    }

    /// Start after end. Such windows never match.
    pub fn is_overnight(&self) -> bool {
        self.start_time > self.end_time
    }

    /// Same window, ignoring identity.
    pub fn same_window(&self, start_time: ClockTime, end_time: ClockTime, days: DayFilter) -> bool {
        self.start_time == start_time && self.end_time == end_time && self.days == days
    }

    /// `"09:00 - 17:00 (weekdays)"`
    pub fn label(&self) -> String {
        format!("{} - {} ({})", self.start_time, self.end_time, self.days)
    }
}
