//! Slot generation for recurring patrol schedules.
//!
//! A schedule names the weekdays it runs on, a daily time window, and a
//! frequency. [`build_schedule_slots`] expands that recurrence into concrete
//! UTC instants inside a bounded window. Calendar days are evaluated in UTC;
//! a daily window whose end does not follow its start spans midnight into
//! the next day, which is how overnight shifts are expressed.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Validation failure raised while constructing schedule values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleValidationError {
    /// A weekday number outside `0..=6`.
    WeekdayOutOfRange {
        /// Rejected weekday number.
        value: u8,
    },
    /// A window whose end precedes its start.
    InvertedWindow,
}

impl fmt::Display for ScheduleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeekdayOutOfRange { value } => {
                write!(f, "weekday {value} is outside 0..=6")
            }
            Self::InvertedWindow => write!(f, "window end precedes its start"),
        }
    }
}

impl std::error::Error for ScheduleValidationError {}

/// Set of weekdays a schedule runs on, numbered `0` (Sunday) to `6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Build a set from weekday numbers, rejecting values above `6`.
    ///
    /// Duplicates collapse; the input is treated as a set.
    pub fn new(days: impl IntoIterator<Item = u8>) -> Result<Self, ScheduleValidationError> {
        let mut mask = 0u8;
        for day in days {
            if day > 6 {
                return Err(ScheduleValidationError::WeekdayOutOfRange { value: day });
            }
            mask |= 1 << day;
        }
        Ok(Self(mask))
    }

    /// Whether the set contains the given calendar weekday.
    #[must_use]
    pub fn contains(self, weekday: Weekday) -> bool {
        let day = weekday.num_days_from_sunday() as u8;
        self.0 & (1 << day) != 0
    }

    /// Whether no weekday is selected.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Selected weekday numbers in ascending order.
    #[must_use]
    pub fn days(self) -> Vec<u8> {
        (0..=6).filter(|day| self.0 & (1 << day) != 0).collect()
    }
}

/// Bounded generation window; both ends are inclusive.
///
/// # Examples
/// ```
/// use backend::domain::schedule::SlotWindow;
/// use chrono::{TimeZone, Utc};
///
/// let from = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
/// let to = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap();
/// let window = SlotWindow::new(from, to).expect("ordered bounds");
/// assert_eq!(window.from(), from);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotWindowDto", into = "SlotWindowDto")]
pub struct SlotWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl SlotWindow {
    /// Create a window, validating `from <= to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, ScheduleValidationError> {
        if to < from {
            return Err(ScheduleValidationError::InvertedWindow);
        }
        Ok(Self { from, to })
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }
}

/// Wire shape for [`SlotWindow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotWindowDto {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TryFrom<SlotWindowDto> for SlotWindow {
    type Error = ScheduleValidationError;

    fn try_from(dto: SlotWindowDto) -> Result<Self, Self::Error> {
        Self::new(dto.from, dto.to)
    }
}

impl From<SlotWindow> for SlotWindowDto {
    fn from(window: SlotWindow) -> Self {
        Self {
            from: window.from,
            to: window.to,
        }
    }
}

/// Expand a schedule's recurrence into chronological UTC instants.
///
/// Each UTC calendar day in the window whose weekday is selected contributes
/// instants every `frequency_minutes` from its start time up to and
/// including its end time. An end time at or before the start time rolls the
/// daily window past midnight. Instants outside the bounding window are
/// dropped. A zero frequency produces nothing.
#[must_use]
pub fn build_schedule_slots(
    window: &SlotWindow,
    weekdays: &WeekdaySet,
    start_time: NaiveTime,
    end_time: NaiveTime,
    frequency_minutes: u32,
) -> Vec<DateTime<Utc>> {
    if frequency_minutes == 0 || weekdays.is_empty() {
        return Vec::new();
    }
    let step = Duration::minutes(i64::from(frequency_minutes));
    let last_day = window.to.date_naive();

    let mut slots = Vec::new();
    for day in window.from.date_naive().iter_days() {
        if day > last_day {
            break;
        }
        if !weekdays.contains(day.weekday()) {
            continue;
        }
        let start_ts = day.and_time(start_time).and_utc();
        let mut end_ts = day.and_time(end_time).and_utc();
        if end_ts <= start_ts {
            end_ts += Duration::hours(24);
        }
        let mut instant = start_ts;
        while instant <= end_ts {
            if instant >= window.from && instant <= window.to {
                slots.push(instant);
            }
            instant += step;
        }
    }
    slots
}
