use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use togethercal_core::error::{CoreError, CoreResult};
use togethercal_core::types::EventKind;

pub type EventId = uuid::Uuid;

/// Leap year used to decide whether a (month, day) pair can ever form a
/// real date. Any leap year works; 2000 is one.
const REFERENCE_LEAP_YEAR: i32 = 2000;

/// An abstract calendar event: shared fields plus the variant-specific
/// recurrence definition. Expansion into concrete dates lives in the
/// service layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    /// Icon reference; resolved externally from title keywords when absent.
    pub icon: Option<String>,
    pub details: EventDetails,
}

/// Closed union over the four supported event variants. The discriminant
/// doubles as the variant tag exposed to feed consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventDetails {
    /// Multi-day holiday, inclusive date range. `source_url` and `uid`
    /// together form the idempotent import key when both are present.
    Holiday {
        source_url: Option<String>,
        uid: Option<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// Yearly special day identified by (month, day).
    SpecialDay { month: u32, day: u32 },
    /// Weekly activity within an inclusive date range, at a fixed weekday
    /// and time-of-day span.
    WeeklyActivity {
        start_date: NaiveDate,
        end_date: NaiveDate,
        weekday: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        /// Activities stay off holiday dates unless this is set.
        #[serde(default)]
        include_holidays: bool,
    },
    /// Singular event with a start instant and an optional end instant.
    OneTimeEvent {
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    },
}

impl CalendarEvent {
    #[must_use]
    pub fn new<S: Into<String>>(title: S, icon: Option<String>, details: EventDetails) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            title: title.into(),
            icon,
            details,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.details.kind()
    }

    /// Canonicalizes fields before validation, mirroring what a form layer
    /// would do: an empty import UID becomes `None` so the import key
    /// stays usable.
    pub fn normalize(&mut self) {
        if let EventDetails::Holiday { uid, .. } = &mut self.details {
            if uid.as_deref() == Some("") {
                *uid = None;
            }
        }
    }

    /// ## Summary
    /// Validates the event before any store mutation. Expansion assumes a
    /// validated event and is total over one.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` for an empty title, a start
    /// date after its end date, or a (month, day) pair that is not a real
    /// date in any Gregorian year.
    pub fn validate(&self) -> CoreResult<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "title must not be empty".to_string(),
            ));
        }
        self.details.validate()
    }
}

impl EventDetails {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Holiday { .. } => EventKind::Holiday,
            Self::SpecialDay { .. } => EventKind::SpecialDay,
            Self::WeeklyActivity { .. } => EventKind::WeeklyActivity,
            Self::OneTimeEvent { .. } => EventKind::OneTimeEvent,
        }
    }

    fn validate(&self) -> CoreResult<()> {
        match self {
            Self::Holiday {
                start_date,
                end_date,
                ..
            } => validate_range(*start_date, *end_date),
            Self::SpecialDay { month, day } => {
                if NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, *month, *day).is_none() {
                    return Err(CoreError::ValidationError(format!(
                        "no year has a date with month {month} and day {day}"
                    )));
                }
                Ok(())
            }
            Self::WeeklyActivity {
                start_date,
                end_date,
                ..
            } => validate_range(*start_date, *end_date),
            Self::OneTimeEvent { start, end } => {
                if let Some(end) = end {
                    if start > end {
                        return Err(CoreError::ValidationError(
                            "start date cannot be later than end date".to_string(),
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

fn validate_range(start_date: NaiveDate, end_date: NaiveDate) -> CoreResult<()> {
    if start_date > end_date {
        return Err(CoreError::ValidationError(
            "start date cannot be later than end date".to_string(),
        ));
    }
    Ok(())
}
