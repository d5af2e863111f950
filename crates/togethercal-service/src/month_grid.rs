//! Assembles a month of occurrences into an abstract 7-column grid.
//! Rendering the grid into markup is the caller's concern.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use togethercal_core::types::EventKind;
use togethercal_store::{EventRepository, OccurrenceStore};

use crate::error::{ServiceError, ServiceResult};
use crate::ordering::{self, ResolvedOccurrence};

/// One rendered item inside a day cell, in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    pub kind: EventKind,
    pub title: String,
    /// Icon reference; `None` for holiday entries, which contribute their
    /// title instead.
    pub icon: Option<String>,
}

/// One day of the displayed month. Padding cells outside the month are
/// represented as `None` in the grid rows and never carry content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub is_today: bool,
    pub is_holiday: bool,
    pub entries: Vec<DayEntry>,
}

/// The month view consumed by external renderers: rows of seven cells
/// starting on the configured first weekday.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<Option<DayCell>>>,
}

impl MonthGrid {
    /// ## Summary
    /// Builds the grid for (year, month): loads the month's occurrences,
    /// sorts them, classifies them per day, and lays the days into
    /// 7-column weeks with empty padding cells. Weekly activities are
    /// deliberately filtered out of the month view; only day views list
    /// them.
    ///
    /// ## Errors
    /// Returns a validation error for an impossible (year, month) and
    /// propagates store errors from occurrence resolution.
    pub fn build<S>(
        store: &S,
        year: i32,
        month: u32,
        today: NaiveDate,
        first_weekday: Weekday,
        default_icon: &str,
    ) -> ServiceResult<Self>
    where
        S: EventRepository + OccurrenceStore,
    {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ServiceError::ValidationError(format!("no such month: {year}-{month}"))
        })?;
        let last = last_day_of_month(first);

        let mut occurrences = ordering::resolve(store, store.query_range(first, last, None))?;
        ordering::sort_occurrences(&mut occurrences);

        let mut cells: Vec<Option<DayCell>> = Vec::new();
        let leading = offset_from(first.weekday(), first_weekday);
        cells.resize(leading, None);

        for date in first.iter_days().take_while(|date| *date <= last) {
            cells.push(Some(day_cell(&occurrences, date, today, default_icon)));
        }
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        let weeks = cells.chunks(7).map(<[Option<DayCell>]>::to_vec).collect();
        Ok(Self { year, month, weeks })
    }
}

fn day_cell(
    occurrences: &[ResolvedOccurrence],
    date: NaiveDate,
    today: NaiveDate,
    default_icon: &str,
) -> DayCell {
    let mut is_holiday = false;
    let mut entries = Vec::new();

    for resolved in occurrences
        .iter()
        .filter(|resolved| resolved.occurrence.date == date)
    {
        match resolved.kind() {
            EventKind::Holiday => {
                is_holiday = true;
                entries.push(DayEntry {
                    kind: EventKind::Holiday,
                    title: resolved.title().to_string(),
                    icon: None,
                });
            }
            EventKind::SpecialDay | EventKind::OneTimeEvent => {
                entries.push(DayEntry {
                    kind: resolved.kind(),
                    title: resolved.title().to_string(),
                    icon: Some(
                        resolved
                            .icon()
                            .map_or_else(|| default_icon.to_string(), str::to_string),
                    ),
                });
            }
            // Month grids show only the badge-like kinds.
            EventKind::WeeklyActivity => {}
        }
    }

    DayCell {
        date,
        day: date.day(),
        is_today: date == today,
        is_holiday,
        entries,
    }
}

/// The last calendar date of the month containing `first`.
#[must_use]
pub fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    // The first of the month always exists, so the next month's first day
    // does too.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Columns between the grid's first weekday and the given weekday.
fn offset_from(weekday: Weekday, first_weekday: Weekday) -> usize {
    let days = (weekday.num_days_from_monday() + 7 - first_weekday.num_days_from_monday()) % 7;
    usize::try_from(days).unwrap_or_default()
}
