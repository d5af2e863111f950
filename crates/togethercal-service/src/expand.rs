//! Pure recurrence expansion: maps a validated event definition to the set
//! of calendar dates it occupies, plus the time-of-day span it holds on a
//! given date. "Today" is always injected by the caller so leap-year and
//! horizon logic stays deterministic under test.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, NaiveTime};

use togethercal_store::EventDetails;

/// Years ahead a special day is materialized when no configuration says
/// otherwise.
pub const DEFAULT_HORIZON_YEARS: u32 = 10;

/// Inputs for one expansion run.
#[derive(Debug, Clone)]
pub struct ExpansionContext {
    /// The injected current date; anchors the special-day horizon.
    pub today: NaiveDate,
    /// How many years of special-day occurrences to produce.
    pub horizon_years: u32,
    /// Dates a weekly activity must not occur on (holiday exclusion).
    /// Empty for every other variant.
    pub skip: HashSet<NaiveDate>,
}

impl ExpansionContext {
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            horizon_years: DEFAULT_HORIZON_YEARS,
            skip: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_skip<I: IntoIterator<Item = NaiveDate>>(mut self, skip: I) -> Self {
        self.skip = skip.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_horizon_years(mut self, years: u32) -> Self {
        self.horizon_years = years;
        self
    }
}

/// ## Summary
/// Expands an event definition into the sorted, duplicate-free list of
/// dates it occupies. Total over validated input; an unexpandable
/// (month, day) pair is caught by validation before this runs.
#[must_use]
pub fn expand(details: &EventDetails, ctx: &ExpansionContext) -> Vec<NaiveDate> {
    match details {
        EventDetails::Holiday {
            start_date,
            end_date,
            ..
        } => daily_range(*start_date, *end_date),

        EventDetails::SpecialDay { month, day } => {
            let first_year = ctx.today.year();
            let last_year =
                first_year.saturating_add(i32::try_from(ctx.horizon_years).unwrap_or(i32::MAX));
            (first_year..last_year)
                .filter_map(|year| yearly_date(year, *month, *day))
                .collect()
        }

        EventDetails::WeeklyActivity {
            start_date,
            end_date,
            weekday,
            ..
        } => start_date
            .iter_days()
            .take_while(|date| date <= end_date)
            .filter(|date| date.weekday() == *weekday)
            .filter(|date| !ctx.skip.contains(date))
            .collect(),

        EventDetails::OneTimeEvent { start, end } => {
            daily_range(start.date(), end.unwrap_or(*start).date())
        }
    }
}

/// ## Summary
/// The time-of-day span the event occupies on `date`, for presentation.
/// `(None, None)` for date-only variants; a one-time event reports its
/// start time only on its start date and its end time only on its end
/// date, which on a one-day event means both.
#[must_use]
pub fn hours(details: &EventDetails, date: NaiveDate) -> (Option<NaiveTime>, Option<NaiveTime>) {
    match details {
        EventDetails::Holiday { .. } | EventDetails::SpecialDay { .. } => (None, None),

        EventDetails::WeeklyActivity {
            start_time,
            end_time,
            ..
        } => (Some(*start_time), Some(*end_time)),

        EventDetails::OneTimeEvent { start, end } => {
            let end = end.unwrap_or(*start);
            let starts_here = (start.date() == date).then(|| start.time());
            let ends_here = (end.date() == date).then(|| end.time());
            (starts_here, ends_here)
        }
    }
}

fn daily_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|date| *date <= end).collect()
}

/// The (month, day) date within `year`, stepping back one day when the
/// exact pair does not exist there. Feb 29 outside leap years is the only
/// such pair that survives validation.
fn yearly_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        day.checked_sub(1)
            .and_then(|previous| NaiveDate::from_ymd_opt(year, month, previous))
    })
}
