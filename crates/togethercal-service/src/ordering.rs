//! Deterministic ordering of occurrences for day and month views.
//!
//! Every occurrence gets a numeric sort key: holidays and special days use
//! fixed negative constants, timed kinds use epoch seconds of their start.
//! Since any real-world epoch is far above the constants, holidays sort
//! first, special days second, timed kinds after, in start order — this
//! relative placement is load-bearing policy. Ties keep input order
//! (stable sort, no secondary key).

use chrono::{NaiveDate, NaiveTime};

use togethercal_core::types::EventKind;
use togethercal_store::{CalendarEvent, EventDetails, EventRepository, Occurrence, OccurrenceStore};

use crate::error::ServiceResult;
use crate::expand;

pub const HOLIDAY_SORT_KEY: i64 = -20;
pub const SPECIAL_DAY_SORT_KEY: i64 = -10;

/// ## Summary
/// The sort key of an event on a given occurrence date.
#[must_use]
pub fn sort_key(details: &EventDetails, date: NaiveDate) -> i64 {
    match details {
        EventDetails::Holiday { .. } => HOLIDAY_SORT_KEY,
        EventDetails::SpecialDay { .. } => SPECIAL_DAY_SORT_KEY,
        EventDetails::OneTimeEvent { start, .. } => start.and_utc().timestamp(),
        EventDetails::WeeklyActivity { start_time, .. } => {
            date.and_time(*start_time).and_utc().timestamp()
        }
    }
}

/// An occurrence joined with its owning event, ready for presentation.
#[derive(Debug, Clone)]
pub struct ResolvedOccurrence {
    pub occurrence: Occurrence,
    pub event: CalendarEvent,
}

impl ResolvedOccurrence {
    #[must_use]
    pub fn sort_key(&self) -> i64 {
        sort_key(&self.event.details, self.occurrence.date)
    }

    #[must_use]
    pub fn hours(&self) -> (Option<NaiveTime>, Option<NaiveTime>) {
        expand::hours(&self.event.details, self.occurrence.date)
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.event.kind()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.event.title
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.event.icon.as_deref()
    }
}

/// ## Summary
/// Joins occurrences with their owning events.
///
/// ## Errors
/// Returns `EventNotFound` if an occurrence references a missing event,
/// which would mean the cascade invariant was broken.
pub fn resolve<R: EventRepository>(
    repository: &R,
    occurrences: Vec<Occurrence>,
) -> ServiceResult<Vec<ResolvedOccurrence>> {
    occurrences
        .into_iter()
        .map(|occurrence| {
            let event = repository.get_event(occurrence.event_id)?;
            Ok(ResolvedOccurrence { occurrence, event })
        })
        .collect()
}

/// Stable ascending sort by sort key; equal keys keep input order.
pub fn sort_occurrences(occurrences: &mut [ResolvedOccurrence]) {
    occurrences.sort_by_key(ResolvedOccurrence::sort_key);
}

/// ## Summary
/// The day-view artifact: every occurrence on `date`, resolved and sorted.
///
/// ## Errors
/// Propagates store errors from event resolution.
pub fn day_view<S>(store: &S, date: NaiveDate) -> ServiceResult<Vec<ResolvedOccurrence>>
where
    S: EventRepository + OccurrenceStore,
{
    let mut resolved = resolve(store, store.query_date(date))?;
    sort_occurrences(&mut resolved);
    Ok(resolved)
}
