//! Calendar-feed export: one VEVENT per materialized occurrence, keyed by
//! the occurrence id so downstream calendars can deduplicate across
//! refreshes. Weekly activities stay out of the feed, matching the month
//! view.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ics::ICalendar;
use ics::properties::{DtEnd, DtStart, Summary};

use togethercal_core::types::EventKind;
use togethercal_store::{EventRepository, OccurrenceStore};

use crate::error::ServiceResult;
use crate::ordering::{self, ResolvedOccurrence};

const MIDNIGHT: NaiveTime = NaiveTime::MIN;

/// ## Summary
/// Builds the ICS feed for every occurrence in the inclusive date range,
/// excluding weekly activities. Hour-less occurrences span midnight to the
/// following midnight; timed ones use their hour span as local floating
/// date-times.
///
/// ## Errors
/// Propagates store errors from occurrence resolution.
pub fn build_feed<S>(store: &S, start: NaiveDate, end: NaiveDate) -> ServiceResult<ICalendar<'static>>
where
    S: EventRepository + OccurrenceStore,
{
    let mut resolved = ordering::resolve(store, store.query_range(start, end, None))?;
    ordering::sort_occurrences(&mut resolved);

    let mut icalendar = ICalendar::new("2.0", "-//togethercal//calendar feed//EN");
    for occurrence in resolved
        .iter()
        .filter(|resolved| resolved.kind() != EventKind::WeeklyActivity)
    {
        icalendar.add_event(feed_entry(occurrence));
    }
    Ok(icalendar)
}

fn feed_entry(resolved: &ResolvedOccurrence) -> ics::Event<'static> {
    let date = resolved.occurrence.date;
    let (start_time, end_time) = resolved.hours();

    let dtstart = date.and_time(start_time.unwrap_or(MIDNIGHT));
    let dtend = match end_time {
        Some(end_time) => date.and_time(end_time),
        // All-day slice: exclusive end at the following midnight.
        None => next_midnight(date),
    };

    let mut entry = ics::Event::new(
        resolved.occurrence.id.to_string(),
        format_datetime(dtstart),
    );
    entry.push(DtStart::new(format_datetime(dtstart)));
    entry.push(DtEnd::new(format_datetime(dtend)));
    entry.push(Summary::new(resolved.title().to_string()));
    entry
}

fn next_midnight(date: NaiveDate) -> NaiveDateTime {
    date.succ_opt().unwrap_or(date).and_time(MIDNIGHT)
}

fn format_datetime(datetime: NaiveDateTime) -> String {
    datetime.format("%Y%m%dT%H%M%S").to_string()
}
