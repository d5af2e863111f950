//! Holiday import from an external ICS feed. Events are keyed by
//! `(source_url, uid)` so re-importing the same feed updates holidays in
//! place instead of duplicating them, and each imported holiday is
//! rematerialized immediately.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use togethercal_store::{CalendarEvent, EventDetails, EventRepository, OccurrenceStore};

use crate::error::{ServiceError, ServiceResult};
use crate::recurrence::RecurrenceEngine;

/// Outcome counters for one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// A VEVENT reduced to the fields a holiday needs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportedHoliday {
    uid: String,
    summary: String,
    start_date: NaiveDate,
    /// Inclusive, already converted from the feed's exclusive DTEND.
    end_date: NaiveDate,
}

/// DTSTART/DTEND value: feeds carry either bare dates or date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stamp {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Stamp {
    fn date(self) -> NaiveDate {
        match self {
            Self::Date(date) => date,
            Self::DateTime(datetime) => datetime.date(),
        }
    }

    /// Converts an exclusive DTEND into the last covered calendar date.
    /// A date value or a midnight timestamp ends the previous day; any
    /// other time still covers its own day.
    fn end_date_inclusive(self) -> NaiveDate {
        match self {
            Self::Date(date) => previous_day(date),
            Self::DateTime(datetime) if datetime.time() == NaiveTime::MIN => {
                previous_day(datetime.date())
            }
            Self::DateTime(datetime) => datetime.date(),
        }
    }
}

fn previous_day(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(1)).unwrap_or(date)
}

/// ## Summary
/// Fetches an ICS feed over HTTP.
///
/// ## Errors
/// Returns an HTTP error for connection failures or non-success statuses.
pub async fn fetch_ics(url: &str) -> ServiceResult<String> {
    let body = reqwest::get(url)
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body)
}

/// ## Summary
/// Fetches the feed at `url` and imports its holidays.
///
/// ## Errors
/// Propagates HTTP, parse, and store errors.
pub async fn fetch_and_import<S>(
    store: &S,
    engine: &RecurrenceEngine,
    url: &str,
    today: NaiveDate,
    ignore_past: bool,
) -> ServiceResult<ImportStats>
where
    S: EventRepository + OccurrenceStore,
{
    let text = fetch_ics(url).await?;
    import_holidays(store, engine, url, &text, today, ignore_past)
}

/// ## Summary
/// Imports every VEVENT in `text` as a holiday keyed by
/// `(source_url, uid)`: existing holidays are updated in place and
/// rematerialized, new ones are created and materialized. With
/// `ignore_past`, events that ended before `today` are skipped.
///
/// ## Errors
/// Returns a parse error for a VEVENT missing UID, SUMMARY, or DTSTART —
/// malformed events are reported, not silently dropped — and propagates
/// validation and store errors.
pub fn import_holidays<S>(
    store: &S,
    engine: &RecurrenceEngine,
    source_url: &str,
    text: &str,
    today: NaiveDate,
    ignore_past: bool,
) -> ServiceResult<ImportStats>
where
    S: EventRepository + OccurrenceStore,
{
    let mut stats = ImportStats::default();

    for imported in parse_vevents(text)? {
        if ignore_past && imported.end_date < today {
            stats.skipped += 1;
            continue;
        }

        let details = EventDetails::Holiday {
            source_url: Some(source_url.to_string()),
            uid: Some(imported.uid.clone()),
            start_date: imported.start_date,
            end_date: imported.end_date,
        };

        if let Some(mut existing) = store.find_holiday_by_import_key(source_url, &imported.uid) {
            existing.title = imported.summary;
            existing.details = details;
            engine.update_event(store, existing, today)?;
            stats.updated += 1;
        } else {
            let event = CalendarEvent::new(imported.summary, None, details);
            engine.create_event(store, event, today)?;
            stats.created += 1;
        }
    }

    tracing::info!(
        source_url,
        created = stats.created,
        updated = stats.updated,
        skipped = stats.skipped,
        "imported holiday feed"
    );
    Ok(stats)
}

/// Parses the VEVENTs out of an ICS document: unfolds continuation lines,
/// then collects UID, SUMMARY, DTSTART, and DTEND per component.
fn parse_vevents(text: &str) -> ServiceResult<Vec<ImportedHoliday>> {
    let mut events = Vec::new();

    let mut in_event = false;
    let mut uid: Option<String> = None;
    let mut summary: Option<String> = None;
    let mut dtstart: Option<Stamp> = None;
    let mut dtend: Option<Stamp> = None;

    for line in unfold(text) {
        let (name, value) = split_content_line(&line)?;
        match name.as_str() {
            "BEGIN" if value.eq_ignore_ascii_case("VEVENT") => {
                in_event = true;
                uid = None;
                summary = None;
                dtstart = None;
                dtend = None;
            }
            "END" if value.eq_ignore_ascii_case("VEVENT") => {
                let start = dtstart
                    .ok_or_else(|| ServiceError::ParseError("VEVENT without DTSTART".to_string()))?
                    .date();
                let end_date = dtend.map_or(start, Stamp::end_date_inclusive).max(start);
                events.push(ImportedHoliday {
                    uid: uid.take().ok_or_else(|| {
                        ServiceError::ParseError("VEVENT without UID".to_string())
                    })?,
                    summary: summary.take().ok_or_else(|| {
                        ServiceError::ParseError("VEVENT without SUMMARY".to_string())
                    })?,
                    start_date: start,
                    end_date,
                });
                in_event = false;
            }
            _ if !in_event => {}
            "UID" => uid = Some(value),
            "SUMMARY" => summary = Some(unescape_text(&value)),
            "DTSTART" => dtstart = Some(parse_stamp(&value)?),
            "DTEND" => dtend = Some(parse_stamp(&value)?),
            _ => {}
        }
    }

    Ok(events)
}

/// Reverses RFC 5545 line folding: a line starting with a space or tab
/// continues the previous one.
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        if let Some(continuation) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(continuation);
                continue;
            }
        }
        lines.push(raw.trim_end_matches('\r').to_string());
    }
    lines.retain(|line| !line.is_empty());
    lines
}

/// Splits `NAME;PARAMS:VALUE` into the uppercased name (parameters
/// dropped) and the raw value.
fn split_content_line(line: &str) -> ServiceResult<(String, String)> {
    let (head, value) = line
        .split_once(':')
        .ok_or_else(|| ServiceError::ParseError(format!("content line without ':': {line}")))?;
    let name = head.split(';').next().unwrap_or(head).to_ascii_uppercase();
    Ok((name, value.to_string()))
}

fn parse_stamp(value: &str) -> ServiceResult<Stamp> {
    let value = value.trim().trim_end_matches('Z');
    if value.contains('T') {
        NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
            .map(Stamp::DateTime)
            .map_err(|err| ServiceError::ParseError(format!("bad date-time '{value}': {err}")))
    } else {
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .map(Stamp::Date)
            .map_err(|err| ServiceError::ParseError(format!("bad date '{value}': {err}")))
    }
}

fn unescape_text(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\\\", "\\")
}
