//! Day-view ordering, month-grid assembly, and the feed import/export
//! round through the public surface.

use chrono::Weekday;

use togethercal_test::component::import;
use togethercal_test::component::month_grid::MonthGrid;
use togethercal_test::component::ordering::{self, ResolvedOccurrence};
use togethercal_test::component::recurrence::RecurrenceEngine;
use togethercal_test::component::store::{MemoryStore, OccurrenceStore};
use togethercal_test::component::types::EventKind;
use togethercal_test::component::feed;

use crate::helpers::{date, datetime, holiday, one_time, special_day, time, weekly};

#[test_log::test]
fn day_view_orders_holiday_special_then_timed() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 1);
    let day = date(2024, 1, 8);

    engine
        .create_event(
            &store,
            weekly(
                "Swimming",
                day,
                day,
                Weekday::Mon,
                time(9, 0),
                time(10, 0),
                true,
            ),
            today,
        )
        .unwrap();
    engine
        .create_event(&store, one_time("Dentist", datetime(2024, 1, 8, 8, 0), None), today)
        .unwrap();
    engine
        .create_event(&store, special_day("Anniversary", 1, 8), today)
        .unwrap();
    engine
        .create_event(&store, holiday("Holiday", day, day), today)
        .unwrap();

    let view = ordering::day_view(&store, day).unwrap();
    let kinds: Vec<_> = view.iter().map(ResolvedOccurrence::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Holiday,
            EventKind::SpecialDay,
            EventKind::OneTimeEvent,
            EventKind::WeeklyActivity
        ]
    );

    // An absent end collapses to the start, so both bounds report 08:00.
    let dentist = &view[2];
    assert_eq!(dentist.hours(), (Some(time(8, 0)), Some(time(8, 0))));
}

#[test_log::test]
fn one_time_event_hours_round_trip_through_the_day_view() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 1);

    engine
        .create_event(
            &store,
            one_time(
                "Workshop",
                datetime(2024, 3, 1, 10, 0),
                Some(datetime(2024, 3, 1, 12, 0)),
            ),
            today,
        )
        .unwrap();

    let view = ordering::day_view(&store, date(2024, 3, 1)).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].hours(), (Some(time(10, 0)), Some(time(12, 0))));
    assert!(ordering::day_view(&store, date(2024, 3, 2)).unwrap().is_empty());
}

#[test_log::test]
fn month_grid_marks_holidays_and_hides_weeklies() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 15);

    engine
        .create_event(
            &store,
            holiday("Winter break", date(2024, 1, 8), date(2024, 1, 9)),
            today,
        )
        .unwrap();
    engine
        .create_event(
            &store,
            weekly(
                "Scouts",
                date(2024, 1, 1),
                date(2024, 1, 31),
                Weekday::Mon,
                time(17, 0),
                time(18, 30),
                true,
            ),
            today,
        )
        .unwrap();

    let grid = MonthGrid::build(&store, 2024, 1, today, Weekday::Sun, "star").unwrap();

    let cells: Vec<_> = grid.weeks.iter().flatten().flatten().collect();
    let holidays: Vec<_> = cells.iter().filter(|cell| cell.is_holiday).collect();
    assert_eq!(holidays.len(), 2);
    assert_eq!(holidays[0].day, 8);
    assert_eq!(holidays[1].day, 9);

    assert!(
        cells
            .iter()
            .flat_map(|cell| &cell.entries)
            .all(|entry| entry.kind != EventKind::WeeklyActivity)
    );

    let todays: Vec<_> = cells.iter().filter(|cell| cell.is_today).collect();
    assert_eq!(todays.len(), 1);
    assert_eq!(todays[0].day, 15);
}

#[test_log::test]
fn imported_feed_round_trips_into_grid_and_export() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 4, 1);
    let source = "https://example.org/holidays.ics";
    let ics_text = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:memorial@example.org\r\n\
SUMMARY:Memorial Day\r\n\
DTSTART;VALUE=DATE:20240513\r\n\
DTEND;VALUE=DATE:20240514\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    let stats = import::import_holidays(&store, &engine, source, ics_text, today, false).unwrap();
    assert_eq!(stats.created, 1);

    // A weekly activity in the same month stays out of the export.
    engine
        .create_event(
            &store,
            weekly(
                "Choir",
                date(2024, 5, 1),
                date(2024, 5, 31),
                Weekday::Tue,
                time(18, 0),
                time(19, 0),
                true,
            ),
            today,
        )
        .unwrap();

    let grid = MonthGrid::build(&store, 2024, 5, today, Weekday::Sun, "star").unwrap();
    let holiday_cell = grid
        .weeks
        .iter()
        .flatten()
        .flatten()
        .find(|cell| cell.is_holiday)
        .unwrap();
    assert_eq!(holiday_cell.day, 13);
    assert_eq!(holiday_cell.entries[0].title, "Memorial Day");

    let export = feed::build_feed(&store, date(2024, 5, 1), date(2024, 5, 31))
        .unwrap()
        .to_string();
    assert!(export.contains("SUMMARY:Memorial Day"));
    assert!(!export.contains("SUMMARY:Choir"));

    let occurrence = store.query_date(date(2024, 5, 13))[0];
    assert!(export.contains(&format!("UID:{}", occurrence.id)));
}
