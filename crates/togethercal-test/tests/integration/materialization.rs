//! End-to-end materialization properties: idempotence, the uniqueness
//! invariant, per-variant expansion semantics, and rematerialization
//! after edits.

use chrono::{Datelike, Weekday};

use togethercal_test::component::recurrence::RecurrenceEngine;
use togethercal_test::component::store::{
    EventDetails, EventRepository, MemoryStore, OccurrenceStore,
};

use crate::helpers::{date, datetime, holiday, one_time, special_day, time, weekly};

#[test_log::test]
fn materialization_is_idempotent_for_every_variant() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 1);

    let events = vec![
        holiday("Holiday", date(2024, 1, 10), date(2024, 1, 12)),
        special_day("Special", 6, 15),
        weekly(
            "Weekly",
            date(2024, 1, 1),
            date(2024, 3, 31),
            Weekday::Wed,
            time(16, 0),
            time(17, 0),
            true,
        ),
        one_time("Once", datetime(2024, 2, 1, 9, 0), None),
    ];

    let mut ids = Vec::new();
    for event in events {
        ids.push(engine.create_event(&store, event, today).unwrap().id);
    }

    let before = store.query_range(date(2024, 1, 1), date(2040, 12, 31), None);
    for id in &ids {
        assert_eq!(engine.materialize(&store, *id, today).unwrap(), 0);
    }
    let after = store.query_range(date(2024, 1, 1), date(2040, 12, 31), None);
    assert_eq!(before, after);
}

#[test_log::test]
fn no_duplicates_survive_mixed_materialization_sequences() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 1);

    let event = engine
        .create_event(
            &store,
            holiday("Holiday", date(2024, 1, 10), date(2024, 1, 12)),
            today,
        )
        .unwrap();

    engine.materialize(&store, event.id, today).unwrap();
    engine.rematerialize(&store, event.id, today).unwrap();
    engine.materialize(&store, event.id, today).unwrap();

    let occurrences = store.query_range(date(2024, 1, 1), date(2024, 1, 31), None);
    assert_eq!(occurrences.len(), 3);
    let mut pairs: Vec<_> = occurrences
        .iter()
        .map(|occurrence| (occurrence.event_id, occurrence.date))
        .collect();
    pairs.dedup();
    assert_eq!(pairs.len(), 3);
}

#[test_log::test]
fn holiday_expands_to_the_exact_closed_range() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 1);

    engine
        .create_event(
            &store,
            holiday("Holiday", date(2024, 1, 10), date(2024, 1, 12)),
            today,
        )
        .unwrap();

    let dates: Vec<_> = store
        .query_range(date(2024, 1, 1), date(2024, 1, 31), None)
        .into_iter()
        .map(|occurrence| occurrence.date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2024, 1, 10), date(2024, 1, 11), date(2024, 1, 12)]
    );
}

#[test_log::test]
fn leap_day_special_day_falls_back_to_february_28() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2023, 1, 1);

    engine
        .create_event(&store, special_day("Leap anniversary", 2, 29), today)
        .unwrap();

    let dates: Vec<_> = store
        .query_range(date(2023, 1, 1), date(2032, 12, 31), None)
        .into_iter()
        .map(|occurrence| occurrence.date)
        .collect();

    assert_eq!(dates.len(), 10);
    for occurrence_date in &dates {
        let expected_day = if occurrence_date.leap_year() { 29 } else { 28 };
        assert_eq!(occurrence_date.month(), 2);
        assert_eq!(occurrence_date.day(), expected_day);
    }
    // One date per year, 2023 through 2032.
    let years: Vec<_> = dates.iter().map(chrono::Datelike::year).collect();
    assert_eq!(years, (2023..=2032).collect::<Vec<_>>());
}

#[test_log::test]
fn weekly_activity_excludes_materialized_holiday_mondays() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 1);

    engine
        .create_event(
            &store,
            holiday("Holiday Monday", date(2024, 1, 8), date(2024, 1, 8)),
            today,
        )
        .unwrap();
    let activity = engine
        .create_event(
            &store,
            weekly(
                "Mondays",
                date(2024, 1, 1),
                date(2024, 1, 31),
                Weekday::Mon,
                time(9, 0),
                time(10, 0),
                false,
            ),
            today,
        )
        .unwrap();

    let dates: Vec<_> = store
        .query_range(date(2024, 1, 1), date(2024, 1, 31), None)
        .into_iter()
        .filter(|occurrence| occurrence.event_id == activity.id)
        .map(|occurrence| occurrence.date)
        .collect();
    assert_eq!(
        dates,
        vec![
            date(2024, 1, 1),
            date(2024, 1, 15),
            date(2024, 1, 22),
            date(2024, 1, 29)
        ]
    );
}

#[test_log::test]
fn rematerialize_after_shrink_leaves_no_stale_occurrences() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 1);

    let mut activity = engine
        .create_event(
            &store,
            weekly(
                "Mondays",
                date(2024, 1, 1),
                date(2024, 3, 31),
                Weekday::Mon,
                time(9, 0),
                time(10, 0),
                true,
            ),
            today,
        )
        .unwrap();

    activity.details = EventDetails::WeeklyActivity {
        start_date: date(2024, 1, 1),
        end_date: date(2024, 1, 31),
        weekday: Weekday::Mon,
        start_time: time(9, 0),
        end_time: time(10, 0),
        include_holidays: true,
    };
    engine.update_event(&store, activity.clone(), today).unwrap();

    let stale = store
        .query_range(date(2024, 2, 1), date(2024, 12, 31), None)
        .into_iter()
        .filter(|occurrence| occurrence.event_id == activity.id)
        .count();
    assert_eq!(stale, 0);
    assert_eq!(
        store
            .query_range(date(2024, 1, 1), date(2024, 1, 31), None)
            .len(),
        5
    );
}

#[test_log::test]
fn validation_failures_leave_the_store_untouched() {
    let store = MemoryStore::new();
    let engine = RecurrenceEngine::default();
    let today = date(2024, 1, 1);

    let result = engine.create_event(
        &store,
        holiday("Backwards", date(2024, 1, 12), date(2024, 1, 10)),
        today,
    );
    assert!(result.is_err());
    assert!(store.list_events().is_empty());
    assert!(
        store
            .query_range(date(2024, 1, 1), date(2024, 12, 31), None)
            .is_empty()
    );
}
