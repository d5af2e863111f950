//! In-memory indexed store backing the occurrence and event contracts.
//!
//! Occurrences live in a `BTreeMap` keyed by `(date, event_id)`: the
//! composite key is the uniqueness constraint on `(event, date)` and the
//! date-first ordering makes range queries a map range scan. The interior
//! `RwLock` write guard is the transaction boundary; `replace_for_event`
//! holds it across delete and reinsert so concurrent readers never observe
//! a transient empty state for an event that still exists.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use togethercal_core::error::CoreError;
use togethercal_core::types::EventKind;

use crate::error::{StoreError, StoreResult};
use crate::model::{CalendarEvent, EventDetails, EventId, Occurrence};

/// Event persistence contract. Validation runs before any mutation; no
/// partial writes.
pub trait EventRepository {
    /// ## Summary
    /// Normalizes, validates, and inserts a new event.
    ///
    /// ## Errors
    /// Returns a validation error before anything is stored, or an
    /// invariant violation if the id is already taken.
    fn insert_event(&self, event: CalendarEvent) -> StoreResult<CalendarEvent>;

    /// ## Summary
    /// Normalizes, validates, and replaces an existing event in place.
    /// Occurrences are left untouched; callers rematerialize afterwards.
    ///
    /// ## Errors
    /// Returns a validation error, or `EventNotFound` for an unknown id.
    fn update_event(&self, event: CalendarEvent) -> StoreResult<CalendarEvent>;

    /// ## Summary
    /// Deletes an event and cascades removal of its occurrences.
    ///
    /// ## Errors
    /// Returns `EventNotFound` for an unknown id.
    fn delete_event(&self, event_id: EventId) -> StoreResult<()>;

    /// ## Summary
    /// Resolves an event id to its tagged instance.
    ///
    /// ## Errors
    /// Returns `EventNotFound` for an unknown id.
    fn get_event(&self, event_id: EventId) -> StoreResult<CalendarEvent>;

    /// All stored events, in no particular order.
    fn list_events(&self) -> Vec<CalendarEvent>;

    /// Looks up a holiday by its `(source_url, uid)` import key.
    fn find_holiday_by_import_key(&self, source_url: &str, uid: &str) -> Option<CalendarEvent>;
}

/// Occurrence persistence contract with the `(event, date)` uniqueness
/// guarantee.
pub trait OccurrenceStore {
    /// ## Summary
    /// Inserts an occurrence for `(event_id, date)` unless one already
    /// exists. An existing pair is a successful no-op, never an error; the
    /// boolean reports whether an insert happened.
    ///
    /// ## Errors
    /// Returns `EventNotFound` if the owning event does not exist.
    fn get_or_create(&self, event_id: EventId, date: NaiveDate) -> StoreResult<(Occurrence, bool)>;

    /// ## Summary
    /// Removes every occurrence owned by the event, returning how many
    /// were removed.
    ///
    /// ## Errors
    /// Returns `EventNotFound` for an unknown id.
    fn delete_for_event(&self, event_id: EventId) -> StoreResult<usize>;

    /// ## Summary
    /// Atomically replaces the event's occurrence set with the given
    /// dates, under a single write guard. Dates already present keep their
    /// occurrence identity.
    ///
    /// ## Errors
    /// Returns `EventNotFound` for an unknown id.
    fn replace_for_event(&self, event_id: EventId, dates: &[NaiveDate]) -> StoreResult<()>;

    /// Occurrences with `start <= date <= end`, optionally restricted to
    /// one event kind, ordered by date.
    fn query_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        kind: Option<EventKind>,
    ) -> Vec<Occurrence>;

    /// Occurrences on exactly the given date.
    fn query_date(&self, date: NaiveDate) -> Vec<Occurrence>;
}

#[derive(Debug, Default)]
struct Inner {
    events: HashMap<EventId, CalendarEvent>,
    occurrences: BTreeMap<(NaiveDate, EventId), Occurrence>,
}

/// In-memory arena implementing both store contracts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventRepository for MemoryStore {
    fn insert_event(&self, mut event: CalendarEvent) -> StoreResult<CalendarEvent> {
        event.normalize();
        event.validate()?;

        let mut inner = self.write();
        if inner.events.contains_key(&event.id) {
            return Err(StoreError::CoreError(CoreError::InvariantViolation(
                "event id already exists",
            )));
        }
        tracing::debug!(event_id = %event.id, kind = %event.kind(), "inserting event");
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    fn update_event(&self, mut event: CalendarEvent) -> StoreResult<CalendarEvent> {
        event.normalize();
        event.validate()?;

        let mut inner = self.write();
        if !inner.events.contains_key(&event.id) {
            return Err(StoreError::EventNotFound(event.id));
        }
        tracing::debug!(event_id = %event.id, "updating event");
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    fn delete_event(&self, event_id: EventId) -> StoreResult<()> {
        let mut inner = self.write();
        if inner.events.remove(&event_id).is_none() {
            return Err(StoreError::EventNotFound(event_id));
        }
        let before = inner.occurrences.len();
        inner.occurrences.retain(|(_, owner), _| *owner != event_id);
        tracing::debug!(
            event_id = %event_id,
            cascaded = before - inner.occurrences.len(),
            "deleted event"
        );
        Ok(())
    }

    fn get_event(&self, event_id: EventId) -> StoreResult<CalendarEvent> {
        self.read()
            .events
            .get(&event_id)
            .cloned()
            .ok_or(StoreError::EventNotFound(event_id))
    }

    fn list_events(&self) -> Vec<CalendarEvent> {
        self.read().events.values().cloned().collect()
    }

    fn find_holiday_by_import_key(&self, source_url: &str, uid: &str) -> Option<CalendarEvent> {
        self.read()
            .events
            .values()
            .find(|event| {
                matches!(
                    &event.details,
                    EventDetails::Holiday {
                        source_url: Some(url),
                        uid: Some(event_uid),
                        ..
                    } if url == source_url && event_uid == uid
                )
            })
            .cloned()
    }
}

impl OccurrenceStore for MemoryStore {
    fn get_or_create(&self, event_id: EventId, date: NaiveDate) -> StoreResult<(Occurrence, bool)> {
        let mut inner = self.write();
        if !inner.events.contains_key(&event_id) {
            return Err(StoreError::EventNotFound(event_id));
        }
        match inner.occurrences.get(&(date, event_id)) {
            Some(existing) => Ok((*existing, false)),
            None => {
                let occurrence = Occurrence::new(event_id, date);
                inner.occurrences.insert((date, event_id), occurrence);
                Ok((occurrence, true))
            }
        }
    }

    fn delete_for_event(&self, event_id: EventId) -> StoreResult<usize> {
        let mut inner = self.write();
        if !inner.events.contains_key(&event_id) {
            return Err(StoreError::EventNotFound(event_id));
        }
        let before = inner.occurrences.len();
        inner.occurrences.retain(|(_, owner), _| *owner != event_id);
        Ok(before - inner.occurrences.len())
    }

    fn replace_for_event(&self, event_id: EventId, dates: &[NaiveDate]) -> StoreResult<()> {
        let mut inner = self.write();
        if !inner.events.contains_key(&event_id) {
            return Err(StoreError::EventNotFound(event_id));
        }
        // Delete and reinsert under one guard; dates that survive the edit
        // keep their occurrence ids.
        let mut kept: HashMap<NaiveDate, Occurrence> = HashMap::new();
        inner.occurrences.retain(|(date, owner), occurrence| {
            if *owner == event_id {
                kept.insert(*date, *occurrence);
                false
            } else {
                true
            }
        });
        for &date in dates {
            let occurrence = kept
                .get(&date)
                .copied()
                .unwrap_or_else(|| Occurrence::new(event_id, date));
            inner.occurrences.insert((date, event_id), occurrence);
        }
        Ok(())
    }

    fn query_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        kind: Option<EventKind>,
    ) -> Vec<Occurrence> {
        let inner = self.read();
        inner
            .occurrences
            .range((start, EventId::nil())..=(end, EventId::max()))
            .map(|(_, occurrence)| *occurrence)
            .filter(|occurrence| {
                kind.is_none_or(|kind| {
                    inner
                        .events
                        .get(&occurrence.event_id)
                        .is_some_and(|event| event.kind() == kind)
                })
            })
            .collect()
    }

    fn query_date(&self, date: NaiveDate) -> Vec<Occurrence> {
        self.query_range(date, date, None)
    }
}
