//! Drives expansion against the occurrence store: idempotent
//! materialization, and delete-then-recreate rematerialization for edits
//! that shrink or shift a date range.

use chrono::NaiveDate;

use togethercal_core::types::EventKind;
use togethercal_store::{CalendarEvent, EventDetails, EventId, EventRepository, OccurrenceStore};

use crate::error::ServiceResult;
use crate::expand::{self, DEFAULT_HORIZON_YEARS, ExpansionContext};

/// Recurrence engine; side effects are confined to the occurrence store.
#[derive(Debug, Clone)]
pub struct RecurrenceEngine {
    horizon_years: u32,
}

impl Default for RecurrenceEngine {
    fn default() -> Self {
        Self {
            horizon_years: DEFAULT_HORIZON_YEARS,
        }
    }
}

impl RecurrenceEngine {
    #[must_use]
    pub const fn new(horizon_years: u32) -> Self {
        Self { horizon_years }
    }

    /// ## Summary
    /// Expands the event and inserts an occurrence per produced date with
    /// get-or-create semantics. Idempotent: a second call on an unchanged
    /// event inserts nothing. Returns the number of newly created
    /// occurrences.
    ///
    /// ## Errors
    /// Returns `EventNotFound` for an unknown id; store errors propagate
    /// without retry.
    pub fn materialize<S>(
        &self,
        store: &S,
        event_id: EventId,
        today: NaiveDate,
    ) -> ServiceResult<usize>
    where
        S: EventRepository + OccurrenceStore,
    {
        let event = store.get_event(event_id)?;
        let ctx = self.context(store, &event, today);
        let dates = expand::expand(&event.details, &ctx);

        let mut created = 0;
        for date in &dates {
            let (_, was_created) = store.get_or_create(event_id, *date)?;
            if was_created {
                created += 1;
            }
        }
        tracing::debug!(
            event_id = %event_id,
            kind = %event.kind(),
            dates = dates.len(),
            created,
            "materialized event"
        );
        Ok(created)
    }

    /// ## Summary
    /// Discards the event's existing occurrences and re-runs expansion, as
    /// one atomic store operation. Use after edits: get-or-create alone
    /// cannot remove occurrences that fell out of range.
    ///
    /// ## Errors
    /// Returns `EventNotFound` for an unknown id; store errors propagate.
    pub fn rematerialize<S>(
        &self,
        store: &S,
        event_id: EventId,
        today: NaiveDate,
    ) -> ServiceResult<usize>
    where
        S: EventRepository + OccurrenceStore,
    {
        let event = store.get_event(event_id)?;
        let ctx = self.context(store, &event, today);
        let dates = expand::expand(&event.details, &ctx);
        store.replace_for_event(event_id, &dates)?;
        tracing::debug!(
            event_id = %event_id,
            kind = %event.kind(),
            dates = dates.len(),
            "rematerialized event"
        );
        Ok(dates.len())
    }

    /// ## Summary
    /// Lifecycle hook: validate and insert a new event, then materialize
    /// it immediately.
    ///
    /// ## Errors
    /// Validation failures surface before any occurrence is written.
    pub fn create_event<S>(
        &self,
        store: &S,
        event: CalendarEvent,
        today: NaiveDate,
    ) -> ServiceResult<CalendarEvent>
    where
        S: EventRepository + OccurrenceStore,
    {
        let event = store.insert_event(event)?;
        self.materialize(store, event.id, today)?;
        Ok(event)
    }

    /// ## Summary
    /// Lifecycle hook: validate and update an event, then rematerialize so
    /// a changed date range leaves no stale occurrences.
    ///
    /// ## Errors
    /// Validation failures surface before any occurrence is touched.
    pub fn update_event<S>(
        &self,
        store: &S,
        event: CalendarEvent,
        today: NaiveDate,
    ) -> ServiceResult<CalendarEvent>
    where
        S: EventRepository + OccurrenceStore,
    {
        let event = store.update_event(event)?;
        self.rematerialize(store, event.id, today)?;
        Ok(event)
    }

    /// Builds the expansion context, filling the skip set with holiday
    /// occurrence dates when a weekly activity excludes holidays.
    fn context<S>(&self, store: &S, event: &CalendarEvent, today: NaiveDate) -> ExpansionContext
    where
        S: OccurrenceStore,
    {
        let ctx = ExpansionContext::new(today).with_horizon_years(self.horizon_years);
        if let EventDetails::WeeklyActivity {
            start_date,
            end_date,
            include_holidays: false,
            ..
        } = &event.details
        {
            let skip = store
                .query_range(*start_date, *end_date, Some(EventKind::Holiday))
                .into_iter()
                .map(|occurrence| occurrence.date);
            return ctx.with_skip(skip);
        }
        ctx
    }
}
