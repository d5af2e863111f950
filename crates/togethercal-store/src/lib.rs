//! Data model and storage for togethercal: the four calendar event
//! variants, their materialized occurrences, and an in-memory indexed
//! store enforcing the `(event, date)` uniqueness invariant.

pub mod error;
pub mod model;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use model::{CalendarEvent, EventDetails, EventId, Occurrence, OccurrenceId};
pub use store::{EventRepository, MemoryStore, OccurrenceStore};
