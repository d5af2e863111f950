pub mod event;
pub mod occurrence;

pub use event::{CalendarEvent, EventDetails, EventId};
pub use occurrence::{Occurrence, OccurrenceId};
