//! Business logic for togethercal: recurrence expansion and
//! materialization, deterministic ordering of same-day occurrences,
//! month-grid assembly, and the calendar-feed import/export surfaces.

pub mod error;
pub mod expand;
pub mod feed;
pub mod import;
pub mod month_grid;
pub mod ordering;
pub mod recurrence;

pub use error::{ServiceError, ServiceResult};
