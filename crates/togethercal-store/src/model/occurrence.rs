use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::EventId;

pub type OccurrenceId = uuid::Uuid;

/// One concrete calendar date produced by expanding an event. A pure
/// read-oriented projection: everything else (title, icon, hours) is
/// resolved through the owning event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: OccurrenceId,
    pub event_id: EventId,
    pub date: NaiveDate,
}

impl Occurrence {
    #[must_use]
    pub fn new(event_id: EventId, date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            event_id,
            date,
        }
    }
}
