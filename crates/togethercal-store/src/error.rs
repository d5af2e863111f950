use thiserror::Error;

use crate::model::EventId;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("Occurrence not found: {0}")]
    OccurrenceNotFound(crate::model::OccurrenceId),

    #[error(transparent)]
    CoreError(#[from] togethercal_core::error::CoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
