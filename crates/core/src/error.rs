use crate::conflict::ScheduleConflict;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Per-field validation failures, reported back to the client by field name.
    #[error("Invalid fields: {0}")]
    InvalidFields(#[from] validator::ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    ScheduleConflict(#[from] ScheduleConflict),

    #[error("Internal error: {0}")]
    Internal(String),
}
