//! Workshop entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `workshops` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workshop {
    pub id: DbId,
    pub name: String,
    pub default_location: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Workshop with the number of enrolled students from active semesters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkshopSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub workshop: Workshop,
    pub student_count: i64,
}

/// DTO for creating a workshop, optionally with its initial roster.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkshop {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub default_location: String,
    pub student_ids: Option<Vec<DbId>>,
}

/// DTO for updating a workshop. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkshop {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub default_location: Option<String>,
}

/// One entry of a bulk workshop creation.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NewWorkshop {
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Location must be 1-200 characters"))]
    pub default_location: String,
}

/// DTO for creating several workshops at once (all-or-nothing).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkCreateWorkshops {
    #[validate(length(min = 1, message = "Provide at least one workshop"), nested)]
    pub workshops: Vec<NewWorkshop>,
}

/// DTO replacing a workshop's roster of active-semester students.
#[derive(Debug, Clone, Deserialize)]
pub struct SetWorkshopStudents {
    pub student_ids: Vec<DbId>,
}

/// Query filter for workshop listings (`?q=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkshopFilter {
    pub q: Option<String>,
}
