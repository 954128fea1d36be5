//! Student entity model and DTOs.

use rollcall_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub class_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Student joined with class, semester, fixed workshops, and earned points.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentSummary {
    pub id: DbId,
    pub class_id: DbId,
    pub class_name: String,
    pub semester_id: DbId,
    pub semester_name: String,
    pub name: String,
    pub workshop_ids: Vec<DbId>,
    /// Sum of event weights over Present allocations on non-cancelled events.
    pub total_points: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a student in a class of an active semester.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(range(min = 1, message = "class_id is required"))]
    pub class_id: DbId,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub workshop_ids: Option<Vec<DbId>>,
}

/// DTO for updating a student. `workshop_ids`, when present, replaces the set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStudent {
    pub class_id: Option<DbId>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub workshop_ids: Option<Vec<DbId>>,
}

/// DTO for pasting many names into one class, one name per line.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkCreateStudents {
    #[validate(range(min = 1, message = "class_id is required"))]
    pub class_id: DbId,
    pub names: String,
}

/// Query filter for student listings (`?q=&class_id=&include_inactive=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    pub q: Option<String>,
    pub class_id: Option<DbId>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// A student who may still be allocated to a given event.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EligibleStudent {
    pub id: DbId,
    pub name: String,
    pub class_id: DbId,
    pub class_name: String,
    pub semester_name: String,
}

/// One of a student's allocations, joined with its event.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentAllocation {
    pub allocation_id: DbId,
    pub event_id: DbId,
    pub title: String,
    pub kind_id: StatusId,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub weight: i32,
    pub status_id: StatusId,
}
