//! Semester entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `semesters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Semester {
    pub id: DbId,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Semester with the number of classes it holds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SemesterSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub semester: Semester,
    pub class_count: i64,
}

/// DTO for creating a new semester.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSemester {
    #[validate(length(min = 1, max = 10, message = "Name must be 1-10 characters"))]
    pub name: String,
    /// Defaults to `true` if omitted.
    pub is_active: Option<bool>,
}

/// DTO for updating a semester. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSemester {
    #[validate(length(min = 1, max = 10, message = "Name must be 1-10 characters"))]
    pub name: Option<String>,
    pub is_active: Option<bool>,
}
