//! Class entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `classes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Class {
    pub id: DbId,
    pub semester_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Class joined with its semester and student count, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassSummary {
    pub id: DbId,
    pub semester_id: DbId,
    pub semester_name: String,
    pub semester_is_active: bool,
    pub name: String,
    pub student_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a class. The semester must be active.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClass {
    #[validate(range(min = 1, message = "semester_id is required"))]
    pub semester_id: DbId,
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: String,
}

/// DTO for updating a class. Moving it requires an active target semester.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateClass {
    pub semester_id: Option<DbId>,
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,
}

/// DTO for copying a class and its students into another semester.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CopyClass {
    #[validate(range(min = 1, message = "semester_id is required"))]
    pub semester_id: DbId,
    /// Name of the copy. Defaults to the source class name.
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub name: Option<String>,
}

/// Outcome of [`CopyClass`].
#[derive(Debug, Clone, Serialize)]
pub struct ClassCopyResult {
    pub class: Class,
    pub students_copied: u64,
}

/// Query filter for class listings (`?q=&semester_id=&include_inactive=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassFilter {
    pub q: Option<String>,
    pub semester_id: Option<DbId>,
    #[serde(default)]
    pub include_inactive: bool,
}
