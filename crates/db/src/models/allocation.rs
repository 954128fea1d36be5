//! Attendance allocation model and DTOs.

use rollcall_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `allocations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Allocation {
    pub id: DbId,
    pub event_id: DbId,
    pub student_id: DbId,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Allocation joined with the student and class names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AllocationDetail {
    pub id: DbId,
    pub event_id: DbId,
    pub student_id: DbId,
    pub student_name: String,
    pub class_name: String,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for allocating one student to an event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAllocation {
    #[validate(range(min = 1, message = "student_id is required"))]
    pub student_id: DbId,
    /// Defaults to 1 (Planned) if omitted.
    #[serde(default, alias = "status")]
    #[validate(range(min = 1, max = 4, message = "Unknown attendance status"))]
    pub status_id: Option<StatusId>,
}

/// DTO for changing an allocation's status.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAllocation {
    #[serde(alias = "status")]
    #[validate(range(min = 1, max = 4, message = "Unknown attendance status"))]
    pub status_id: StatusId,
}

/// DTO for allocating many students to one event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkAllocate {
    #[validate(length(min = 1, message = "Select at least one student"))]
    pub student_ids: Vec<DbId>,
}

/// A student that could not be allocated, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAllocationFailure {
    pub student_id: DbId,
    pub error: String,
}

/// Outcome of a bulk allocation. Successes are kept even when some fail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkAllocationResult {
    pub created: Vec<Allocation>,
    pub failed: Vec<BulkAllocationFailure>,
}

/// DTO for recording who showed up.
#[derive(Debug, Clone, Deserialize)]
pub struct RollCall {
    pub present_student_ids: Vec<DbId>,
}

/// Counts written by a roll call.
#[derive(Debug, Clone, Serialize)]
pub struct RollCallResult {
    pub present: u64,
    pub absent: u64,
}

/// How a status write treats the schedule conflict rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictCheck {
    Enforce,
    /// Only for writes that cannot introduce a new overlap, such as roll call.
    Skip,
}
