//! Attendance statuses and roll-call marking.
//!
//! Status IDs match the `attendance_statuses` seed data (1-based SMALLSERIAL).

use std::collections::HashSet;

use crate::types::{DbId, StatusId};

/// Status of a single student allocation on an event.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttendanceStatus {
    /// Expected to attend. Default for new allocations.
    Planned = 1,
    Present = 2,
    Absent = 3,
    /// Released from attending. Ignored by roll call and percentages.
    Excused = 4,
}

/// Statuses that occupy the student's time slot.
pub const BLOCKING_STATUS_IDS: [StatusId; 2] = [
    AttendanceStatus::Planned as StatusId,
    AttendanceStatus::Present as StatusId,
];

impl AttendanceStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum, if it is known.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Planned),
            2 => Some(Self::Present),
            3 => Some(Self::Absent),
            4 => Some(Self::Excused),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Excused => "Excused",
        }
    }

    /// Whether an allocation in this status takes part in schedule conflict checks.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Planned | Self::Present)
    }
}

impl From<AttendanceStatus> for StatusId {
    fn from(value: AttendanceStatus) -> Self {
        value as StatusId
    }
}

/// An allocation as seen by roll call.
#[derive(Debug, Clone, Copy)]
pub struct RollCallEntry {
    pub allocation_id: DbId,
    pub student_id: DbId,
    pub status: AttendanceStatus,
}

/// The status an allocation should be moved to after roll call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollCallMark {
    pub allocation_id: DbId,
    pub student_id: DbId,
    pub status: AttendanceStatus,
}

/// Mark every non-excused allocation as Present or Absent.
///
/// Students in `present` become Present; everyone else on the list becomes
/// Absent. Excused allocations are left out of the result entirely.
pub fn mark_roll_call(entries: &[RollCallEntry], present: &HashSet<DbId>) -> Vec<RollCallMark> {
    entries
        .iter()
        .filter(|e| e.status != AttendanceStatus::Excused)
        .map(|e| RollCallMark {
            allocation_id: e.allocation_id,
            student_id: e.student_id,
            status: if present.contains(&e.student_id) {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Absent
            },
        })
        .collect()
}
