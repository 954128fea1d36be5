//! Schedule conflict detection for student allocations.
//!
//! A student may not hold two blocking allocations (Planned or Present)
//! whose events overlap in time. Windows are half-open: an event ending at
//! 10:00 does not overlap one starting at 10:00.
//!
//! The predicate here is pure. Loading the student's allocation set and
//! locking the student row is the repository's job.

use std::fmt;

use crate::attendance::AttendanceStatus;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// At most this many conflicting events are named in a [`ScheduleConflict`].
pub const MAX_REPORTED_CONFLICTS: usize = 3;

/// A half-open `[starts_at, ends_at)` time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

impl TimeWindow {
    /// Build a window, rejecting empty or inverted ranges.
    pub fn new(starts_at: Timestamp, ends_at: Timestamp) -> Result<Self, CoreError> {
        if ends_at <= starts_at {
            return Err(CoreError::Validation(
                "Event end must be after its start".to_string(),
            ));
        }
        Ok(Self { starts_at, ends_at })
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.starts_at < other.ends_at && self.ends_at > other.starts_at
    }
}

/// One of the student's existing allocations, joined with its event.
#[derive(Debug, Clone)]
pub struct BookedSlot {
    pub allocation_id: DbId,
    pub status: AttendanceStatus,
    pub event_title: String,
    pub window: TimeWindow,
}

/// The allocation about to be written.
#[derive(Debug, Clone, Copy)]
pub struct CandidateSlot {
    /// `None` for a new allocation; `Some` when re-validating an update.
    pub allocation_id: Option<DbId>,
    pub status: AttendanceStatus,
    pub window: TimeWindow,
}

/// The candidate overlaps one or more blocking allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConflict {
    /// Descriptions of the first [`MAX_REPORTED_CONFLICTS`] conflicting events.
    pub events: Vec<String>,
    /// Total number of conflicting allocations found.
    pub total: usize,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schedule conflict with: {}", self.events.join(", "))?;
        if self.total > self.events.len() {
            write!(f, " (and {} more)", self.total - self.events.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for ScheduleConflict {}

/// Check a candidate allocation against the student's other allocations.
///
/// Non-blocking candidates always pass. The candidate's own record is
/// skipped, as are existing allocations that are not blocking.
pub fn check_conflicts(
    candidate: &CandidateSlot,
    existing: &[BookedSlot],
) -> Result<(), ScheduleConflict> {
    if !candidate.status.is_blocking() {
        return Ok(());
    }

    let mut clashes: Vec<&BookedSlot> = existing
        .iter()
        .filter(|slot| Some(slot.allocation_id) != candidate.allocation_id)
        .filter(|slot| slot.status.is_blocking())
        .filter(|slot| slot.window.overlaps(&candidate.window))
        .collect();

    if clashes.is_empty() {
        return Ok(());
    }

    clashes.sort_by_key(|slot| (slot.window.starts_at, slot.allocation_id));

    Err(ScheduleConflict {
        events: clashes
            .iter()
            .take(MAX_REPORTED_CONFLICTS)
            .map(|slot| describe(slot))
            .collect(),
        total: clashes.len(),
    })
}

fn describe(slot: &BookedSlot) -> String {
    format!(
        "{} ({} UTC)",
        slot.event_title,
        slot.window.starts_at.format("%Y-%m-%d %H:%M")
    )
}
