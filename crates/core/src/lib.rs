//! Domain logic for the attendance service.
//!
//! Everything here is pure: no database handles, no HTTP types. The `db`
//! and `api` crates call into these modules for validation, recurrence
//! expansion, and attendance arithmetic.

pub mod attendance;
pub mod conflict;
pub mod error;
pub mod events;
pub mod recurrence;
pub mod reporting;
pub mod roster;
pub mod types;
