/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Lookup-table IDs (`attendance_statuses`, `event_kinds`) are SMALLINT.
pub type StatusId = i16;
