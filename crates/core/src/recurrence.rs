//! Recurrence expansion for event series.
//!
//! A schedule request describes one event (sporadic) or a series (periodic)
//! sharing the same time of day. [`generate_dates`] expands the series into
//! concrete dates; [`ScheduleRequest::windows`] turns those into UTC windows
//! using the school's local offset.

use std::borrow::Cow;

use chrono::{Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::conflict::TimeWindow;
use crate::error::CoreError;
use crate::events::EventKind;

pub const WEEKLY_INTERVAL_DAYS: u32 = 7;
pub const BIWEEKLY_INTERVAL_DAYS: u32 = 14;

/// Upper bound on the number of events one request may create.
pub const MAX_OCCURRENCES: usize = 500;

/// How often a periodic event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Weekly,
    Biweekly,
    /// Every `interval_days` days.
    Custom,
}

impl Cadence {
    /// Number of days between occurrences.
    pub fn interval_days(self, custom_interval_days: Option<u32>) -> Result<u32, CoreError> {
        match self {
            Self::Weekly => Ok(WEEKLY_INTERVAL_DAYS),
            Self::Biweekly => Ok(BIWEEKLY_INTERVAL_DAYS),
            Self::Custom => match custom_interval_days {
                Some(days) if days >= 1 => Ok(days),
                _ => Err(CoreError::Validation(
                    "A custom cadence needs an interval of at least 1 day".to_string(),
                )),
            },
        }
    }
}

/// Expand a start date into every occurrence up to and including `end_date`.
///
/// The start date is always the first element. Without an end date the
/// series has a single occurrence.
pub fn generate_dates(
    start_date: NaiveDate,
    cadence: Cadence,
    custom_interval_days: Option<u32>,
    end_date: Option<NaiveDate>,
) -> Result<Vec<NaiveDate>, CoreError> {
    let step = Days::new(u64::from(cadence.interval_days(custom_interval_days)?));
    let mut dates = vec![start_date];

    let Some(end_date) = end_date else {
        return Ok(dates);
    };

    let mut current = start_date;
    loop {
        current = match current.checked_add_days(step) {
            Some(next) if next <= end_date => next,
            _ => break,
        };
        if dates.len() == MAX_OCCURRENCES {
            return Err(CoreError::Validation(format!(
                "A series may not have more than {MAX_OCCURRENCES} occurrences"
            )));
        }
        dates.push(current);
    }

    Ok(dates)
}

/// Everything needed to create one event or a recurring series.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    pub kind: EventKind,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub cadence: Option<Cadence>,
    pub interval_days: Option<u32>,
    pub recurrence_end: Option<NaiveDate>,
}

impl ScheduleRequest {
    /// Check field combinations, reporting every problem by field name.
    pub fn validate_fields(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.end_time <= self.start_time {
            errors.add(
                "end_time",
                field_error("time_order", "End time must be after start time"),
            );
        }

        if self.kind == EventKind::Periodic {
            match self.cadence {
                None => errors.add(
                    "cadence",
                    field_error("required", "Periodic events need a cadence"),
                ),
                Some(Cadence::Custom) if self.interval_days.unwrap_or(0) < 1 => errors.add(
                    "interval_days",
                    field_error("range", "Interval must be at least 1 day"),
                ),
                Some(_) => {}
            }

            match self.recurrence_end {
                None => errors.add(
                    "recurrence_end",
                    field_error("required", "Periodic events need a recurrence end date"),
                ),
                Some(end) if end <= self.date => errors.add(
                    "recurrence_end",
                    field_error("date_order", "Recurrence end must be after the start date"),
                ),
                Some(_) => {}
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Every date an event will be created on.
    pub fn occurrence_dates(&self) -> Result<Vec<NaiveDate>, CoreError> {
        self.validate_fields()?;
        match (self.kind, self.cadence) {
            (EventKind::Periodic, Some(cadence)) => {
                generate_dates(self.date, cadence, self.interval_days, self.recurrence_end)
            }
            _ => Ok(vec![self.date]),
        }
    }

    /// Materialize the occurrences as UTC windows, reading the times in `offset`.
    pub fn windows(&self, offset: FixedOffset) -> Result<Vec<TimeWindow>, CoreError> {
        self.occurrence_dates()?
            .into_iter()
            .map(|date| {
                let starts_at = to_utc(offset, date, self.start_time)?;
                let ends_at = to_utc(offset, date, self.end_time)?;
                TimeWindow::new(starts_at, ends_at)
            })
            .collect()
    }
}

fn to_utc(
    offset: FixedOffset,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<chrono::DateTime<Utc>, CoreError> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| CoreError::Internal(format!("Unrepresentable local time {date} {time}")))
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}
