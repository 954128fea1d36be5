//! Event kinds and presentation helpers.

use crate::types::StatusId;

/// Calendar colour for periodic events.
pub const PERIODIC_COLOR: &str = "#2563eb";

/// Calendar colour for sporadic events.
pub const SPORADIC_COLOR: &str = "#c90c0f";

/// Event kind IDs matching `event_kinds` seed data (1-based SMALLSERIAL).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Member of a recurring series.
    Periodic = 1,
    /// One-off event.
    Sporadic = 2,
}

impl EventKind {
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Periodic),
            2 => Some(Self::Sporadic),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Periodic => "Periodic",
            Self::Sporadic => "Sporadic",
        }
    }

    pub fn calendar_color(self) -> &'static str {
        match self {
            Self::Periodic => PERIODIC_COLOR,
            Self::Sporadic => SPORADIC_COLOR,
        }
    }
}

/// Pick where an event takes place.
///
/// An explicit, non-blank location wins. Otherwise the default location of
/// the first linked workshop is used; callers pass those defaults already
/// ordered by workshop name.
pub fn resolve_location<'a, I>(explicit: Option<&str>, workshop_defaults: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if let Some(location) = explicit.map(str::trim).filter(|l| !l.is_empty()) {
        return Some(location.to_string());
    }
    workshop_defaults
        .into_iter()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}
