use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::window::month_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateComponent {
    Month,
    Day,
}

impl fmt::Display for DateComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateComponent::Month => f.write_str("month"),
            DateComponent::Day => f.write_str("day"),
        }
    }
}

/// Rejected at the edit boundary; never stored on a category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("expected a MM-DD date, got {0:?}")]
    MalformedDate(String),

    #[error("{component} {value} is out of range ({min}-{max})")]
    InvalidDateComponent {
        component: DateComponent,
        value: u32,
        min: u32,
        max: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// Non-fatal diagnostic attached to a single category's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleWarning {
    /// Month or day outside the structural range; the window cannot be evaluated.
    InvalidWindow { endpoint: Endpoint, month: u8, day: u8 },
    CalendarInconsistency {
        endpoint: Endpoint,
        month: u8,
        day: u8,
        max_day: u8,
    },
    LeapDay { endpoint: Endpoint, year: i32 },
    MissingWindow,
    UnexpectedWindow,
    PriorityOutOfRange { value: i64 },
}

impl ScheduleWarning {
    /// Whether the warning keeps a seasonal category from ever being active.
    pub fn blocks_activation(&self) -> bool {
        matches!(
            self,
            ScheduleWarning::InvalidWindow { .. } | ScheduleWarning::MissingWindow
        )
    }
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleWarning::InvalidWindow {
                endpoint,
                month,
                day,
            } => write!(
                f,
                "{endpoint} date {month:02}-{day:02} is not a valid month and day"
            ),
            ScheduleWarning::CalendarInconsistency {
                endpoint,
                month,
                day,
                max_day,
            } => write!(
                f,
                "{endpoint} date: {} only has {max_day} days, not {day}",
                month_name(*month).unwrap_or("month")
            ),
            ScheduleWarning::LeapDay { endpoint, year } => write!(
                f,
                "{endpoint} date: February 29th does not exist in {year} (not a leap year)"
            ),
            ScheduleWarning::MissingWindow => {
                f.write_str("seasonal category has no date range; treated as inactive")
            }
            ScheduleWarning::UnexpectedWindow => {
                f.write_str("category is not seasonal; its date range is ignored")
            }
            ScheduleWarning::PriorityOutOfRange { value } => {
                write!(f, "priority {value} is outside 1-100; using 100")
            }
        }
    }
}

impl Serialize for ScheduleWarning {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Date(#[from] DateError),

    #[error("edit session for category {session} cannot be applied to category {category}")]
    WrongCategory { session: u64, category: u64 },
}
