use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DateComponent, DateError};

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_abbrev(month: u8) -> Option<&'static str> {
    MONTH_ABBREVS.get(usize::from(month).checked_sub(1)?).copied()
}

pub fn month_name(month: u8) -> Option<&'static str> {
    MONTH_NAMES.get(usize::from(month).checked_sub(1)?).copied()
}

/// A year-independent calendar day. Out-of-range values are representable so
/// that a broken window can still be inspected and reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDay {
    pub month: u8,
    pub day: u8,
}

impl MonthDay {
    pub const fn new(month: u8, day: u8) -> Self {
        Self { month, day }
    }

    /// Strict parse used when a user edits a range.
    pub fn parse(text: &str) -> Result<Self, DateError> {
        let (month, day) = split_month_day(text)
            .ok_or_else(|| DateError::MalformedDate(text.to_string()))?;
        check_component(DateComponent::Month, month, 12)?;
        check_component(DateComponent::Day, day, 31)?;
        // both fit after the range checks
        Ok(Self::new(month as u8, day as u8))
    }

    pub fn is_structurally_valid(&self) -> bool {
        (1..=12).contains(&self.month) && (1..=31).contains(&self.day)
    }

    /// Ordering key equivalent to comparing zero-padded "MM-DD" strings.
    pub fn key(&self) -> u32 {
        u32::from(self.month) * 100 + u32::from(self.day)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MonthDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Stored data may hold impossible dates; keep them so they can be reported.
        let raw = String::deserialize(deserializer)?;
        let (month, day) = split_month_day(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("expected MM-DD, got {raw:?}")))?;
        let month = u8::try_from(month)
            .map_err(|_| serde::de::Error::custom(format!("month out of range in {raw:?}")))?;
        let day = u8::try_from(day)
            .map_err(|_| serde::de::Error::custom(format!("day out of range in {raw:?}")))?;
        Ok(Self::new(month, day))
    }
}

fn split_month_day(text: &str) -> Option<(u32, u32)> {
    let re = Regex::new(r"^(?P<month>\d{1,2})-(?P<day>\d{1,2})$").ok()?;
    let caps = re.captures(text.trim())?;
    let month = caps.name("month")?.as_str().parse::<u32>().ok()?;
    let day = caps.name("day")?.as_str().parse::<u32>().ok()?;
    Some((month, day))
}

fn check_component(component: DateComponent, value: u32, max: u32) -> Result<(), DateError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(DateError::InvalidDateComponent {
            component,
            value,
            min: 1,
            max,
        })
    }
}

/// A yearly-recurring span of days, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl DateWindow {
    pub const fn new(start: MonthDay, end: MonthDay) -> Self {
        Self { start, end }
    }

    pub fn from_pairs(start: (u8, u8), end: (u8, u8)) -> Self {
        Self::new(
            MonthDay::new(start.0, start.1),
            MonthDay::new(end.0, end.1),
        )
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, DateError> {
        Ok(Self::new(MonthDay::parse(start)?, MonthDay::parse(end)?))
    }

    pub fn is_structurally_valid(&self) -> bool {
        self.start.is_structurally_valid() && self.end.is_structurally_valid()
    }

    /// True when the end sorts before the start as "MM-DD" text.
    pub fn spans_year_boundary(&self) -> bool {
        self.end.to_string() < self.start.to_string()
    }

    pub fn contains(&self, date: MonthDay) -> bool {
        let (start, end, date) = (self.start.key(), self.end.key(), date.key());
        if start <= end {
            start <= date && date <= end
        } else {
            date >= start || date <= end
        }
    }

    /// Human-facing label such as "Dec 25 - Jan 15".
    pub fn format(&self) -> String {
        format!(
            "{} {} - {} {}",
            month_abbrev(self.start.month).unwrap_or("???"),
            self.start.day,
            month_abbrev(self.end.month).unwrap_or("???"),
            self.end.day
        )
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
