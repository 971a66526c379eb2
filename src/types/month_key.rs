use crate::types::DateError;
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Calendar (year, month) pair used to partition usage records.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl Display for MonthKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:04}-{:02}", self.year, self.month)
    }
}

/// Normalizes a date as returned by the usage API into a calendar date.
///
/// Plain `YYYY-MM-DD` is the common case; full RFC 3339 and RFC 2822 timestamps
/// are also accepted and truncated to their date component.
pub fn parse_api_date(value: &str) -> Result<NaiveDate, DateError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(DateError::Empty);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.date_naive());
    }

    DateTime::parse_from_rfc2822(value)
        .map(|timestamp| timestamp.date_naive())
        .map_err(|_| DateError::InvalidFormat(value.to_string()))
}

/// Serde adapter for `#[serde(deserialize_with = "...")]` on API date fields.
pub fn deserialize_api_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_api_date(&value).map_err(de::Error::custom)
}
