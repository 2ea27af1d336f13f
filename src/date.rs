use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar date a day record is filed under, always rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Local calendar date, not UTC.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Accepts only the zero-padded 10 character form.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != 10 {
            return None;
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT).ok().map(Self)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}', expected YYYY-MM-DD")))
    }
}
