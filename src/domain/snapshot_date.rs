//! Run date shared by every record, file name and log file of one run

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SNAPSHOT_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid snapshot date '{value}': expected YYYYMMDD")]
pub struct SnapshotDateError {
    pub value: String,
}

/// Calendar date in `YYYYMMDD` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SnapshotDate(NaiveDate);

impl SnapshotDate {
    /// Today's date as seen from the given UTC offset
    pub fn today(offset: FixedOffset) -> Self {
        Self::at(Utc::now(), offset)
    }

    pub fn at<Tz: TimeZone>(instant: DateTime<Tz>, offset: FixedOffset) -> Self {
        Self(instant.with_timezone(&offset).date_naive())
    }

    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub const fn naive(self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for SnapshotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SNAPSHOT_DATE_FORMAT))
    }
}

impl FromStr for SnapshotDate {
    type Err = SnapshotDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 8 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(SnapshotDateError { value: s.to_string() });
        }
        NaiveDate::parse_from_str(trimmed, SNAPSHOT_DATE_FORMAT)
            .map(Self)
            .map_err(|_| SnapshotDateError { value: s.to_string() })
    }
}

impl From<SnapshotDate> for String {
    fn from(date: SnapshotDate) -> Self {
        date.to_string()
    }
}

impl TryFrom<String> for SnapshotDate {
    type Error = SnapshotDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_compact() {
        let date = SnapshotDate::from_naive(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
        assert_eq!(date.to_string(), "20250307");
        assert_eq!("20250307".parse::<SnapshotDate>().unwrap(), date);
    }

    #[test]
    fn test_offset_moves_calendar_day() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 7, 20, 30, 0).unwrap();
        let utc = SnapshotDate::at(instant, FixedOffset::east_opt(0).unwrap());
        let kl = SnapshotDate::at(instant, FixedOffset::east_opt(8 * 3600).unwrap());
        assert_eq!(utc.to_string(), "20250307");
        assert_eq!(kl.to_string(), "20250308");
    }

    #[test]
    fn test_rejects_other_layouts() {
        assert!("2025-03-07".parse::<SnapshotDate>().is_err());
        assert!("20251340".parse::<SnapshotDate>().is_err());
        assert!("".parse::<SnapshotDate>().is_err());
    }
}
