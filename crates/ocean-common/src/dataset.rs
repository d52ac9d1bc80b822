//! Dataset keys: one key per daily ocean-current snapshot.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Short date format used in dataset paths, e.g. `25-01-31`.
pub const DATASET_KEY_FORMAT: &str = "%y-%m-%d";

/// Number of selectable datasets.
pub const RECENT_DATASET_COUNT: i64 = 7;

/// Newest selectable dataset lags today by this many days.
pub const PUBLICATION_LAG_DAYS: i64 = 3;

/// Identifies one dataset (a `yy-mm-dd` date).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetKey(String);

#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid dataset key '{0}', expected yy-mm-dd")]
pub struct DatasetKeyError(pub String);

impl DatasetKey {
    /// Parse and validate a `yy-mm-dd` key.
    pub fn parse(s: &str) -> Result<Self, DatasetKeyError> {
        let s = s.trim();
        // chrono accepts single-digit fields, the key format does not
        if s.len() != 8 {
            return Err(DatasetKeyError(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATASET_KEY_FORMAT)
            .map(Self::from_date)
            .map_err(|_| DatasetKeyError(s.to_string()))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATASET_KEY_FORMAT).to_string())
    }

    pub fn date(&self) -> NaiveDate {
        // keys are only constructed from valid dates
        NaiveDate::parse_from_str(&self.0, DATASET_KEY_FORMAT).unwrap_or(NaiveDate::MIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DatasetKey {
    type Error = DatasetKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<DatasetKey> for String {
    fn from(k: DatasetKey) -> Self {
        k.0
    }
}

impl std::str::FromStr for DatasetKey {
    type Err = DatasetKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The selectable datasets for `today`: seven consecutive days ending
/// three days ago, oldest first.
pub fn recent_datasets(today: NaiveDate) -> Vec<DatasetKey> {
    let end = today - Duration::days(PUBLICATION_LAG_DAYS);
    (0..RECENT_DATASET_COUNT)
        .rev()
        .map(|back| DatasetKey::from_date(end - Duration::days(back)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_key() {
        let key = DatasetKey::parse("25-01-31").unwrap();
        assert_eq!(key.as_str(), "25-01-31");
        assert_eq!(key.date(), NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    }

    #[test]
    fn test_parse_rejects_bad_keys() {
        assert!(DatasetKey::parse("2025-01-31").is_err());
        assert!(DatasetKey::parse("25-02-30").is_err());
        assert!(DatasetKey::parse("25-1-3").is_err());
        assert!(DatasetKey::parse("").is_err());
    }

    #[test]
    fn test_recent_datasets_window() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let keys = recent_datasets(today);
        assert_eq!(keys.len(), 7);
        assert_eq!(keys.first().unwrap().as_str(), "25-03-01");
        assert_eq!(keys.last().unwrap().as_str(), "25-03-07");
    }

    #[test]
    fn test_recent_datasets_crosses_year() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let keys = recent_datasets(today);
        assert_eq!(keys.first().unwrap().as_str(), "24-12-24");
        assert_eq!(keys.last().unwrap().as_str(), "24-12-30");
    }

    #[test]
    fn test_serde_validates() {
        let ok: Result<DatasetKey, _> = serde_json::from_str("\"25-01-01\"");
        assert!(ok.is_ok());
        let bad: Result<DatasetKey, _> = serde_json::from_str("\"yesterday\"");
        assert!(bad.is_err());
    }
}
