//! Public-holiday calendar and day-type classification.
//!
//! Parking operating windows are keyed by day-type, and the holiday
//! check takes precedence over the weekday/weekend split: a holiday
//! falling on a Tuesday uses the holiday window, not the weekday one.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;

use crate::ConfigError;

/// Day classification used to select an operating window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayType {
    Holiday,
    Weekday,
    Saturday,
    Sunday,
}

/// Set of national public holidays, loaded from `config/holidays.yaml`.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct HolidaysFile {
    holidays: Vec<NaiveDate>,
}

impl HolidayCalendar {
    #[must_use]
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// An empty calendar: every date classifies by weekday alone.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            dates: HashSet::new(),
        }
    }

    #[must_use]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    /// Classifies a date, with the holiday check taking precedence.
    #[must_use]
    pub fn day_type(&self, date: NaiveDate) -> DayType {
        if self.is_holiday(date) {
            return DayType::Holiday;
        }
        match date.weekday() {
            Weekday::Sat => DayType::Saturday,
            Weekday::Sun => DayType::Sunday,
            _ => DayType::Weekday,
        }
    }
}

/// Load the holiday calendar from a YAML file of ISO dates.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_holidays(path: &Path) -> Result<HolidayCalendar, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: HolidaysFile = serde_yaml::from_str(&content)?;
    Ok(HolidayCalendar::new(file.holidays))
}
