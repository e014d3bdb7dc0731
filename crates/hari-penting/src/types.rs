use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("invalid regex: year"));

#[derive(Debug, thiserror::Error)]
#[error("Invalid month '{0}'. Accepted values: 1-12, 01-12 or an Indonesian month name")]
pub struct MonthParseError(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObservanceError {
    #[error("Day {0} is outside 1-31")]
    DayOutOfRange(u32),
    #[error("Invalid date '{0}', expected DD-MM")]
    InvalidDate(String),
    #[error("Label is empty")]
    EmptyLabel,
    #[error("Label '{0}' is purely numeric")]
    NumericLabel(String),
    #[error("Label '{0}' contains a year")]
    YearInLabel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Month {
    Januari,
    Februari,
    Maret,
    April,
    Mei,
    Juni,
    Juli,
    Agustus,
    September,
    Oktober,
    November,
    Desember,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Januari,
        Month::Februari,
        Month::Maret,
        Month::April,
        Month::Mei,
        Month::Juni,
        Month::Juli,
        Month::Agustus,
        Month::September,
        Month::Oktober,
        Month::November,
        Month::Desember,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Month::Januari => "Januari",
            Month::Februari => "Februari",
            Month::Maret => "Maret",
            Month::April => "April",
            Month::Mei => "Mei",
            Month::Juni => "Juni",
            Month::Juli => "Juli",
            Month::Agustus => "Agustus",
            Month::September => "September",
            Month::Oktober => "Oktober",
            Month::November => "November",
            Month::Desember => "Desember",
        }
    }

    pub fn number(&self) -> u32 {
        *self as u32 + 1
    }

    pub fn from_number(number: u32) -> Option<Month> {
        number
            .checked_sub(1)
            .and_then(|i| Month::ALL.get(i as usize))
            .copied()
    }

    pub fn from_name(name: &str) -> Option<Month> {
        Month::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn find_in(text: &str) -> Option<Month> {
        let lower = text.to_lowercase();
        Month::ALL
            .into_iter()
            .find(|m| lower.contains(&m.name().to_lowercase()))
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u32>() {
            return Month::from_number(n).ok_or_else(|| MonthParseError(s.to_string()));
        }
        Month::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MonthParseError(s.to_string()))
    }
}

impl TryFrom<String> for Month {
    type Error = MonthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Recurring day of the year, rendered as `DD-MM`.
///
/// Only the day range is checked, so `30-02` is a valid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObservanceDate {
    day: u32,
    month: Month,
}

impl ObservanceDate {
    pub fn new(day: u32, month: Month) -> Result<Self, ObservanceError> {
        if !(1..=31).contains(&day) {
            return Err(ObservanceError::DayOutOfRange(day));
        }
        Ok(Self { day, month })
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month(&self) -> Month {
        self.month
    }
}

impl Ord for ObservanceDate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.month, self.day).cmp(&(other.month, other.day))
    }
}

impl PartialOrd for ObservanceDate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for ObservanceDate {
    type Err = ObservanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ObservanceError::InvalidDate(s.to_string());
        let (day, month) = s.split_once('-').ok_or_else(invalid)?;
        if day.len() != 2 || month.len() != 2 {
            return Err(invalid());
        }
        let day = day.parse::<u32>().map_err(|_| invalid())?;
        let month = month
            .parse::<u32>()
            .ok()
            .and_then(Month::from_number)
            .ok_or_else(invalid)?;
        ObservanceDate::new(day, month)
    }
}

impl TryFrom<String> for ObservanceDate {
    type Error = ObservanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObservanceDate> for String {
    fn from(date: ObservanceDate) -> Self {
        date.to_string()
    }
}

impl Display for ObservanceDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.day, self.month.number())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observance {
    pub date: ObservanceDate,
    pub label: String,
}

impl Observance {
    /// Builds a record from a scraped label, trimming it first.
    ///
    /// Rejects labels that are empty, purely numeric (a stray day number) or
    /// carry a four digit year (a one-off historical event).
    pub fn new(date: ObservanceDate, label: &str) -> Result<Self, ObservanceError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ObservanceError::EmptyLabel);
        }
        if label.chars().all(|c| c.is_numeric()) {
            return Err(ObservanceError::NumericLabel(label.to_string()));
        }
        if RE_YEAR.is_match(label) {
            return Err(ObservanceError::YearInLabel(label.to_string()));
        }
        Ok(Self {
            date,
            label: label.to_string(),
        })
    }
}

impl Display for Observance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.date, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_numbers() {
        assert_eq!(Month::Januari.number(), 1);
        assert_eq!(Month::Desember.number(), 12);
        assert_eq!(Month::from_number(8), Some(Month::Agustus));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
    }

    #[test]
    fn test_month_find_in_ignores_case() {
        assert_eq!(Month::find_in("AGUSTUS 2024"), Some(Month::Agustus));
        assert_eq!(Month::find_in("kalender mei"), Some(Month::Mei));
        assert_eq!(Month::find_in("Hari Libur"), None);
    }

    #[test]
    fn test_month_from_name_is_case_sensitive() {
        assert_eq!(Month::from_name("April"), Some(Month::April));
        assert_eq!(Month::from_name("april"), None);
    }

    #[test]
    fn test_month_from_str() {
        assert_eq!("08".parse::<Month>().unwrap(), Month::Agustus);
        assert_eq!("oktober".parse::<Month>().unwrap(), Month::Oktober);
        assert!("13".parse::<Month>().is_err());
        assert!("August".parse::<Month>().is_err());
    }

    #[test]
    fn test_date_display_is_zero_padded() {
        let date = ObservanceDate::new(1, Month::Mei).unwrap();
        assert_eq!(date.to_string(), "01-05");
    }

    #[test]
    fn test_date_accepts_impossible_calendar_day() {
        let date: ObservanceDate = "30-02".parse().unwrap();
        assert_eq!(date.day(), 30);
        assert_eq!(date.month(), Month::Februari);
    }

    #[test]
    fn test_date_rejects_out_of_range() {
        assert_eq!(
            ObservanceDate::new(0, Month::Januari),
            Err(ObservanceError::DayOutOfRange(0))
        );
        assert_eq!(
            ObservanceDate::new(32, Month::Januari),
            Err(ObservanceError::DayOutOfRange(32))
        );
        assert!("1-05".parse::<ObservanceDate>().is_err());
        assert!("12-13".parse::<ObservanceDate>().is_err());
        assert!("1205".parse::<ObservanceDate>().is_err());
    }

    #[test]
    fn test_date_orders_by_month_then_day() {
        let a: ObservanceDate = "31-01".parse().unwrap();
        let b: ObservanceDate = "01-02".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_observance_label_guards() {
        let date = ObservanceDate::new(17, Month::Agustus).unwrap();

        let obs = Observance::new(date, "  Kemerdekaan RI ").unwrap();
        assert_eq!(obs.label, "Kemerdekaan RI");

        assert_eq!(
            Observance::new(date, "45"),
            Err(ObservanceError::NumericLabel("45".into()))
        );
        assert_eq!(
            Observance::new(date, "Proklamasi 1945"),
            Err(ObservanceError::YearInLabel("Proklamasi 1945".into()))
        );
        assert_eq!(Observance::new(date, "   "), Err(ObservanceError::EmptyLabel));
    }

    #[test]
    fn test_observance_serializes_date_as_string() {
        let date = ObservanceDate::new(21, Month::April).unwrap();
        let obs = Observance::new(date, "Hari Kartini").unwrap();

        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["date"], "21-04");
        assert_eq!(json["label"], "Hari Kartini");

        let back: Observance = serde_json::from_value(json).unwrap();
        assert_eq!(back, obs);
    }
}
