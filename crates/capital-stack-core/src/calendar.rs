use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CapitalStackError;
use crate::CapitalStackResult;

/// Linear month axis: `year * 12 + (month - 1)`.
pub type MonthIndex = i64;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month with a 1-based month number.
///
/// Deserialization goes through [`YearMonth::new`], so a decoded value always
/// has a month in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawYearMonth")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

#[derive(Deserialize)]
struct RawYearMonth {
    year: i32,
    month: u32,
}

impl TryFrom<RawYearMonth> for YearMonth {
    type Error = CapitalStackError;

    fn try_from(raw: RawYearMonth) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month)
    }
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> CapitalStackResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CapitalStackError::InvalidInput {
                field: "month".into(),
                reason: format!("Month must be in 1..=12, got {month}"),
            });
        }
        Ok(Self { year, month })
    }

    /// Reference month for a caller-supplied date. The engines never read the clock.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn to_index(&self) -> MonthIndex {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    pub fn from_index(index: MonthIndex) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn add_months(&self, months: i64) -> Self {
        Self::from_index(self.to_index() + months)
    }

    /// Short display label, e.g. "Jul 2022".
    pub fn label(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("???");
        format!("{name} {}", self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parses `YYYY-MM`.
impl FromStr for YearMonth {
    type Err = CapitalStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CapitalStackError::InvalidInput {
            field: "year_month".into(),
            reason: format!("Expected YYYY-MM, got '{s}'"),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip_at_year_boundary() {
        let dec = YearMonth::new(2025, 12).unwrap();
        let jan = YearMonth::new(2026, 1).unwrap();
        assert_eq!(jan.to_index() - dec.to_index(), 1);
        assert_eq!(YearMonth::from_index(dec.to_index()), dec);
    }

    #[test]
    fn test_add_months() {
        let start = YearMonth::new(2022, 7).unwrap();
        assert_eq!(start.add_months(119), YearMonth::new(2032, 6).unwrap());
        assert_eq!(start.add_months(-7), YearMonth::new(2021, 12).unwrap());
    }

    #[test]
    fn test_invalid_month() {
        assert!(YearMonth::new(2026, 0).is_err());
        assert!(YearMonth::new(2026, 13).is_err());
    }

    #[test]
    fn test_label_and_parse() {
        let ym: YearMonth = "2022-07".parse().unwrap();
        assert_eq!(ym.label(), "Jul 2022");
        assert_eq!(ym.to_string(), "2022-07");
        assert!("2022/07".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_deserialize_validates_month() {
        let ok: YearMonth = serde_json::from_str(r#"{"year":2026,"month":3}"#).unwrap();
        assert_eq!(ok, YearMonth::new(2026, 3).unwrap());

        let err = serde_json::from_str::<YearMonth>(r#"{"year":2026,"month":0}"#).unwrap_err();
        assert!(err.to_string().contains("1..=12"), "got {err}");
        assert!(serde_json::from_str::<YearMonth>(r#"{"year":2026,"month":13}"#).is_err());
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(YearMonth::from_date(date), YearMonth { year: 2026, month: 10 });
    }
}
