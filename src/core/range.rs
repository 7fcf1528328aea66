use std::fmt;

use chrono::{Months, NaiveDate};

/// Coarse time window selected in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RangeToken {
    OneYear,
    FiveYears,
    TenYears,
    TwentyYears,
    FiftyYears,
    #[default]
    Max,
}

impl RangeToken {
    /// Unknown or empty tokens mean "everything".
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "1y" => Self::OneYear,
            "5y" => Self::FiveYears,
            "10y" => Self::TenYears,
            "20y" => Self::TwentyYears,
            "50y" => Self::FiftyYears,
            _ => Self::Max,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::TwentyYears => "20y",
            Self::FiftyYears => "50y",
            Self::Max => "max",
        }
    }

    fn years(&self) -> Option<u32> {
        match self {
            Self::OneYear => Some(1),
            Self::FiveYears => Some(5),
            Self::TenYears => Some(10),
            Self::TwentyYears => Some(20),
            Self::FiftyYears => Some(50),
            Self::Max => None,
        }
    }

    /// First date inside the window, or `None` for no lower bound.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let years = self.years()?;
        // Feb 29 clamps to Feb 28 in non-leap years.
        today.checked_sub_months(Months::new(years * 12))
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a raw range parameter against `today`.
pub fn resolve(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    RangeToken::parse(token).start_date(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_tokens_subtract_years() {
        let today = date(2024, 6, 15);
        assert_eq!(resolve("1y", today), Some(date(2023, 6, 15)));
        assert_eq!(resolve("5y", today), Some(date(2019, 6, 15)));
        assert_eq!(resolve("10y", today), Some(date(2014, 6, 15)));
        assert_eq!(resolve("20y", today), Some(date(2004, 6, 15)));
        assert_eq!(resolve("50y", today), Some(date(1974, 6, 15)));
    }

    #[test]
    fn test_max_and_unknown_have_no_lower_bound() {
        let today = date(2024, 6, 15);
        assert_eq!(resolve("max", today), None);
        assert_eq!(resolve("", today), None);
        assert_eq!(resolve("3y", today), None);
        assert_eq!(RangeToken::parse("bogus"), RangeToken::Max);
    }

    #[test]
    fn test_longer_ranges_start_earlier() {
        let today = date(2024, 2, 29);
        let starts: Vec<NaiveDate> = ["50y", "20y", "10y", "5y", "1y"]
            .iter()
            .filter_map(|t| resolve(t, today))
            .collect();
        assert_eq!(starts.len(), 5);
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(resolve("1y", today), Some(date(2023, 2, 28)));
        // Same instant, same answer.
        assert_eq!(resolve("5y", today), resolve("5y", today));
    }

    #[test]
    fn test_round_trips_through_display() {
        for raw in ["1y", "5y", "10y", "20y", "50y", "max"] {
            assert_eq!(RangeToken::parse(raw).to_string(), raw);
        }
    }
}
