use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One reading from the upstream provider.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Two series aligned on the same date plus the value derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedPoint {
    pub date: NaiveDate,
    pub input_a: f64,
    pub input_b: f64,
    pub derived: f64,
}

/// The unit that gets cached and rendered.
/// `quartile1`, `quartile3` and `average` stay at 0.0 unless the query asked for them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChartPoint {
    pub date: String,
    pub value: f64,
    pub quartile1: f64,
    pub quartile3: f64,
    pub average: f64,
}

impl ChartPoint {
    pub fn from_merged(point: &MergedPoint) -> Self {
        Self {
            date: point.date.format("%Y-%m-%d").to_string(),
            value: point.derived,
            quartile1: 0.0,
            quartile3: 0.0,
            average: 0.0,
        }
    }
}
