use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{EngineError, Result};
use crate::models::Observation;

pub mod fred;

pub const MAX_LIMIT: u32 = 100_000;

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_series(&self, series_id: &str, opts: &FetchOptions) -> Result<Vec<Observation>>;
}

/// Aggregation frequency understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    #[default]
    Quarterly,
    SemiAnnual,
    Annual,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "d",
            Frequency::Weekly => "w",
            Frequency::Biweekly => "bw",
            Frequency::Monthly => "m",
            Frequency::Quarterly => "q",
            Frequency::SemiAnnual => "sa",
            Frequency::Annual => "a",
        }
    }
}

/// Transformation applied by the provider before returning values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Linear,
    Change,
    ChangeFromYearAgo,
    PercentChange,
    PercentChangeFromYearAgo,
    PercentChangeAnnualRate,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Linear => "lin",
            Units::Change => "chg",
            Units::ChangeFromYearAgo => "ch1",
            Units::PercentChange => "pch",
            Units::PercentChangeFromYearAgo => "pc1",
            Units::PercentChangeAnnualRate => "pca",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call parameters for a series request.
/// `observation_start: None` asks for the full history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    pub observation_start: Option<NaiveDate>,
    /// Defaults to today when unset.
    pub observation_end: Option<NaiveDate>,
    pub frequency: Frequency,
    pub units: Units,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort_order: SortOrder,
}

impl FetchOptions {
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.limit {
            if !(1..=MAX_LIMIT).contains(&limit) {
                return Err(EngineError::InvalidParameter {
                    name: "limit",
                    reason: format!("{} is outside 1..={}", limit, MAX_LIMIT),
                });
            }
        }
        if let (Some(start), Some(end)) = (self.observation_start, self.observation_end) {
            if start > end {
                return Err(EngineError::InvalidParameter {
                    name: "observation_start",
                    reason: format!("{} is after observation_end {}", start, end),
                });
            }
        }
        Ok(())
    }

    /// Query pairs sent to the provider, minus the series id and key.
    pub fn query_pairs(&self, today: NaiveDate) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("file_type", "json".to_string())];
        if let Some(start) = self.observation_start {
            pairs.push(("observation_start", start.format("%Y-%m-%d").to_string()));
        }
        let end = self.observation_end.unwrap_or(today);
        pairs.push(("observation_end", end.format("%Y-%m-%d").to_string()));
        pairs.push(("frequency", self.frequency.as_str().to_string()));
        pairs.push(("units", self.units.as_str().to_string()));
        pairs.push(("sort_order", self.sort_order.as_str().to_string()));
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset.filter(|o| *o > 0) {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}
