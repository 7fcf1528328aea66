use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::analysis::statistics::{mean, quartiles};
use crate::core::cache::ResultCache;
use crate::core::range::RangeToken;
use crate::core::timeseries::trim_from;
use crate::error::{EngineError, Result};
use crate::fetcher::{DataSource, FetchOptions};
use crate::indicators::registry::SharedIndicator;
use crate::indicators::CalculatedIndicator;
use crate::models::{ChartPoint, MergedPoint};

pub type ChartData = Arc<Vec<ChartPoint>>;
pub type ChartCache = ResultCache<ChartData>;

/// Optional bands requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartFlags {
    pub average: bool,
    pub quartiles: bool,
}

/// A fully resolved request. `start` and `today` come from one instant so the
/// fetch window and the output trim always agree.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartQuery {
    pub range: RangeToken,
    pub flags: ChartFlags,
    pub today: NaiveDate,
    pub start: Option<NaiveDate>,
}

impl ChartQuery {
    pub fn new(range: RangeToken, flags: ChartFlags, today: NaiveDate) -> Self {
        Self {
            range,
            flags,
            today,
            start: range.start_date(today),
        }
    }

    pub fn now(range: RangeToken, flags: ChartFlags) -> Self {
        Self::new(range, flags, Utc::now().date_naive())
    }

    pub fn cache_key(&self, slug: &str) -> String {
        format!(
            "{}:{}:{}:{}",
            slug, self.range, self.flags.average, self.flags.quartiles
        )
    }
}

/// Turns computed points into chart points, attaching the requested bands.
/// Bands that were not requested stay at 0.0.
pub fn build_chart_points(merged: &[MergedPoint], flags: ChartFlags) -> Vec<ChartPoint> {
    let values: Vec<f64> = merged.iter().map(|p| p.derived).collect();

    let average = if flags.average { mean(&values) } else { 0.0 };
    let (q1, q3) = if flags.quartiles {
        quartiles(&values)
    } else {
        (Vec::new(), Vec::new())
    };

    merged
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut chart_point = ChartPoint::from_merged(point);
            chart_point.average = average;
            if flags.quartiles {
                chart_point.quartile1 = q1[i];
                chart_point.quartile3 = q3[i];
            }
            chart_point
        })
        .collect()
}

/// Cache-fronted pipeline: fetch inputs, calculate, trim, attach bands, store.
pub struct ChartService {
    source: Arc<dyn DataSource>,
    cache: Arc<ChartCache>,
    ttl_override: Option<Duration>,
}

impl ChartService {
    pub fn new(source: Arc<dyn DataSource>, cache: Arc<ChartCache>, ttl_override: Option<Duration>) -> Self {
        Self {
            source,
            cache,
            ttl_override,
        }
    }

    pub fn cache(&self) -> &Arc<ChartCache> {
        &self.cache
    }

    pub async fn load(&self, indicator: &dyn CalculatedIndicator, query: &ChartQuery) -> Result<ChartData> {
        let key = query.cache_key(indicator.slug());

        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "Chart cache hit");
            return Ok(hit);
        }

        info!(
            indicator = indicator.slug(),
            range = %query.range,
            source = self.source.name(),
            "Chart cache miss, computing"
        );

        // History-dependent indicators always see the full history.
        let fetch_start = if indicator.history_dependent() {
            None
        } else {
            query.start
        };
        let opts = FetchOptions {
            observation_start: fetch_start,
            observation_end: Some(query.today),
            frequency: indicator.frequency(),
            ..Default::default()
        };

        let mut inputs = Vec::new();
        for series_id in indicator.required_inputs() {
            let data = self.source.fetch_series(series_id, &opts).await?;
            debug!(series_id, count = data.len(), "Input series fetched");
            inputs.push(data);
        }

        let merged = indicator.calculate(&inputs)?;
        let windowed = trim_from(merged, query.start, |p| p.date);
        if windowed.is_empty() {
            return Err(EngineError::NoData(format!(
                "{} has no points in range {}",
                indicator.slug(),
                query.range
            )));
        }

        let points: ChartData = Arc::new(build_chart_points(&windowed, query.flags));
        let ttl = self.ttl_override.unwrap_or_else(|| indicator.cache_ttl());
        self.cache.set(key, points.clone(), ttl);

        Ok(points)
    }

    /// Runs `load` on its own task so a dropped request cannot abort the fetch halfway.
    /// A cancelled task surfaces as `EngineError::Canceled`.
    pub async fn load_detached(self: &Arc<Self>, indicator: SharedIndicator, query: ChartQuery) -> Result<ChartData> {
        let service = Arc::clone(self);
        let handle = tokio::spawn(async move { service.load(indicator.as_ref(), &query).await });
        join_outcome(handle.await)
    }
}

/// Maps a finished chart task onto the caller's result. Cancellation stays
/// distinguishable from a task that died.
pub fn join_outcome<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(EngineError::Canceled),
        Err(e) => Err(EngineError::Render(format!("chart task failed: {}", e))),
    }
}
