use std::env;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{DataSource, FetchOptions};
use crate::config::FRED_API_KEY_VAR;
use crate::error::{EngineError, Result};
use crate::models::Observation;

/// Sentinel FRED uses for a missing observation.
const MISSING_VALUE: &str = ".";

pub struct FredFetcher {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl FredFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("MacroIndicatorEngine/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: base_url.into(),
            client,
            api_key: None,
        }
    }

    /// Pins the key instead of reading `FRED_API_KEY` on every call.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn resolve_api_key(&self) -> Result<String> {
        let raw = match &self.api_key {
            Some(key) => key.clone(),
            None => env::var(FRED_API_KEY_VAR).unwrap_or_default(),
        };

        // Stray whitespace from .env files is common; the key itself is sent as given.
        let sanitized = raw.trim().to_string();
        if sanitized.is_empty() {
            return Err(EngineError::Configuration(format!(
                "{} environment variable not set",
                FRED_API_KEY_VAR
            )));
        }
        if sanitized.len() != 32 {
            warn!(key_length = sanitized.len(), "FRED API key is not 32 characters long, request will likely fail");
        }
        Ok(sanitized)
    }

    /// Turns a FRED observations envelope into clean observations.
    /// Missing markers and unparseable rows are dropped, not reported.
    fn parse_observations(series_id: &str, json: &Value) -> Result<Vec<Observation>> {
        let observations = json["observations"]
            .as_array()
            .ok_or_else(|| EngineError::MalformedResponse {
                series_id: series_id.to_string(),
                reason: "no observations array in response".to_string(),
            })?;

        let mut data_points = Vec::with_capacity(observations.len());

        for obs in observations {
            let (Some(date_str), Some(value_str)) = (obs["date"].as_str(), obs["value"].as_str()) else {
                continue;
            };
            if value_str == MISSING_VALUE {
                continue;
            }
            let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
                continue;
            };
            let Ok(value) = value_str.trim().parse::<f64>() else {
                continue;
            };
            if !value.is_finite() {
                continue;
            }
            data_points.push(Observation { date, value });
        }

        Ok(data_points)
    }
}

#[async_trait]
impl DataSource for FredFetcher {
    fn name(&self) -> &str {
        "fred"
    }

    async fn fetch_series(&self, series_id: &str, opts: &FetchOptions) -> Result<Vec<Observation>> {
        let api_key = self.resolve_api_key()?;
        opts.validate()?;

        let today = Utc::now().date_naive();
        let mut query = vec![("series_id", series_id.to_string()), ("api_key", api_key)];
        query.extend(opts.query_pairs(today));

        debug!(
            series_id,
            frequency = %opts.frequency,
            start = ?opts.observation_start,
            "Fetching FRED series"
        );

        let resp = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| EngineError::network(series_id, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Upstream {
                series_id: series_id.to_string(),
                status,
                body,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| EngineError::network(series_id, e))?;
        let json: Value = serde_json::from_str(&body).map_err(|e| EngineError::MalformedResponse {
            series_id: series_id.to_string(),
            reason: e.to_string(),
        })?;

        let data = Self::parse_observations(series_id, &json)?;
        if data.is_empty() {
            return Err(EngineError::NoData(format!(
                "series {} has no observations in the requested time range",
                series_id
            )));
        }

        debug!(series_id, count = data.len(), "FRED series parsed");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_response() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "123.45" },
                { "date": "2023-04-01", "value": "124.56" }
            ]
        });

        let points = FredFetcher::parse_observations("GDP", &json_data).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 123.45);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
    }

    #[test]
    fn test_parse_missing_value() {
        let json_data = json!({
            "observations": [
                { "date": "2023-01-01", "value": "." },
                { "date": "2023-04-01", "value": "100.0" }
            ]
        });

        let points = FredFetcher::parse_observations("GDP", &json_data).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 100.0);
    }

    #[test]
    fn test_parse_skips_garbage_rows() {
        let json_data = json!({
            "observations": [
                { "date": "01/01/2023", "value": "1.0" },
                { "date": "2023-04-01", "value": "n/a" },
                { "date": "2023-07-01" },
                { "date": "2023-10-01", "value": 5 },
                { "date": "2024-01-01", "value": "7.5" }
            ]
        });

        let points = FredFetcher::parse_observations("GDP", &json_data).unwrap();
        assert_eq!(points, vec![Observation::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 7.5)]);
    }

    #[test]
    fn test_parse_invalid_format() {
        let json_data = json!({ "error": "bad request" });
        let result = FredFetcher::parse_observations("GDP", &json_data);
        assert!(matches!(result, Err(EngineError::MalformedResponse { .. })));
    }

    #[test]
    fn test_api_key_is_trimmed_but_not_rewritten() {
        let fetcher = FredFetcher::new("http://localhost", Duration::from_secs(1))
            .with_api_key("  ABCDEF0123456789abcdef0123456789\n");
        assert_eq!(fetcher.resolve_api_key().unwrap(), "ABCDEF0123456789abcdef0123456789");
    }

    #[tokio::test]
    async fn test_blank_key_is_a_configuration_error() {
        let fetcher = FredFetcher::new("http://localhost", Duration::from_secs(1)).with_api_key("   ");
        let err = fetcher
            .fetch_series("GDP", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
