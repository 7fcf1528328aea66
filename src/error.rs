//! Error taxonomy shared by the fetcher, the calculators and the HTTP layer.

use reqwest::StatusCode;
use thiserror::Error;

/// Non-standard "client closed request"; the caller is gone, so nobody reads it.
const CLIENT_CLOSED_REQUEST: u16 = 499;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing or unusable credentials. Not retryable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connectivity problem talking to the provider.
    #[error("network error fetching {series_id} ({kind}): {source}")]
    Network {
        series_id: String,
        kind: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Provider answered with a non-success status.
    #[error("upstream error for {series_id} (status {status}): {body}")]
    Upstream {
        series_id: String,
        status: StatusCode,
        body: String,
    },

    #[error("malformed response for {series_id}: {reason}")]
    MalformedResponse { series_id: String, reason: String },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Successful call that produced nothing usable.
    #[error("no data available: {0}")]
    NoData(String),

    #[error("render error: {0}")]
    Render(String),

    /// The task computing the response went away before finishing.
    #[error("request canceled")]
    Canceled,
}

impl EngineError {
    pub fn network(series_id: &str, source: reqwest::Error) -> Self {
        let kind = if source.is_timeout() {
            "timeout"
        } else if source.is_connect() {
            "connect"
        } else {
            "transport"
        };
        // The request URL carries the API key in its query string.
        Self::Network {
            series_id: series_id.to_string(),
            kind,
            source: source.without_url(),
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Message safe to show to end users. Upstream bodies and key details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Chart data is temporarily unavailable.",
            Self::NoData(_) => "No data available for the selected time range.",
            Self::Render(_) => "Unable to render chart. Please try again later.",
            _ => "Unable to load chart data. Please try again later.",
        }
    }

    /// Status used by the CSV and JSON download routes.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Network { .. } | Self::Upstream { .. } | Self::MalformedResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Self::NoData(_) => StatusCode::NOT_FOUND,
            Self::InvalidParameter { .. } | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Canceled => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::REQUEST_TIMEOUT)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_data_is_not_reported_as_a_transport_failure() {
        let err = EngineError::NoData("GDP".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.user_message(), "No data available for the selected time range.");

        let upstream = EngineError::Upstream {
            series_id: "GDP".into(),
            status: StatusCode::BAD_REQUEST,
            body: "Bad Request. The value for variable api_key is not registered.".into(),
        };
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!upstream.user_message().contains("api_key"));
    }

    #[test]
    fn missing_credentials_map_to_service_unavailable() {
        let err = EngineError::Configuration("FRED_API_KEY is not set".into());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.is_canceled());
        assert!(EngineError::Canceled.is_canceled());
    }

    #[test]
    fn canceled_is_a_client_side_status() {
        let status = EngineError::Canceled.status_code();
        assert_eq!(status.as_u16(), 499);
        assert!(!status.is_server_error());
    }
}
