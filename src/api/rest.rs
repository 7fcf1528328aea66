// =============================================================================
// Indicator chart endpoints
// =============================================================================
//
// Every registered indicator gets the same four GET routes: an HTML chart
// fragment, an HTML downloads fragment, and CSV / JSON exports. Any other
// method on those paths is answered with 405 by the method router.
//
// HTML routes report failures inline as an error fragment; the export routes
// answer with a plain status code instead.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::app_state::AppState;
use crate::core::orchestrator::{ChartData, ChartFlags, ChartQuery};
use crate::core::range::RangeToken;
use crate::error::EngineError;
use crate::indicators::registry::{IndicatorMetadata, Registry, SharedIndicator};
use crate::output::chart::{render_chart, render_downloads};
use crate::output::csv::render_csv;
use crate::output::json::render_json;
use crate::output::render_error;

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const HX_TRIGGER: &str = "hx-trigger";
const CHART_INIT_EVENT: &str = "initChartFromData";

// =============================================================================
// Router construction
// =============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/indicators", get(list_indicators))
        .route("/:indicator/chart", get(chart))
        .route("/:indicator/downloads", get(downloads))
        .route("/:indicator/data", get(data_json))
        .route("/:indicator/data.csv", get(data_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Query parsing
// =============================================================================

/// `range` defaults to max; `average` and `quartiles` are on when present at all.
fn chart_query(params: &HashMap<String, String>) -> ChartQuery {
    let range = RangeToken::parse(params.get("range").map(String::as_str).unwrap_or("max"));
    let flags = ChartFlags {
        average: params.contains_key("average"),
        quartiles: params.contains_key("quartiles"),
    };
    ChartQuery::now(range, flags)
}

fn lookup(slug: &str) -> Result<SharedIndicator, Response> {
    Registry::get(slug).ok_or_else(|| (StatusCode::NOT_FOUND, "unknown indicator").into_response())
}

fn log_failure(slug: &str, query: &ChartQuery, err: &EngineError) {
    if err.is_canceled() {
        debug!(indicator = slug, range = %query.range, "Chart request canceled");
    } else {
        error!(indicator = slug, range = %query.range, error = %err, "Failed to get chart data");
    }
}

async fn load(state: &AppState, indicator: &SharedIndicator, query: &ChartQuery) -> Result<ChartData, EngineError> {
    state
        .service
        .load_detached(Arc::clone(indicator), query.clone())
        .await
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_indicators() -> Json<Vec<IndicatorMetadata>> {
    let list = Registry::all()
        .iter()
        .filter_map(|ind| Registry::get_metadata(ind.slug()))
        .collect();
    Json(list)
}

async fn chart(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let indicator = match lookup(&slug) {
        Ok(ind) => ind,
        Err(resp) => return resp,
    };
    let query = chart_query(&params);

    let rendered = load(&state, &indicator, &query)
        .await
        .and_then(|points| render_chart(indicator.as_ref(), &points, query.flags));

    match rendered {
        Ok(html) => (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE)),
                (HeaderName::from_static(HX_TRIGGER), HeaderValue::from_static(CHART_INIT_EVENT)),
            ],
            html,
        )
            .into_response(),
        Err(err) if err.is_canceled() => {
            log_failure(&slug, &query, &err);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => {
            log_failure(&slug, &query, &err);
            html_fragment(render_error(err.user_message()))
        }
    }
}

async fn downloads(Path(slug): Path<String>, Query(params): Query<HashMap<String, String>>) -> Response {
    let indicator = match lookup(&slug) {
        Ok(ind) => ind,
        Err(resp) => return resp,
    };
    let query = chart_query(&params);
    html_fragment(render_downloads(indicator.slug(), &query))
}

async fn data_csv(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let indicator = match lookup(&slug) {
        Ok(ind) => ind,
        Err(resp) => return resp,
    };
    let query = chart_query(&params);

    let rendered = load(&state, &indicator, &query)
        .await
        .and_then(|points| render_csv(indicator.value_column(), &points, query.flags));

    match rendered {
        Ok(body) => attachment(indicator.slug(), "csv", "text/csv; charset=utf-8", body),
        Err(err) => export_error(&slug, &query, err),
    }
}

async fn data_json(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let indicator = match lookup(&slug) {
        Ok(ind) => ind,
        Err(resp) => return resp,
    };
    let query = chart_query(&params);

    let rendered = load(&state, &indicator, &query)
        .await
        .and_then(|points| render_json(&points));

    match rendered {
        Ok(body) => attachment(indicator.slug(), "json", "application/json", body),
        Err(err) => export_error(&slug, &query, err),
    }
}

// =============================================================================
// Response helpers
// =============================================================================

fn html_fragment(body: String) -> Response {
    ([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response()
}

fn attachment(slug: &str, extension: &str, content_type: &'static str, body: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}-data.{}\"", slug, extension);
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

fn export_error(slug: &str, query: &ChartQuery, err: EngineError) -> Response {
    log_failure(slug, query, &err);
    (err.status_code(), err.user_message()).into_response()
}
