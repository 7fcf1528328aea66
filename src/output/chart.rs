use std::collections::BTreeMap;

use serde::Serialize;

use super::escape_html;
use crate::core::orchestrator::{ChartFlags, ChartQuery};
use crate::error::{EngineError, Result};
use crate::indicators::CalculatedIndicator;
use crate::models::ChartPoint;

pub const CANVAS_ID: &str = "chart-canvas";

const MAIN_COLOR: &str = "rgb(54, 162, 235)";
const AVERAGE_COLOR: &str = "rgb(255, 159, 64)";
const QUARTILE_COLOR: &str = "rgba(150, 150, 150, 0.8)";

/// Chart.js-style dataset.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub border_color: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub border_dash: Vec<u8>,
    pub point_radius: u8,
    pub fill: bool,
}

impl Dataset {
    fn line(label: impl Into<String>, data: Vec<f64>, border_color: &'static str) -> Self {
        Self {
            label: label.into(),
            data,
            border_color,
            border_dash: Vec::new(),
            point_radius: 0,
            fill: false,
        }
    }

    fn dashed(mut self) -> Self {
        self.border_dash = vec![5, 5];
        self
    }
}

/// Everything the front-end widget needs to draw one chart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload<'a> {
    pub canvas_id: &'static str,
    pub labels: Vec<&'a str>,
    pub datasets: Vec<Dataset>,
    pub points: &'a [ChartPoint],
    pub options: BTreeMap<&'static str, String>,
}

impl<'a> ChartPayload<'a> {
    pub fn build(indicator: &dyn CalculatedIndicator, points: &'a [ChartPoint], flags: ChartFlags) -> Self {
        let labels = points.iter().map(|p| p.date.as_str()).collect();

        let mut datasets = vec![Dataset::line(
            indicator.name(),
            points.iter().map(|p| p.value).collect(),
            MAIN_COLOR,
        )];
        if flags.average {
            datasets.push(
                Dataset::line("Average", points.iter().map(|p| p.average).collect(), AVERAGE_COLOR).dashed(),
            );
        }
        if flags.quartiles {
            datasets.push(
                Dataset::line(
                    "Q1 (25th percentile)",
                    points.iter().map(|p| p.quartile1).collect(),
                    QUARTILE_COLOR,
                )
                .dashed(),
            );
            datasets.push(
                Dataset::line(
                    "Q3 (75th percentile)",
                    points.iter().map(|p| p.quartile3).collect(),
                    QUARTILE_COLOR,
                )
                .dashed(),
            );
        }

        let mut options = BTreeMap::new();
        options.insert("mainLabel", indicator.name().to_string());
        options.insert("yAxisLabel", indicator.y_axis_label().to_string());
        options.insert("showAverage", flags.average.to_string());
        options.insert("showQuartiles", flags.quartiles.to_string());

        Self {
            canvas_id: CANVAS_ID,
            labels,
            datasets,
            points,
            options,
        }
    }
}

/// HTML fragment carrying the payload as a `data-chart` attribute next to the canvas.
pub fn render_chart(indicator: &dyn CalculatedIndicator, points: &[ChartPoint], flags: ChartFlags) -> Result<String> {
    let payload = ChartPayload::build(indicator, points, flags);
    let json = serde_json::to_string(&payload)
        .map_err(|e| EngineError::Render(format!("chart payload serialization failed: {}", e)))?;

    Ok(format!(
        "<div class=\"chart-container\" data-chart='{}'>\n\t<canvas id=\"{}\"></canvas>\n</div>",
        escape_html(&json),
        CANVAS_ID
    ))
}

/// Links to the CSV and JSON exports for the same range and flags.
pub fn render_downloads(slug: &str, query: &ChartQuery) -> String {
    let mut params = format!("range={}", query.range);
    if query.flags.average {
        params.push_str("&average");
    }
    if query.flags.quartiles {
        params.push_str("&quartiles");
    }
    let params = escape_html(&params);
    let slug = escape_html(slug);

    format!(
        "<div class=\"chart-downloads\">\n\
         \t<a href=\"/{slug}/data.csv?{params}\" download>Download CSV</a>\n\
         \t<a href=\"/{slug}/data?{params}\" download>Download JSON</a>\n\
         </div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::range::RangeToken;
    use crate::indicators::buffett::BuffettIndicator;
    use chrono::NaiveDate;

    fn points() -> Vec<ChartPoint> {
        vec![
            ChartPoint { date: "2024-01-01".into(), value: 180.0, quartile1: 0.0, quartile3: 0.0, average: 190.0 },
            ChartPoint { date: "2024-04-01".into(), value: 200.0, quartile1: 0.0, quartile3: 0.0, average: 190.0 },
        ]
    }

    #[test]
    fn test_payload_datasets_follow_flags() {
        let pts = points();
        let plain = ChartPayload::build(&BuffettIndicator, &pts, ChartFlags::default());
        assert_eq!(plain.datasets.len(), 1);
        assert_eq!(plain.labels, vec!["2024-01-01", "2024-04-01"]);
        assert_eq!(plain.options["showAverage"], "false");
        assert_eq!(plain.options["mainLabel"], "Buffett Indicator");

        let both = ChartPayload::build(&BuffettIndicator, &pts, ChartFlags { average: true, quartiles: true });
        let labels: Vec<&str> = both.datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Buffett Indicator", "Average", "Q1 (25th percentile)", "Q3 (75th percentile)"]);
        assert_eq!(both.options["showQuartiles"], "true");
    }

    #[test]
    fn test_render_chart_embeds_parseable_json() {
        let pts = points();
        let html = render_chart(&BuffettIndicator, &pts, ChartFlags { average: true, quartiles: false }).unwrap();
        assert!(html.contains("<canvas id=\"chart-canvas\"></canvas>"));

        let start = html.find("data-chart='").unwrap() + "data-chart='".len();
        let end = start + html[start..].find('\'').unwrap();
        let attr = html[start..end]
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&");
        let parsed: serde_json::Value = serde_json::from_str(&attr).unwrap();
        assert_eq!(parsed["canvasId"], "chart-canvas");
        assert_eq!(parsed["points"][1]["value"], 200.0);
        assert_eq!(parsed["datasets"][1]["borderDash"][0], 5);
        assert_eq!(parsed["options"]["yAxisLabel"], "Ratio (%)");
    }

    #[test]
    fn test_downloads_links_carry_flags() {
        let query = ChartQuery::new(
            RangeToken::TenYears,
            ChartFlags { average: true, quartiles: true },
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let html = render_downloads("msindex", &query);
        assert!(html.contains("href=\"/msindex/data.csv?range=10y&amp;average&amp;quartiles\""));
        assert!(html.contains("href=\"/msindex/data?range=10y&amp;average&amp;quartiles\""));

        let plain = ChartQuery::new(RangeToken::Max, ChartFlags::default(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(render_downloads("msindex", &plain).contains("/msindex/data.csv?range=max\""));
    }
}
