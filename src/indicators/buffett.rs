use super::CalculatedIndicator;
use crate::core::timeseries::align_series;
use crate::error::{EngineError, Result};
use crate::models::{MergedPoint, Observation};

/// Nonfinancial corporate business; corporate equities; liability, level (millions of USD).
pub const MARKET_CAP_SERIES: &str = "NCBEILQ027S";
/// Gross domestic product (billions of USD, SAAR).
pub const GDP_SERIES: &str = "GDP";

/// NCBEILQ027S is reported in millions, GDP in billions.
const MILLIONS_PER_BILLION: f64 = 1000.0;

pub struct BuffettIndicator;

impl CalculatedIndicator for BuffettIndicator {
    fn slug(&self) -> &str {
        "buffett-indicator"
    }

    fn name(&self) -> &str {
        "Buffett Indicator"
    }

    fn y_axis_label(&self) -> &str {
        "Ratio (%)"
    }

    fn value_column(&self) -> &str {
        "buffett_indicator"
    }

    fn required_inputs(&self) -> Vec<&str> {
        vec![MARKET_CAP_SERIES, GDP_SERIES]
    }

    /// Inputs expected: [0] = Market Cap (millions), [1] = GDP (billions)
    /// Returns market cap as a percentage of GDP on every quarter both series report.
    fn calculate(&self, inputs: &[Vec<Observation>]) -> Result<Vec<MergedPoint>> {
        if inputs.len() < 2 {
            return Err(EngineError::InvalidParameter {
                name: "inputs",
                reason: "Buffett Indicator requires 2 inputs: Market Cap and GDP".to_string(),
            });
        }

        let market_cap = &inputs[0];
        let gdp = &inputs[1];

        let result: Vec<MergedPoint> = align_series(market_cap, gdp)
            .into_iter()
            .filter(|(_, _, gdp_val)| *gdp_val > 0.0)
            .filter_map(|(date, mc, gdp_val)| {
                let mc_billions = mc / MILLIONS_PER_BILLION;
                let ratio = (mc_billions / gdp_val) * 100.0;
                ratio.is_finite().then_some(MergedPoint {
                    date,
                    input_a: mc,
                    input_b: gdp_val,
                    derived: ratio,
                })
            })
            .collect();

        if result.is_empty() {
            return Err(EngineError::NoData(
                "market cap and GDP share no usable dates".to_string(),
            ));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(date: &str, value: f64) -> Observation {
        Observation::new(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(), value)
    }

    #[test]
    fn test_unit_alignment() {
        // 2,500,000 million = 2,500 billion; 2,500 / 25,000 GDP = 10%
        let mc = vec![obs("2024-01-01", 2_500_000.0)];
        let gdp = vec![obs("2024-01-01", 25_000.0)];

        let result = BuffettIndicator.calculate(&[mc, gdp]).unwrap();
        assert_eq!(result.len(), 1);
        assert!((result[0].derived - 10.0).abs() < 1e-9, "Expected 10.0, got {}", result[0].derived);
        assert_eq!(result[0].input_a, 2_500_000.0);
        assert_eq!(result[0].input_b, 25_000.0);
    }

    #[test]
    fn test_non_positive_gdp_is_skipped() {
        let mc = vec![obs("2024-01-01", 1000.0), obs("2024-04-01", 1000.0), obs("2024-07-01", 1000.0)];
        let gdp = vec![obs("2024-01-01", 0.0), obs("2024-04-01", -5.0), obs("2024-07-01", 10.0)];

        let result = BuffettIndicator.calculate(&[mc, gdp]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert!(result.iter().all(|p| p.derived.is_finite()));
    }

    #[test]
    fn test_no_overlap_is_no_data() {
        let mc = vec![obs("2024-01-01", 1000.0)];
        let gdp = vec![obs("2024-04-01", 10.0)];
        let err = BuffettIndicator.calculate(&[mc, gdp]).unwrap_err();
        assert!(matches!(err, EngineError::NoData(_)));
    }

    #[test]
    fn test_requires_two_inputs() {
        assert!(BuffettIndicator.calculate(&[vec![obs("2024-01-01", 1.0)]]).is_err());
    }
}
