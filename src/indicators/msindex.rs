use super::CalculatedIndicator;
use crate::core::timeseries::align_series;
use crate::error::{EngineError, Result};
use crate::models::{MergedPoint, Observation};

/// Nonfinancial corporate business; corporate equities; liability, level.
pub const EQUITY_SERIES: &str = "NCBCEL";
/// Nonfinancial corporate business; net worth, level (market value).
pub const NET_WORTH_SERIES: &str = "TNWMVBSNNCB";

/// Misesian Stationary Index: equity over net worth, normalised by the running
/// geometric mean of that ratio so the series oscillates around 1.0.
pub struct MisesianStationaryIndex;

impl CalculatedIndicator for MisesianStationaryIndex {
    fn slug(&self) -> &str {
        "msindex"
    }

    fn name(&self) -> &str {
        "Misesian Stationary Index"
    }

    fn y_axis_label(&self) -> &str {
        "Index Value"
    }

    fn value_column(&self) -> &str {
        "msindex"
    }

    fn required_inputs(&self) -> Vec<&str> {
        vec![EQUITY_SERIES, NET_WORTH_SERIES]
    }

    fn history_dependent(&self) -> bool {
        true
    }

    /// Inputs expected: [0] = Equity liabilities, [1] = Net worth
    fn calculate(&self, inputs: &[Vec<Observation>]) -> Result<Vec<MergedPoint>> {
        if inputs.len() < 2 {
            return Err(EngineError::InvalidParameter {
                name: "inputs",
                reason: "MS Index requires 2 inputs: Equity and Net Worth".to_string(),
            });
        }

        let aligned = align_series(&inputs[0], &inputs[1]);
        let result = geometric_scale(&aligned);

        if result.is_empty() {
            return Err(EngineError::NoData(
                "equity and net worth share no usable dates".to_string(),
            ));
        }

        Ok(result)
    }
}

/// Divides each ratio by the geometric mean of all ratios up to and including it.
///
/// Order matters: point i sees exactly the i ratios before it, so the same quarter
/// gets a different value when the history is cut shorter. The running product is
/// kept as a sum of logarithms to avoid overflow over long histories. Dates with a
/// non-positive ratio (or denominator) are skipped since their logarithm is undefined.
pub fn geometric_scale(aligned: &[(chrono::NaiveDate, f64, f64)]) -> Vec<MergedPoint> {
    let mut result = Vec::with_capacity(aligned.len());
    let mut log_product = 0.0_f64;

    for &(date, equity, net_worth) in aligned {
        if net_worth <= 0.0 {
            continue;
        }
        let unscaled = equity / net_worth;
        if !(unscaled.is_finite() && unscaled > 0.0) {
            continue;
        }

        log_product += unscaled.ln();
        let n = (result.len() + 1) as f64;
        let geo_mean = (log_product / n).exp();

        result.push(MergedPoint {
            date,
            input_a: equity,
            input_b: net_worth,
            derived: unscaled / geo_mean,
        });
    }

    result
}
