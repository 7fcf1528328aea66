use std::time::Duration;

use crate::error::Result;
use crate::fetcher::Frequency;
use crate::models::{MergedPoint, Observation};

pub mod buffett;
pub mod msindex;
pub mod registry;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub trait CalculatedIndicator: Send + Sync {
    /// Returns the unique slug used in routes and cache keys (e.g., "msindex")
    fn slug(&self) -> &str;

    /// Returns the display name
    fn name(&self) -> &str;

    fn y_axis_label(&self) -> &str;

    /// Column header for the indicator value in CSV output
    fn value_column(&self) -> &str;

    /// Returns the FRED Series IDs required for calculation, in input order
    fn required_inputs(&self) -> Vec<&str>;

    fn frequency(&self) -> Frequency {
        Frequency::Quarterly
    }

    /// True when each output value depends on every earlier input, so the full
    /// history must be fetched and the output trimmed afterwards.
    fn history_dependent(&self) -> bool {
        false
    }

    fn cache_ttl(&self) -> Duration {
        DEFAULT_CACHE_TTL
    }

    /// Calculate the indicator from inputs in `required_inputs` order.
    fn calculate(&self, inputs: &[Vec<Observation>]) -> Result<Vec<MergedPoint>>;
}
