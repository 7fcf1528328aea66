use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;

use crate::indicators::buffett::BuffettIndicator;
use crate::indicators::msindex::MisesianStationaryIndex;
use crate::indicators::CalculatedIndicator;

pub type SharedIndicator = Arc<dyn CalculatedIndicator>;

// ============================================================================
// STATIC INDICATOR REGISTRY (Lazy initialization)
// ============================================================================

static INDICATORS: Lazy<Vec<SharedIndicator>> = Lazy::new(|| {
    vec![
        Arc::new(BuffettIndicator) as SharedIndicator,
        Arc::new(MisesianStationaryIndex) as SharedIndicator,
    ]
});

/// Serializable summary of a registered indicator.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorMetadata {
    pub slug: String,
    pub name: String,
    pub inputs: Vec<String>,
    pub frequency: String,
}

pub struct Registry;

impl Registry {
    pub fn get(slug: &str) -> Option<SharedIndicator> {
        INDICATORS.iter().find(|ind| ind.slug() == slug).cloned()
    }

    pub fn all() -> &'static [SharedIndicator] {
        &INDICATORS
    }

    pub fn get_metadata(slug: &str) -> Option<IndicatorMetadata> {
        Self::get(slug).map(|ind| IndicatorMetadata {
            slug: ind.slug().to_string(),
            name: ind.name().to_string(),
            inputs: ind.required_inputs().iter().map(|s| s.to_string()).collect(),
            frequency: ind.frequency().to_string(),
        })
    }
}
