use crate::error::{EngineError, Result};
use crate::models::ChartPoint;

pub fn render_json(points: &[ChartPoint]) -> Result<Vec<u8>> {
    serde_json::to_vec(points).map_err(|e| EngineError::Render(format!("json output failed: {}", e)))
}
