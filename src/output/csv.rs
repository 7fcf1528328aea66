use crate::core::orchestrator::ChartFlags;
use crate::error::{EngineError, Result};
use crate::models::ChartPoint;

fn render_err(e: impl std::fmt::Display) -> EngineError {
    EngineError::Render(format!("csv output failed: {}", e))
}

/// `date,<value_column>[,average][,quartile1,quartile3]`, six decimals per float.
pub fn render_csv(value_column: &str, points: &[ChartPoint], flags: ChartFlags) -> Result<Vec<u8>> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    let mut header = vec!["date", value_column];
    if flags.average {
        header.push("average");
    }
    if flags.quartiles {
        header.extend(["quartile1", "quartile3"]);
    }
    writer.write_record(&header).map_err(render_err)?;

    for point in points {
        let mut row = vec![point.date.clone(), format!("{:.6}", point.value)];
        if flags.average {
            row.push(format!("{:.6}", point.average));
        }
        if flags.quartiles {
            row.push(format!("{:.6}", point.quartile1));
            row.push(format!("{:.6}", point.quartile3));
        }
        writer.write_record(&row).map_err(render_err)?;
    }

    writer.into_inner().map_err(render_err)
}
