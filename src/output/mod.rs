//! Renderers for computed chart series. All of them are pure functions of the
//! cached points plus the flags that were in effect for the query.

pub mod chart;
pub mod csv;
pub mod json;

/// Minimal escaping for text and attribute values in HTML fragments.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Inline error block shown in place of a chart.
pub fn render_error(message: &str) -> String {
    format!(
        "<div class=\"chart-error\">\n\t<strong>Error:</strong> {}\n</div>",
        escape_html(message)
    )
}
