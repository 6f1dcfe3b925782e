//! Plain text and HTML rendering of update reports

use crate::version::checker::DiffEntry;

const TABLE_STYLE: &str =
    "<style>table,th,td{border-collapse: collapse;border: 1px solid black;}</style>";

/// One-line summary of the update check
pub fn summary(entries: &[DiffEntry]) -> String {
    if entries.is_empty() {
        "No new packages available".to_string()
    } else {
        format!("{} new packages available", entries.len())
    }
}

/// Console line for one available update
pub fn console_line(entry: &DiffEntry) -> String {
    format!(
        "{} - Current: {} - Newest: {}",
        entry.name, entry.current_version, entry.new_version
    )
}

/// Render the report as an HTML document with one table row per entry.
///
/// Rows keep the order of `entries`.
pub fn render_html(text: &str, entries: &[DiffEntry]) -> String {
    let text = escape(text);
    if entries.is_empty() {
        return format!("<html><body><h3>{}</h3></body></html>", text);
    }

    let mut html = format!(
        "<html>{}<body><h3>{}</h3><table><tr><th>Package name</th><th>Current version</th><th>Newest version</th></tr>",
        TABLE_STYLE, text
    );
    for entry in entries {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&entry.name),
            escape(&entry.current_version),
            escape(&entry.new_version)
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
