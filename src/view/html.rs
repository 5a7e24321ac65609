//! Static HTML report. Every backend string goes through `escape_html`.

use crate::view::{DashboardView, Placeholder, RowView, TableBody, TableView};
use chrono::{DateTime, Local};

pub const REPORT_FILE_NAME: &str = "laughing_legends_report.html";

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;background:#111;color:#eee}\
table{border-collapse:collapse;width:100%;margin-bottom:2rem}\
th,td{border:1px solid #444;padding:.4rem .6rem;text-align:left;vertical-align:top}\
th{background:#222}.counters span{margin-right:2rem}\
.status-online{color:#4caf50}.status-offline{color:#f44336}.status-registered{color:#2196f3}\
.rank-1{background:#3d3300}.rank-2{background:#2e2e2e}.rank-3{background:#3a2410}\
.empty{text-align:center;color:#888}";

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn render_report(view: &DashboardView, title: &str, generated: DateTime<Local>) -> String {
    let counters = view.counters;
    let distribution = view.distribution;
    let title = escape_html(title);

    let mut out = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title><style>{STYLE}</style></head><body>\n\
<h1>{title}</h1>\n<p>Generated {}</p>\n",
        generated.format("%Y-%m-%d %H:%M"),
    );
    out.push_str(&format!(
        "<div class=\"counters\"><span>Total teams: {}</span><span>In leaderboard: {}</span>\
<span>Pending: {}</span><span>Total points: {}</span></div>\n",
        counters.total, counters.in_leaderboard, counters.pending, counters.total_points
    ));
    out.push_str(&format!(
        "<p>Registered {} ({:.0}%) / In leaderboard {} ({:.0}%)</p>\n",
        distribution.registered,
        distribution.share(distribution.registered),
        distribution.in_leaderboard,
        distribution.share(distribution.in_leaderboard),
    ));

    for table in [&view.registrations, &view.all_teams, &view.leaderboard] {
        out.push_str(&render_table(table));
    }
    out.push_str("</body></html>\n");
    out
}

/// Read-only rendition: the actions column is left out.
pub fn render_table(table: &TableView) -> String {
    let header: String = table
        .columns
        .iter()
        .map(|column| format!("<th>{}</th>", escape_html(column)))
        .collect();
    let body = match &table.body {
        TableBody::Placeholder(placeholder) => placeholder_row(*placeholder, table.columns.len()),
        TableBody::Rows(rows) => {
            let status_column = table.columns.iter().position(|c| *c == "Status");
            rows.iter().map(|row| render_row(row, status_column)).collect()
        }
    };
    format!(
        "<h2>{}</h2>\n<table>\n<thead><tr>{header}</tr></thead>\n<tbody>\n{body}</tbody></table>\n",
        table.kind.title()
    )
}

fn render_row(row: &RowView, status_column: Option<usize>) -> String {
    let class = match row.rank {
        Some(rank @ 1..=3) => format!(" class=\"rank-{rank}\""),
        _ => String::new(),
    };
    let cells: String = row
        .cells
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let body = cell.iter().map(|line| escape_html(line)).collect::<Vec<_>>().join("<br>");
            if status_column == Some(index) {
                format!("<td class=\"{}\">{body}</td>", row.status.css_class())
            } else {
                format!("<td>{body}</td>")
            }
        })
        .collect();
    format!("<tr{class}>{cells}</tr>\n")
}

fn placeholder_row(placeholder: Placeholder, span: usize) -> String {
    format!(
        "<tr><td class=\"empty\" colspan=\"{}\">{}</td></tr>\n",
        span.max(1),
        escape_html(placeholder.text())
    )
}
