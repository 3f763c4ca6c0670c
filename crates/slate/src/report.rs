// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::charts::ChartSet;
use crate::insight::{AnalysisReport, ColumnProfile};
use crate::shim::ShimSpec;
use askama_escape::{escape, Html};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
pub const SOURCE_PREVIEW_LIMIT: usize = 100;
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub html: String,
    pub shim: ShimSpec,
}
pub fn assemble(report: &AnalysisReport, charts: &ChartSet, source_descriptor: &str) -> ReportDocument {
    let mut body = String::new();
    body.push_str(&overview_section(report));
    body.push_str(&statistics_section(report));
    body.push_str(&missing_section(report));
    body.push_str(&insights_section(report));
    body.push_str(&charts_section(charts));
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Data Analysis Report</title>
<style>{STYLE}</style>
</head>
<body>
<div class="container">
<div class="header"><h1>Data Analysis Report</h1><p>Automated tabular summarisation</p></div>
<div class="data-source"><strong>Data Source:</strong> {source}</div>
{body}
<div class="footer"><p>Generated by <strong>Slate</strong> on {timestamp}</p></div>
</div>
</body>
</html>"#,
        source = source_block(source_descriptor),
        timestamp = Utc::now().format("%Y-%m-%d %H:%M UTC"),
    );
    ReportDocument {
        html,
        shim: ShimSpec::standard(),
    }
}
fn esc(text: &str) -> String {
    escape(text, Html).to_string()
}
fn source_block(descriptor: &str) -> String {
    if descriptor.starts_with("http") {
        let link = esc(descriptor);
        format!(r#"<a href="{link}" target="_blank">{link}</a>"#)
    } else {
        let preview: String = if descriptor.chars().count() > SOURCE_PREVIEW_LIMIT {
            format!(
                "{}...",
                descriptor.chars().take(SOURCE_PREVIEW_LIMIT).collect::<String>()
            )
        } else {
            descriptor.to_string()
        };
        format!(r#"<span class="source-preview">{}</span>"#, esc(&preview))
    }
}
fn overview_section(report: &AnalysisReport) -> String {
    let columns: Vec<String> = report.column_names.iter().map(|n| esc(n)).collect();
    format!(
        r#"<div class="report-section">
<h2>Data Overview</h2>
<p><strong>Total Rows:</strong> {rows}</p>
<p><strong>Total Columns:</strong> {cols}</p>
<p><strong>Columns:</strong> {names}</p>
</div>
"#,
        rows = report.row_count,
        cols = report.column_count,
        names = columns.join(", "),
    )
}
fn statistics_section(report: &AnalysisReport) -> String {
    let mut rows = String::new();
    for insight in &report.insights {
        if let ColumnProfile::Numeric(profile) = &insight.profile {
            rows.push_str(&format!(
                "<tr><td><strong>{}</strong></td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td></tr>",
                esc(&insight.column),
                profile.mean,
                profile.median,
                profile.std_dev,
                profile.min,
                profile.max,
            ));
        }
    }
    if rows.is_empty() {
        return r#"<div class="report-section">
<h2>Summary Statistics</h2>
<p>No numeric columns found for statistical analysis.</p>
</div>
"#
        .to_string();
    }
    format!(
        r#"<div class="report-section">
<h2>Summary Statistics</h2>
<table class="stats-table"><thead><tr><th>Column</th><th>Mean</th><th>Median</th><th>Std Dev</th><th>Min</th><th>Max</th></tr></thead><tbody>{rows}</tbody></table>
</div>
"#
    )
}
fn missing_section(report: &AnalysisReport) -> String {
    let mut rows = String::new();
    for (column, count) in &report.missing_values {
        if *count > 0 {
            rows.push_str(&format!(
                "<tr><td><strong>{}</strong></td><td>{count}</td></tr>",
                esc(column)
            ));
        }
    }
    if rows.is_empty() {
        return String::new();
    }
    format!(
        r#"<div class="report-section">
<h2>Missing Values</h2>
<table class="stats-table"><thead><tr><th>Column</th><th>Missing Count</th></tr></thead><tbody>{rows}</tbody></table>
</div>
"#
    )
}
fn insights_section(report: &AnalysisReport) -> String {
    let mut items = String::new();
    for insight in &report.insights {
        let column = esc(&insight.column);
        match &insight.profile {
            ColumnProfile::Numeric(p) => items.push_str(&format!(
                "<li><strong>{column}:</strong> Mean = {:.2}, Median = {:.2}, Range = {:.2} to {:.2}</li>",
                p.mean, p.median, p.min, p.max
            )),
            ColumnProfile::Categorical(p) => items.push_str(&format!(
                "<li><strong>{column}:</strong> {} unique values. Most common: {}</li>",
                p.unique_values,
                esc(&p.most_common)
            )),
            ColumnProfile::Complex(p) => items.push_str(&format!(
                "<li><strong>{column}:</strong> {} ({} samples)</li>",
                esc(&p.note),
                p.sample_count
            )),
        }
    }
    items.push_str(&format!(
        "<li><strong>Dataset:</strong> {} rows x {} columns. Missing data: {:.2}%</li>",
        report.overall.total_rows, report.overall.total_columns, report.overall.missing_percentage
    ));
    format!(
        r#"<div class="report-section">
<h2>Key Insights</h2>
<ul class="insights-list">{items}</ul>
</div>
"#
    )
}
fn charts_section(charts: &ChartSet) -> String {
    let mut inner = String::new();
    for (index, artifact) in charts.artifacts.iter().enumerate() {
        let title = esc(&chart_title(&artifact.name));
        let payload = BASE64.encode(&artifact.bytes);
        inner.push_str(&format!(
            r#"<div class="chart-container">
<h3>Chart {number}: {title}</h3>
<img src="data:{media};base64,{payload}" alt="{name}" class="chart-image">
</div>
"#,
            number = index + 1,
            media = artifact.media_type,
            name = esc(&artifact.name),
        ));
    }
    if !charts.skipped.is_empty() {
        inner.push_str(r#"<ul class="skipped-list">"#);
        for skip in &charts.skipped {
            inner.push_str(&format!(
                "<li>Skipped {}: {}</li>",
                esc(&skip.name),
                esc(&skip.reason)
            ));
        }
        inner.push_str("</ul>");
    }
    format!(
        r#"<div class="report-section">
<h2>Visualisations</h2>
{inner}</div>
"#
    )
}
fn chart_title(name: &str) -> String {
    let stem = name.trim_end_matches(".png").replace('_', " ");
    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => stem,
    }
}
const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    min-height: 100vh;
    padding: 20px;
    line-height: 1.6;
}
.container { max-width: 1400px; margin: 0 auto; }
.header {
    background: white;
    border-radius: 20px;
    padding: 40px;
    margin-bottom: 30px;
    box-shadow: 0 10px 40px rgba(0,0,0,0.1);
}
.header h1 {
    font-size: 2.8em;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    -webkit-background-clip: text;
    -webkit-text-fill-color: transparent;
    background-clip: text;
    margin-bottom: 10px;
    font-weight: 700;
}
.header p { color: #666; font-size: 1.1em; }
.data-source {
    background: white;
    padding: 20px;
    border-radius: 12px;
    margin-bottom: 30px;
    box-shadow: 0 4px 6px rgba(0,0,0,0.1);
    border-left: 5px solid #2196f3;
    word-break: break-all;
}
.data-source strong { color: #1976d2; font-size: 1.1em; }
.source-preview { font-family: monospace; font-size: 0.9em; }
.report-section {
    background: white;
    border-radius: 12px;
    padding: 30px;
    margin: 20px 0;
    box-shadow: 0 4px 6px rgba(0,0,0,0.1);
}
.report-section h2 {
    color: #333;
    border-bottom: 3px solid #667eea;
    padding-bottom: 15px;
    margin-bottom: 20px;
    font-size: 1.8em;
    font-weight: 600;
}
.stats-table { width: 100%; border-collapse: collapse; margin: 20px 0; }
.stats-table thead {
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: white;
}
.stats-table th { padding: 15px; text-align: left; font-weight: 600; }
.stats-table td { padding: 12px 15px; border-bottom: 1px solid #e0e0e0; }
.stats-table tbody tr:hover { background-color: #f5f7fa; }
.insights-list { list-style-type: none; padding: 0; }
.insights-list li {
    padding: 15px;
    margin: 12px 0;
    background: linear-gradient(135deg, #f8f9fa 0%, #e9ecef 100%);
    border-left: 5px solid #667eea;
    border-radius: 8px;
}
.skipped-list { list-style-type: none; padding: 0; color: #888; font-size: 0.9em; }
.skipped-list li { padding: 6px 0; }
.chart-container {
    background: white;
    border-radius: 12px;
    padding: 30px;
    margin: 25px 0;
    text-align: center;
}
.chart-container h3 { color: #333; margin-bottom: 20px; font-size: 1.4em; font-weight: 600; }
.chart-image {
    max-width: 100%;
    height: auto;
    border-radius: 8px;
    box-shadow: 0 4px 12px rgba(0,0,0,0.1);
}
.footer {
    background: white;
    border-radius: 12px;
    padding: 30px;
    margin-top: 30px;
    text-align: center;
    color: #666;
}
"#;
