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

use slate::charts::{ChartSet, ChartSynthesizer};
use slate::insight::analyze;
use slate::loader::parse_delimited;
use slate::report::assemble;

#[test]
fn test_report_embeds_charts_inline() {
    let dataset = parse_delimited("city,temp\nlondon,10\nparis,12\n", "t").expect("parse");
    let report = analyze(&dataset);
    let charts = ChartSynthesizer::new().render(&dataset).expect("render");
    let document = assemble(&report, &charts, "inline data");
    let embeds = document.html.matches("data:image/png;base64,").count();
    assert_eq!(embeds, charts.artifacts.len());
    assert!(embeds >= 2);
    assert!(!document.html.contains("src=\"http"));
}

#[test]
fn test_url_descriptor_renders_as_hyperlink() {
    let dataset = parse_delimited("a,b\n1,2\n", "t").expect("parse");
    let report = analyze(&dataset);
    let document = assemble(&report, &ChartSet::default(), "https://example.com/data.csv");
    assert!(document
        .html
        .contains(r#"<a href="https://example.com/data.csv""#));
}

#[test]
fn test_inline_descriptor_is_escaped_and_truncated() {
    let dataset = parse_delimited("a,b\n1,2\n", "t").expect("parse");
    let report = analyze(&dataset);
    let descriptor = format!("<script>alert(1)</script>{}", "x".repeat(200));
    let document = assemble(&report, &ChartSet::default(), &descriptor);
    assert!(!document.html.contains("<script>alert"));
    assert!(document.html.contains("&lt;script&gt;"));
    assert!(document.html.contains("..."));
}

#[test]
fn test_statistics_table_lists_numeric_columns_only() {
    let dataset = parse_delimited("name,score\nalpha,1\nbeta,3\n", "t").expect("parse");
    let report = analyze(&dataset);
    let document = assemble(&report, &ChartSet::default(), "inline data");
    assert!(document.html.contains("Summary Statistics"));
    assert!(document.html.contains("<strong>score</strong>"));
    assert!(!document.html.contains("<td><strong>name</strong></td><td>"));
}

#[test]
fn test_missing_values_section_only_when_present() {
    let complete = parse_delimited("a,b\n1,2\n", "t").expect("parse");
    let document = assemble(&analyze(&complete), &ChartSet::default(), "inline data");
    assert!(!document.html.contains("Missing Values"));
    let sparse = parse_delimited("a,b\n1,\n", "t").expect("parse");
    let document = assemble(&analyze(&sparse), &ChartSet::default(), "inline data");
    assert!(document.html.contains("Missing Values"));
    assert!(document.html.contains("<strong>b</strong>"));
}

#[test]
fn test_overall_summary_renders_last_insight() {
    let dataset = parse_delimited("a,b\n1,2\n", "t").expect("parse");
    let document = assemble(&analyze(&dataset), &ChartSet::default(), "inline data");
    let dataset_pos = document.html.find("<strong>Dataset:</strong>").expect("overall");
    let a_pos = document.html.find("<strong>a:</strong>").expect("column a");
    assert!(dataset_pos > a_pos);
}

#[test]
fn test_skipped_charts_are_noted() {
    let dataset = parse_delimited("a,b\n1,2\n", "t").expect("parse");
    let mut charts = ChartSet::default();
    charts.skipped.push(slate::SkippedChart {
        name: "bar_0.png".to_string(),
        reason: "no non-missing values".to_string(),
    });
    let document = assemble(&analyze(&dataset), &charts, "inline data");
    assert!(document.html.contains("Skipped bar_0.png"));
}
