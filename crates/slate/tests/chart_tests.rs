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

use slate::charts::{ChartSynthesizer, CORRELATION_CHART};
use slate::loader::{parse_delimited, parse_structured};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[test]
fn test_histogram_and_bar_artifacts() {
    let dataset = parse_delimited(
        "city,temp\nlondon,10\nparis,12\nlondon,11\noslo,3\n",
        "t",
    )
    .expect("parse");
    let set = ChartSynthesizer::new().render(&dataset).expect("render");
    let names: Vec<&str> = set.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert!(names.contains(&"hist_0.png"));
    assert!(names.contains(&"bar_0.png"));
    for artifact in &set.artifacts {
        assert_eq!(artifact.media_type, "image/png");
        assert_eq!(&artifact.bytes[..8], PNG_MAGIC.as_slice());
    }
}

#[test]
fn test_no_chartable_columns_yields_empty_set() {
    let dataset = parse_structured(
        r#"[{"meta": {"k": 1}}, {"meta": {"k": 2}}]"#,
        "t",
    )
    .expect("parse");
    let set = ChartSynthesizer::new().render(&dataset).expect("render");
    assert!(set.artifacts.is_empty());
}

#[test]
fn test_nested_column_gets_no_bar_chart() {
    let dataset = parse_structured(
        r#"[{"meta": {"k": 1}, "v": 1}, {"meta": {"k": 2}, "v": 2}]"#,
        "t",
    )
    .expect("parse");
    let set = ChartSynthesizer::new().render(&dataset).expect("render");
    assert!(set
        .artifacts
        .iter()
        .all(|a| !a.name.starts_with("bar_")));
    assert!(set.artifacts.iter().any(|a| a.name == "hist_0.png"));
}

#[test]
fn test_two_numeric_columns_yield_one_correlation_chart() {
    let dataset = parse_delimited("x,y\n1,2\n2,4\n3,6\n", "t").expect("parse");
    let set = ChartSynthesizer::new().render(&dataset).expect("render");
    let correlations = set
        .artifacts
        .iter()
        .filter(|a| a.name == CORRELATION_CHART)
        .count();
    assert_eq!(correlations, 1);
}

#[test]
fn test_single_numeric_column_has_no_correlation_chart() {
    let dataset = parse_delimited("x\n1\n2\n3\n", "t").expect("parse");
    let set = ChartSynthesizer::new().render(&dataset).expect("render");
    assert!(set.artifacts.iter().all(|a| a.name != CORRELATION_CHART));
}

#[test]
fn test_histogram_limit_is_five() {
    let header = "a,b,c,d,e,f,g";
    let row = "1,2,3,4,5,6,7";
    let dataset =
        parse_delimited(&format!("{header}\n{row}\n{row}\n"), "t").expect("parse");
    let set = ChartSynthesizer::new().render(&dataset).expect("render");
    let histograms = set
        .artifacts
        .iter()
        .filter(|a| a.name.starts_with("hist_"))
        .count();
    assert_eq!(histograms, 5);
}

#[test]
fn test_artifact_names_are_deterministic() {
    let text = "city,temp\nlondon,10\nparis,12\n";
    let dataset = parse_delimited(text, "t").expect("parse");
    let synthesizer = ChartSynthesizer::new();
    let first: Vec<String> = synthesizer
        .render(&dataset)
        .expect("render")
        .artifacts
        .into_iter()
        .map(|a| a.name)
        .collect();
    let second: Vec<String> = synthesizer
        .render(&dataset)
        .expect("render")
        .artifacts
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_constant_column_histogram_still_renders() {
    let dataset = parse_delimited("v\n5\n5\n5\n", "t").expect("parse");
    let set = ChartSynthesizer::new().render(&dataset).expect("render");
    assert!(set.artifacts.iter().any(|a| a.name == "hist_0.png"));
}
