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

use slate::source::{resolve, rewrite_sharing_link, ResolvedSource};
use std::io::Write;

#[test]
fn test_inline_delimited_classification() {
    let input = "Product,Sales\nLaptop,1500\nPhone,2000\n";
    match resolve(input) {
        ResolvedSource::InlineDelimited(text) => assert_eq!(text, input.trim()),
        other => panic!("expected inline delimited, got {other:?}"),
    }
}

#[test]
fn test_delimited_probe_falls_through_on_ragged_rows() {
    let input = "a,b\n1,2,3\n";
    assert!(matches!(resolve(input), ResolvedSource::RemoteLocator(_)));
}

#[test]
fn test_text_without_commas_is_remote_locator() {
    assert!(matches!(
        resolve("not data"),
        ResolvedSource::RemoteLocator(_)
    ));
}

#[test]
fn test_url_is_never_probed_as_inline_text() {
    let with_commas = "http://example.com/a,b\nc,d";
    assert!(matches!(
        resolve(with_commas),
        ResolvedSource::RemoteLocator(_)
    ));
    let with_brace = "https://example.com/{path}";
    assert!(matches!(
        resolve(with_brace),
        ResolvedSource::RemoteLocator(_)
    ));
}

#[test]
fn test_structured_prefix_classification() {
    assert!(matches!(
        resolve(r#"{"a": 1, "b": 2}"#),
        ResolvedSource::InlineStructured(_)
    ));
    assert!(matches!(
        resolve("[1, 2, 3]"),
        ResolvedSource::InlineStructured(_)
    ));
}

#[test]
fn test_existing_file_is_local_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "a,b").expect("write");
    let path = file.path().to_string_lossy().to_string();
    match resolve(&path) {
        ResolvedSource::LocalPath(resolved) => assert_eq!(resolved, file.path()),
        other => panic!("expected local path, got {other:?}"),
    }
}

#[test]
fn test_sheets_link_rewrite_preserves_id_and_gid() {
    let link = "https://docs.google.com/spreadsheets/d/AbC-123_xyz/edit?usp=sharing#gid=42";
    assert_eq!(
        rewrite_sharing_link(link),
        "https://docs.google.com/spreadsheets/d/AbC-123_xyz/export?format=csv&gid=42"
    );
}

#[test]
fn test_sheets_link_rewrite_defaults_to_first_tab() {
    let link = "https://docs.google.com/spreadsheets/d/AbC123/edit?usp=sharing";
    assert_eq!(
        rewrite_sharing_link(link),
        "https://docs.google.com/spreadsheets/d/AbC123/export?format=csv&gid=0"
    );
}

#[test]
fn test_sheets_export_link_passes_through() {
    let link = "https://docs.google.com/spreadsheets/d/AbC123/export?format=csv&gid=7";
    assert_eq!(rewrite_sharing_link(link), link);
}

#[test]
fn test_other_providers_pass_through() {
    let link = "https://example.com/sheets/d/AbC123/edit";
    assert_eq!(rewrite_sharing_link(link), link);
    assert!(matches!(resolve(link), ResolvedSource::RemoteLocator(url) if url == link));
}
