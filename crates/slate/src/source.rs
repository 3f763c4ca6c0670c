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

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use url::Url;
static SHEET_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").expect("sheet id pattern"));
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSource {
    InlineDelimited(String),
    InlineStructured(String),
    LocalPath(PathBuf),
    RemoteLocator(String),
}
impl ResolvedSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolvedSource::InlineDelimited(_) => "inline-delimited",
            ResolvedSource::InlineStructured(_) => "inline-structured",
            ResolvedSource::LocalPath(_) => "local-path",
            ResolvedSource::RemoteLocator(_) => "remote-locator",
        }
    }
}
/// Classification order is load-bearing: delimited probe, structured
/// prefix, local file, then remote locator as the unconditional default.
pub fn resolve(raw: &str) -> ResolvedSource {
    let trimmed = raw.trim();
    if trimmed.contains(',') && trimmed.contains('\n') && !trimmed.starts_with("http") {
        if delimited_probe(trimmed) {
            return ResolvedSource::InlineDelimited(trimmed.to_string());
        }
    }
    if (trimmed.starts_with('{') || trimmed.starts_with('[')) && !trimmed.starts_with("http") {
        return ResolvedSource::InlineStructured(trimmed.to_string());
    }
    let path = Path::new(trimmed);
    if path.is_file() {
        return ResolvedSource::LocalPath(path.to_path_buf());
    }
    ResolvedSource::RemoteLocator(rewrite_sharing_link(trimmed))
}
fn delimited_probe(text: &str) -> bool {
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let header_len = match reader.headers() {
        Ok(headers) => headers.len(),
        Err(_) => return false,
    };
    if header_len < 2 {
        return false;
    }
    let mut rows = 0usize;
    for record in reader.records() {
        if record.is_err() {
            return false;
        }
        rows += 1;
    }
    rows >= 1
}
/// Rewrites a Google Sheets sharing link to its direct CSV export form,
/// keeping the `gid` tab selector (first tab when absent) and discarding
/// every other parameter. Unsupported providers pass through untouched.
pub fn rewrite_sharing_link(locator: &str) -> String {
    let Ok(parsed) = Url::parse(locator) else {
        return locator.to_string();
    };
    if parsed.host_str() != Some("docs.google.com") || !parsed.path().contains("/spreadsheets/") {
        return locator.to_string();
    }
    if locator.contains("/export?format=csv") {
        return locator.to_string();
    }
    let Some(captures) = SHEET_ID.captures(locator) else {
        return locator.to_string();
    };
    let sheet_id = &captures[1];
    let gid = locator
        .split_once("gid=")
        .map(|(_, rest)| rest.split(['&', '#']).next().unwrap_or("0"))
        .filter(|g| !g.is_empty())
        .unwrap_or("0");
    format!("https://docs.google.com/spreadsheets/d/{sheet_id}/export?format=csv&gid={gid}")
}
