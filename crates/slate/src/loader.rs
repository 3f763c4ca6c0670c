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

use crate::dataset::{CellValue, Column, Dataset};
use crate::error::{LoadError, LoadResult};
use crate::source::ResolvedSource;
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub fetch_timeout: Duration,
}
impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
        }
    }
}
#[derive(Debug, Default)]
pub struct TabularLoader {
    config: LoaderConfig,
}
impl TabularLoader {
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
        }
    }
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }
    pub fn load(&self, source: ResolvedSource) -> LoadResult<Dataset> {
        let dataset = match source {
            ResolvedSource::InlineDelimited(text) => parse_delimited(&text, "inline data")?,
            ResolvedSource::InlineStructured(text) => parse_structured(&text, "inline data")?,
            ResolvedSource::LocalPath(path) => self.load_path(&path)?,
            ResolvedSource::RemoteLocator(url) => self.fetch_remote(&url)?,
        };
        if dataset.row_count() == 0 {
            return Err(LoadError::EmptyDataset);
        }
        info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "dataset loaded"
        );
        Ok(dataset)
    }
    fn load_path(&self, path: &Path) -> LoadResult<Dataset> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::File {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset");
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => parse_delimited(&text, name),
            Some("json") => parse_structured(&text, name),
            _ => sniff_format(&text, name),
        }
    }
    fn fetch_remote(&self, url: &str) -> LoadResult<Dataset> {
        debug!(%url, "fetching remote source");
        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.fetch_timeout)
            .build()
            .map_err(|source| LoadError::Client { source })?;
        let response = client.get(url).send().map_err(|source| LoadError::Fetch {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        let body = response.text().map_err(|source| LoadError::Fetch {
            url: url.to_string(),
            source,
        })?;
        if content_type.contains("csv") || url.ends_with(".csv") || url.contains("format=csv") {
            parse_delimited(&body, url)
        } else if content_type.contains("json") || url.ends_with(".json") {
            parse_structured(&body, url)
        } else {
            sniff_format(&body, url)
        }
    }
}
/// Delimited first, structured as fallback; a 0-row delimited parse does
/// not count as a hit.
fn sniff_format(text: &str, name: &str) -> LoadResult<Dataset> {
    match parse_delimited(text, name) {
        Ok(dataset) if dataset.row_count() > 0 => Ok(dataset),
        _ => parse_structured(text, name),
    }
}
pub fn parse_delimited(text: &str, name: &str) -> LoadResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Parse {
            reason: format!("header row unreadable: {e}"),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(LoadError::Parse {
            reason: "no header row".to_string(),
        });
    }
    let mut cells: Vec<Vec<Option<CellValue>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::Parse {
            reason: format!("malformed delimited row: {e}"),
        })?;
        for (index, column) in cells.iter_mut().enumerate() {
            column.push(record.get(index).and_then(parse_scalar));
        }
    }
    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(header, column_cells)| Column::new(header, column_cells))
        .collect();
    Dataset::from_columns(name, columns)
}
fn parse_scalar(field: &str) -> Option<CellValue> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" | "null" | "na" => return None,
        "true" => return Some(CellValue::Bool(true)),
        "false" => return Some(CellValue::Bool(false)),
        _ => {}
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        if number.is_finite() {
            return Some(CellValue::Number(number));
        }
    }
    Some(CellValue::Text(trimmed.to_string()))
}
pub fn parse_structured(text: &str, name: &str) -> LoadResult<Dataset> {
    let value: JsonValue = serde_json::from_str(text).map_err(|e| LoadError::Parse {
        reason: format!("invalid structured document: {e}"),
    })?;
    dataset_from_json(value, name)
}
fn dataset_from_json(value: JsonValue, name: &str) -> LoadResult<Dataset> {
    match value {
        JsonValue::Array(items) => rows_from_records(items, name),
        JsonValue::Object(map) => {
            // First list-valued entry wins as the row source; a mapping
            // without any list becomes a single-row dataset.
            for (_, entry) in &map {
                if let JsonValue::Array(items) = entry {
                    return rows_from_records(items.clone(), name);
                }
            }
            rows_from_records(vec![JsonValue::Object(map)], name)
        }
        _ => Err(LoadError::Parse {
            reason: "top-level structured value is not tabular".to_string(),
        }),
    }
}
fn rows_from_records(items: Vec<JsonValue>, name: &str) -> LoadResult<Dataset> {
    if items.is_empty() {
        return Err(LoadError::EmptyDataset);
    }
    if items.iter().all(JsonValue::is_object) {
        let mut order: Vec<String> = Vec::new();
        for item in &items {
            if let JsonValue::Object(map) = item {
                for key in map.keys() {
                    if !order.iter().any(|k| k == key) {
                        order.push(key.clone());
                    }
                }
            }
        }
        let columns = order
            .into_iter()
            .map(|key| {
                let column_cells = items
                    .iter()
                    .map(|item| item.get(&key).and_then(json_cell))
                    .collect();
                Column::new(key, column_cells)
            })
            .collect();
        Dataset::from_columns(name, columns)
    } else {
        let column_cells = items.iter().map(json_cell).collect();
        Dataset::from_columns(name, vec![Column::new("value".to_string(), column_cells)])
    }
}
fn json_cell(value: &JsonValue) -> Option<CellValue> {
    match value {
        JsonValue::Null => None,
        JsonValue::Bool(b) => Some(CellValue::Bool(*b)),
        JsonValue::Number(n) => n.as_f64().map(CellValue::Number),
        JsonValue::String(s) => Some(CellValue::Text(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => Some(CellValue::Nested(value.clone())),
    }
}
