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

use crate::error::LoadError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Nested(JsonValue),
}
impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
    pub fn is_nested(&self) -> bool {
        matches!(self, CellValue::Nested(_))
    }
    pub fn render(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Nested(v) => v.to_string(),
        }
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    Nested,
}
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    cells: Vec<Option<CellValue>>,
}
impl Column {
    pub fn new(name: String, cells: Vec<Option<CellValue>>) -> Self {
        let kind = infer_kind(&cells);
        Self { name, kind, cells }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn cells(&self) -> &[Option<CellValue>] {
        &self.cells
    }
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }
    pub fn present_count(&self) -> usize {
        self.cells.len() - self.missing_count()
    }
    pub fn present_values(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.iter().filter_map(|c| c.as_ref())
    }
    pub fn numeric_values(&self) -> Vec<f64> {
        self.present_values().filter_map(CellValue::as_f64).collect()
    }
}
fn infer_kind(cells: &[Option<CellValue>]) -> ColumnKind {
    let mut first = None;
    let mut all_number = true;
    let mut all_bool = true;
    for value in cells.iter().filter_map(|c| c.as_ref()) {
        if first.is_none() {
            first = Some(value);
        }
        if !matches!(value, CellValue::Number(_)) {
            all_number = false;
        }
        if !matches!(value, CellValue::Bool(_)) {
            all_bool = false;
        }
    }
    match first {
        None => ColumnKind::Text,
        Some(CellValue::Nested(_)) => ColumnKind::Nested,
        Some(_) if all_number => ColumnKind::Numeric,
        Some(_) if all_bool => ColumnKind::Boolean,
        Some(_) => ColumnKind::Text,
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetId(String);
impl DatasetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
impl Default for DatasetId {
    fn default() -> Self {
        Self::new()
    }
}
impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub id: DatasetId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
    metadata: DatasetMetadata,
}
impl Dataset {
    pub fn from_columns(name: &str, columns: Vec<Column>) -> Result<Self, LoadError> {
        let row_count = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != row_count {
                return Err(LoadError::Parse {
                    reason: format!(
                        "column '{}' has {} cells, expected {row_count}",
                        column.name(),
                        column.len()
                    ),
                });
            }
            if !seen.insert(column.name().to_string()) {
                return Err(LoadError::Parse {
                    reason: format!("duplicate column name '{}'", column.name()),
                });
            }
        }
        Ok(Self {
            columns,
            row_count,
            metadata: DatasetMetadata {
                id: DatasetId::new(),
                name: name.to_string(),
                created_at: Utc::now(),
            },
        })
    }
    pub fn row_count(&self) -> usize {
        self.row_count
    }
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }
    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(Column::missing_count).sum()
    }
    pub fn to_delimited(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .map(|c| escape_field(c.name()))
            .collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for row in 0..self.row_count {
            let fields: Vec<String> = self
                .columns
                .iter()
                .map(|c| {
                    c.cells()[row]
                        .as_ref()
                        .map_or_else(String::new, |v| escape_field(&v.render()))
                })
                .collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }
}
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} rows x {} columns)",
            self.metadata.name,
            self.row_count,
            self.columns.len()
        )
    }
}
