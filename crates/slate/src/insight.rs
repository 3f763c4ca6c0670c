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

use crate::dataset::{Column, ColumnKind, Dataset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
pub const TOP_VALUES: usize = 5;
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericProfile {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalProfile {
    pub unique_values: usize,
    pub top_values: Vec<(String, usize)>,
    pub most_common: String,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexProfile {
    pub sample_count: usize,
    pub note: String,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnProfile {
    Numeric(NumericProfile),
    Categorical(CategoricalProfile),
    Complex(ComplexProfile),
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInsight {
    pub column: String,
    pub profile: ColumnProfile,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallSummary {
    pub total_rows: usize,
    pub total_columns: usize,
    pub total_missing: usize,
    pub missing_percentage: f64,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
    pub missing_values: Vec<(String, usize)>,
    pub insights: Vec<ColumnInsight>,
    pub overall: OverallSummary,
}
impl AnalysisReport {
    pub fn summary_line(&self) -> String {
        format!(
            "{} rows x {} columns, {:.2}% missing",
            self.row_count, self.column_count, self.overall.missing_percentage
        )
    }
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    NestedValues { sample_count: usize },
    UnhashableValues { sample_count: usize },
    NoValues,
}
impl DegradeReason {
    pub fn note(&self) -> String {
        match self {
            DegradeReason::NestedValues { .. } => {
                "Contains nested data (mapping/sequence)".to_string()
            }
            DegradeReason::UnhashableValues { .. } => {
                "Cannot analyse: values are not comparable for counting".to_string()
            }
            DegradeReason::NoValues => "No non-missing values".to_string(),
        }
    }
    pub fn sample_count(&self) -> usize {
        match self {
            DegradeReason::NestedValues { sample_count }
            | DegradeReason::UnhashableValues { sample_count } => *sample_count,
            DegradeReason::NoValues => 0,
        }
    }
    fn into_profile(self) -> ColumnProfile {
        ColumnProfile::Complex(ComplexProfile {
            sample_count: self.sample_count(),
            note: self.note(),
        })
    }
}
/// Pure and deterministic: one profile per column in column order, the
/// overall summary last.
pub fn analyze(dataset: &Dataset) -> AnalysisReport {
    let insights = dataset
        .columns()
        .iter()
        .map(|column| ColumnInsight {
            column: column.name().to_string(),
            profile: profile_column(column),
        })
        .collect();
    let total_missing = dataset.total_missing();
    let total_cells = dataset.row_count() * dataset.column_count();
    let missing_percentage = if total_cells == 0 {
        0.0
    } else {
        total_missing as f64 / total_cells as f64 * 100.0
    };
    AnalysisReport {
        row_count: dataset.row_count(),
        column_count: dataset.column_count(),
        column_names: dataset
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        missing_values: dataset
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.missing_count()))
            .collect(),
        insights,
        overall: OverallSummary {
            total_rows: dataset.row_count(),
            total_columns: dataset.column_count(),
            total_missing,
            missing_percentage,
        },
    }
}
fn profile_column(column: &Column) -> ColumnProfile {
    match column.kind() {
        ColumnKind::Numeric => {
            let values = column.numeric_values();
            if values.is_empty() {
                DegradeReason::NoValues.into_profile()
            } else {
                ColumnProfile::Numeric(numeric_profile(&values))
            }
        }
        ColumnKind::Nested => DegradeReason::NestedValues {
            sample_count: column.present_count(),
        }
        .into_profile(),
        ColumnKind::Text | ColumnKind::Boolean => match ranked_frequencies(column) {
            Ok(ranked) => categorical_profile(ranked),
            Err(reason) => reason.into_profile(),
        },
    }
}
fn numeric_profile(values: &[f64]) -> NumericProfile {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite values"));
    let median = if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    };
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    NumericProfile {
        mean,
        median,
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        skewness: skewness(values, mean, std_dev),
    }
}
fn skewness(values: &[f64], mean: f64, std_dev: f64) -> f64 {
    let n = values.len() as f64;
    if values.len() < 3 || std_dev <= f64::EPSILON {
        return 0.0;
    }
    let third_moment = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    let g1 = third_moment / std_dev.powi(3);
    ((n * (n - 1.0)).sqrt() / (n - 2.0)) * g1
}
fn categorical_profile(ranked: Vec<(String, usize)>) -> ColumnProfile {
    let most_common = ranked
        .first()
        .map(|(value, _)| value.clone())
        .unwrap_or_default();
    ColumnProfile::Categorical(CategoricalProfile {
        unique_values: ranked.len(),
        most_common,
        top_values: ranked.into_iter().take(TOP_VALUES).collect(),
    })
}
/// Descending frequency, ties broken by first-encounter order. Columns
/// holding nested values degrade instead of propagating a failure.
pub(crate) fn ranked_frequencies(column: &Column) -> Result<Vec<(String, usize)>, DegradeReason> {
    let present_count = column.present_count();
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in column.present_values() {
        if value.is_nested() {
            return Err(DegradeReason::UnhashableValues {
                sample_count: present_count,
            });
        }
        let rendered = value.render();
        if !counts.contains_key(&rendered) {
            order.push(rendered.clone());
        }
        *counts.entry(rendered).or_insert(0) += 1;
    }
    if order.is_empty() {
        return Err(DegradeReason::NoValues);
    }
    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|value| {
            let count = counts[&value];
            (value, count)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ranked)
}
