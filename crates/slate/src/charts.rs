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
use crate::error::ChartError;
use crate::insight::ranked_frequencies;
use itertools::{Itertools, MinMaxResult};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, warn};
pub const PNG_MEDIA_TYPE: &str = "image/png";
pub const CORRELATION_CHART: &str = "correlation.png";
const BAR_FILL: RGBColor = RGBColor(70, 130, 180);
#[derive(Debug, Clone)]
pub struct ChartArtifact {
    pub name: String,
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedChart {
    pub name: String,
    pub reason: String,
}
#[derive(Debug, Default)]
pub struct ChartSet {
    pub artifacts: Vec<ChartArtifact>,
    pub skipped: Vec<SkippedChart>,
}
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub max_histograms: usize,
    pub max_bar_charts: usize,
    pub histogram_bins: usize,
    pub bar_top_values: usize,
    pub width: u32,
    pub height: u32,
    pub heatmap_size: u32,
}
impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_histograms: 5,
            max_bar_charts: 3,
            histogram_bins: 30,
            bar_top_values: 10,
            width: 1000,
            height: 600,
            heatmap_size: 800,
        }
    }
}
#[derive(Debug, Default)]
pub struct ChartSynthesizer {
    config: ChartConfig,
}
impl ChartSynthesizer {
    pub fn new() -> Self {
        Self {
            config: ChartConfig::default(),
        }
    }
    pub fn with_config(config: ChartConfig) -> Self {
        Self { config }
    }
    /// Per-chart failures are recorded and skipped; only an unusable
    /// scratch directory aborts the batch. Artifacts are rendered without
    /// embedded text so rasterisation never depends on system font
    /// discovery; titles live in the report markup around each image.
    pub fn render(&self, dataset: &Dataset) -> Result<ChartSet, ChartError> {
        let scratch = TempDir::new().map_err(|source| ChartError::Scratch { source })?;
        let mut set = ChartSet::default();
        let numeric: Vec<&Column> = dataset
            .columns()
            .iter()
            .filter(|c| c.kind() == ColumnKind::Numeric)
            .collect();
        let categorical: Vec<&Column> = dataset
            .columns()
            .iter()
            .filter(|c| matches!(c.kind(), ColumnKind::Text | ColumnKind::Boolean))
            .collect();
        for (index, column) in numeric.iter().take(self.config.max_histograms).enumerate() {
            let name = format!("hist_{index}.png");
            let values = column.numeric_values();
            if values.is_empty() {
                set.record_skip(&name, column.name(), "no non-missing values");
                continue;
            }
            match self.draw_histogram(scratch.path(), &name, &values) {
                Ok(bytes) => set.push_artifact(name, bytes),
                Err(e) => set.record_skip(&name, column.name(), &e.to_string()),
            }
        }
        for (index, column) in categorical
            .iter()
            .take(self.config.max_bar_charts)
            .enumerate()
        {
            let name = format!("bar_{index}.png");
            match ranked_frequencies(column) {
                Err(reason) => {
                    set.record_skip(&name, column.name(), &reason.note());
                }
                Ok(ranked) => {
                    let top: Vec<(String, usize)> = ranked
                        .into_iter()
                        .take(self.config.bar_top_values)
                        .collect();
                    match self.draw_bar_chart(scratch.path(), &name, &top) {
                        Ok(bytes) => set.push_artifact(name, bytes),
                        Err(e) => {
                            set.record_skip(&name, column.name(), &e.to_string());
                        }
                    }
                }
            }
        }
        if numeric.len() >= 2 {
            let matrix = correlation_matrix(&numeric);
            match self.draw_heatmap(scratch.path(), CORRELATION_CHART, &matrix) {
                Ok(bytes) => set.push_artifact(CORRELATION_CHART.to_string(), bytes),
                Err(e) => {
                    set.record_skip(CORRELATION_CHART, "correlation", &e.to_string());
                }
            }
        }
        debug!(
            rendered = set.artifacts.len(),
            skipped = set.skipped.len(),
            "chart synthesis finished"
        );
        Ok(set)
    }
    fn draw_histogram(&self, dir: &Path, name: &str, values: &[f64]) -> anyhow::Result<Vec<u8>> {
        let (mut lo, mut hi) = match values.iter().copied().minmax() {
            MinMaxResult::NoElements => anyhow::bail!("no values"),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        if (hi - lo).abs() < f64::EPSILON {
            lo -= 0.5;
            hi += 0.5;
        }
        let bins = self.config.histogram_bins;
        let bin_width = (hi - lo) / bins as f64;
        let mut counts = vec![0usize; bins];
        for value in values {
            let index = (((value - lo) / bin_width) as usize).min(bins - 1);
            counts[index] += 1;
        }
        let max_count = counts.iter().copied().max().unwrap_or(1).max(1) as f64;
        let file = dir.join(name);
        {
            let root =
                BitMapBackend::new(&file, (self.config.width, self.config.height)).into_drawing_area();
            root.fill(&WHITE)?;
            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .build_cartesian_2d(lo..hi, 0f64..max_count * 1.05)?;
            chart.draw_series(counts.iter().enumerate().map(|(i, count)| {
                let x0 = lo + bin_width * i as f64;
                let x1 = x0 + bin_width;
                Rectangle::new([(x0, 0.0), (x1, *count as f64)], BAR_FILL.filled())
            }))?;
            chart.draw_series(counts.iter().enumerate().map(|(i, count)| {
                let x0 = lo + bin_width * i as f64;
                let x1 = x0 + bin_width;
                Rectangle::new([(x0, 0.0), (x1, *count as f64)], BLACK.stroke_width(1))
            }))?;
            root.present()?;
        }
        Ok(std::fs::read(&file)?)
    }
    fn draw_bar_chart(
        &self,
        dir: &Path,
        name: &str,
        ranked: &[(String, usize)],
    ) -> anyhow::Result<Vec<u8>> {
        if ranked.is_empty() {
            anyhow::bail!("no values to chart");
        }
        let max_count = ranked.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f64;
        let file = dir.join(name);
        {
            let root =
                BitMapBackend::new(&file, (self.config.width, self.config.height)).into_drawing_area();
            root.fill(&WHITE)?;
            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .build_cartesian_2d(0f64..ranked.len() as f64, 0f64..max_count * 1.05)?;
            chart.draw_series(ranked.iter().enumerate().map(|(i, (_, count))| {
                Rectangle::new(
                    [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *count as f64)],
                    BAR_FILL.filled(),
                )
            }))?;
            chart.draw_series(ranked.iter().enumerate().map(|(i, (_, count))| {
                Rectangle::new(
                    [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *count as f64)],
                    BLACK.stroke_width(1),
                )
            }))?;
            root.present()?;
        }
        Ok(std::fs::read(&file)?)
    }
    fn draw_heatmap(&self, dir: &Path, name: &str, matrix: &[Vec<f64>]) -> anyhow::Result<Vec<u8>> {
        let n = matrix.len();
        if n == 0 {
            anyhow::bail!("empty correlation matrix");
        }
        let file = dir.join(name);
        {
            let size = self.config.heatmap_size;
            let root = BitMapBackend::new(&file, (size, size)).into_drawing_area();
            root.fill(&WHITE)?;
            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .build_cartesian_2d(0f64..n as f64, 0f64..n as f64)?;
            chart.draw_series(matrix.iter().enumerate().flat_map(|(row, row_values)| {
                row_values.iter().enumerate().map(move |(col, value)| {
                    Rectangle::new(
                        [
                            (col as f64, (n - row - 1) as f64),
                            (col as f64 + 1.0, (n - row) as f64),
                        ],
                        heat_colour(*value).filled(),
                    )
                })
            }))?;
            chart.draw_series(matrix.iter().enumerate().flat_map(|(row, row_values)| {
                row_values.iter().enumerate().map(move |(col, _)| {
                    Rectangle::new(
                        [
                            (col as f64, (n - row - 1) as f64),
                            (col as f64 + 1.0, (n - row) as f64),
                        ],
                        WHITE.stroke_width(2),
                    )
                })
            }))?;
            root.present()?;
        }
        Ok(std::fs::read(&file)?)
    }
}
impl ChartSet {
    fn push_artifact(&mut self, name: String, bytes: Vec<u8>) {
        self.artifacts.push(ChartArtifact {
            name,
            bytes,
            media_type: PNG_MEDIA_TYPE,
        });
    }
    fn record_skip(&mut self, name: &str, column: &str, reason: &str) {
        warn!(%name, %column, %reason, "chart skipped");
        self.skipped.push(SkippedChart {
            name: name.to_string(),
            reason: format!("{column}: {reason}"),
        });
    }
}
/// Pairwise Pearson correlation over rows where both cells are present;
/// constant columns correlate as 0 off the diagonal.
pub fn correlation_matrix(columns: &[&Column]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            matrix[i][j] = if i == j {
                1.0
            } else {
                pearson(columns[i], columns[j])
            };
        }
    }
    matrix
}
fn pearson(a: &Column, b: &Column) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .cells()
        .iter()
        .zip(b.cells().iter())
        .filter_map(|(x, y)| {
            let x = x.as_ref().and_then(|v| v.as_f64())?;
            let y = y.as_ref().and_then(|v| v.as_f64())?;
            Some((x, y))
        })
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}
fn heat_colour(value: f64) -> RGBColor {
    let t = ((value + 1.0) / 2.0).clamp(0.0, 1.0);
    let blend = |a: f64, b: f64, f: f64| (a + (b - a) * f).round() as u8;
    if t < 0.5 {
        let f = t * 2.0;
        RGBColor(blend(59.0, 255.0, f), blend(76.0, 255.0, f), blend(192.0, 255.0, f))
    } else {
        let f = (t - 0.5) * 2.0;
        RGBColor(blend(255.0, 180.0, f), blend(255.0, 4.0, f), blend(255.0, 38.0, f))
    }
}
