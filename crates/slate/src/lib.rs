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

pub mod charts;
pub mod dataset;
pub mod error;
pub mod host;
pub mod insight;
pub mod loader;
pub mod report;
pub mod shim;
pub mod source;

pub use charts::{ChartArtifact, ChartConfig, ChartSet, ChartSynthesizer, SkippedChart};
pub use dataset::{CellValue, Column, ColumnKind, Dataset};
pub use error::{ChartError, HostError, LoadError, Result, SlateError};
pub use host::{DeployConfig, Deployer, Deployment, DeploymentPhase, ExecutionHost, SandboxHandle};
pub use insight::{analyze, AnalysisReport, ColumnInsight, ColumnProfile, OverallSummary};
pub use loader::{LoaderConfig, TabularLoader};
pub use report::{assemble, ReportDocument};
pub use shim::{Route, RouteResponse, ShimSpec};
pub use source::{resolve, ResolvedSource};

use tracing::info;

/// One invocation owns its dataset and report; nothing is shared across
/// concurrent requests.
pub struct AnalysisPipeline {
    loader: TabularLoader,
    synthesizer: ChartSynthesizer,
}
pub struct PipelineOutput {
    pub document: ReportDocument,
    pub analysis: AnalysisReport,
}
impl AnalysisPipeline {
    pub fn new() -> Self {
        Self {
            loader: TabularLoader::new(),
            synthesizer: ChartSynthesizer::new(),
        }
    }
    pub fn with_config(loader_config: LoaderConfig, chart_config: ChartConfig) -> Self {
        Self {
            loader: TabularLoader::with_config(loader_config),
            synthesizer: ChartSynthesizer::with_config(chart_config),
        }
    }
    pub fn run(&self, raw_input: &str) -> Result<PipelineOutput> {
        let source = source::resolve(raw_input);
        info!(kind = source.kind(), "input classified");
        let dataset = self.loader.load(source)?;
        let analysis = insight::analyze(&dataset);
        let charts = self.synthesizer.render(&dataset)?;
        let document = report::assemble(&analysis, &charts, raw_input.trim());
        info!(
            charts = charts.artifacts.len(),
            summary = %analysis.summary_line(),
            "report assembled"
        );
        Ok(PipelineOutput { document, analysis })
    }
}
impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}
