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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum SlateError {
    #[error("Data loading error: {0}")]
    Load(#[from] LoadError),
    #[error("Chart synthesis error: {0}")]
    Chart(#[from] ChartError),
    #[error("Execution host error: {0}")]
    Host(#[from] HostError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Dataset is empty")]
    EmptyDataset,
    #[error("Parsing failed: {reason}")]
    Parse { reason: String },
    #[error("Failed to read data file '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to fetch '{url}': {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Remote source '{url}' answered with status {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("HTTP client could not be initialised: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
}
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart scratch directory unavailable: {source}")]
    Scratch {
        #[source]
        source: std::io::Error,
    },
}
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Sandbox provisioning failed: {reason}")]
    Provision { reason: String },
    #[error("Upload of '{path}' failed: {reason}")]
    Upload { path: String, reason: String },
    #[error("Session could not be started: {reason}")]
    Session { reason: String },
    #[error("Command execution failed: {reason}")]
    Command { reason: String },
    #[error("No public address for the sandbox: {reason}")]
    Address { reason: String },
    #[error("Sandbox disposal failed: {reason}")]
    Dispose { reason: String },
    #[error("Readiness probe could not be initialised: {reason}")]
    Probe { reason: String },
}
pub type Result<T> = std::result::Result<T, SlateError>;
pub type LoadResult<T> = std::result::Result<T, LoadError>;
pub type HostResult<T> = std::result::Result<T, HostError>;
impl SlateError {
    pub fn is_user_visible(&self) -> bool {
        matches!(self, SlateError::Load(_) | SlateError::Host(_))
    }
    pub fn category(&self) -> &'static str {
        match self {
            SlateError::Load(_) => "Load",
            SlateError::Chart(_) => "Chart",
            SlateError::Host(_) => "Host",
            SlateError::Io(_) => "I/O",
        }
    }
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            SlateError::Load(LoadError::EmptyDataset) => vec![
                "Check that the data contains at least one row".to_string(),
                "Check that a header row is present".to_string(),
            ],
            SlateError::Load(LoadError::Parse { .. }) => vec![
                "Check that the data format is correct (CSV or JSON)".to_string(),
                "Check for malformed rows or unbalanced quotes".to_string(),
            ],
            SlateError::Load(LoadError::Fetch { .. })
            | SlateError::Load(LoadError::HttpStatus { .. }) => vec![
                "Check that the URL is accessible".to_string(),
                "Shared spreadsheets must be publicly viewable".to_string(),
            ],
            SlateError::Host(_) => vec![
                "Check the execution host credentials and connectivity".to_string(),
                "Retry the request; partially provisioned sandboxes are disposed".to_string(),
            ],
            _ => vec!["Check the error message for specific guidance".to_string()],
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            SlateError::Load(LoadError::EmptyDataset) => {
                "The dataset appears to be empty. Please provide data with at least one row."
                    .to_string()
            }
            SlateError::Load(_) => format!(
                "Could not load the data: {self}. Check the format, accessibility and emptiness of the source."
            ),
            SlateError::Host(_) => {
                "The report could not be published to an execution environment. Please try again."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}
