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

use crate::error::{HostError, HostResult};
use crate::report::ReportDocument;
use crate::shim;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxHandle {
    pub id: String,
}
/// The isolated-environment collaborator. Implementations are external;
/// the pipeline only depends on this surface.
#[async_trait]
pub trait ExecutionHost: Send + Sync {
    async fn provision(&self) -> HostResult<SandboxHandle>;
    async fn upload(&self, handle: &SandboxHandle, path: &str, bytes: &[u8]) -> HostResult<()>;
    async fn start_session(&self, handle: &SandboxHandle, session_id: &str) -> HostResult<()>;
    async fn run(
        &self,
        handle: &SandboxHandle,
        session_id: &str,
        command: &str,
        detached: bool,
    ) -> HostResult<()>;
    async fn public_address(&self, handle: &SandboxHandle, port: u16) -> HostResult<String>;
    async fn dispose(&self, handle: SandboxHandle) -> HostResult<()>;
}
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentPhase {
    Provisioning,
    Uploading,
    Starting,
    Polling { attempt: u32 },
    Ready,
    TimedOutButAddressable,
}
#[derive(Debug, Clone)]
pub struct Deployment {
    pub sandbox_id: String,
    pub url: String,
    pub ready: bool,
    pub phase: DeploymentPhase,
}
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
}
impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            poll_attempts: 45,
            poll_interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(2),
        }
    }
}
#[derive(Debug, Default)]
pub struct Deployer {
    config: DeployConfig,
}
impl Deployer {
    pub fn new() -> Self {
        Self {
            config: DeployConfig::default(),
        }
    }
    pub fn with_config(config: DeployConfig) -> Self {
        Self { config }
    }
    /// Provision -> upload -> start -> poll. The sandbox is disposed on
    /// every failure path after provisioning; a timed-out deployment is
    /// not a failure and keeps its address.
    pub async fn publish<H: ExecutionHost + ?Sized>(
        &self,
        host: &H,
        document: &ReportDocument,
    ) -> HostResult<Deployment> {
        debug!(phase = ?DeploymentPhase::Provisioning, "deployment started");
        let handle = host.provision().await?;
        match self.publish_held(host, &handle, document).await {
            Ok(deployment) => {
                info!(
                    sandbox = %deployment.sandbox_id,
                    url = %deployment.url,
                    ready = deployment.ready,
                    "report published"
                );
                Ok(deployment)
            }
            Err(error) => {
                warn!(sandbox = %handle.id, %error, "deployment failed, disposing sandbox");
                if let Err(dispose_error) = host.dispose(handle).await {
                    warn!(%dispose_error, "sandbox disposal failed");
                }
                Err(error)
            }
        }
    }
    async fn publish_held<H: ExecutionHost + ?Sized>(
        &self,
        host: &H,
        handle: &SandboxHandle,
        document: &ReportDocument,
    ) -> HostResult<Deployment> {
        debug!(phase = ?DeploymentPhase::Uploading, sandbox = %handle.id, "uploading shim bundle");
        let bundle = document
            .shim
            .bundle(&document.html)
            .map_err(|e| HostError::Upload {
                path: shim::ROUTES_FILE.to_string(),
                reason: e.to_string(),
            })?;
        for file in &bundle {
            host.upload(handle, &file.path, &file.bytes).await?;
        }
        debug!(phase = ?DeploymentPhase::Starting, sandbox = %handle.id, "starting shim");
        let session_id = format!("slate-report-{}", Uuid::new_v4());
        host.start_session(handle, &session_id).await?;
        let mut installed = false;
        for command in shim::INSTALL_COMMANDS {
            if host.run(handle, &session_id, command, false).await.is_ok() {
                installed = true;
                break;
            }
        }
        if !installed {
            return Err(HostError::Command {
                reason: "runtime dependencies could not be installed".to_string(),
            });
        }
        host.run(handle, &session_id, shim::LAUNCH_COMMAND, true)
            .await?;
        let url = host
            .public_address(handle, document.shim.default_port)
            .await?;
        let ready = self.await_ready(&url).await?;
        let phase = if ready {
            DeploymentPhase::Ready
        } else {
            DeploymentPhase::TimedOutButAddressable
        };
        Ok(Deployment {
            sandbox_id: handle.id.clone(),
            url,
            ready,
            phase,
        })
    }
    async fn await_ready(&self, url: &str) -> HostResult<bool> {
        let client = reqwest::Client::builder()
            .timeout(self.config.probe_timeout)
            .build()
            .map_err(|e| HostError::Probe {
                reason: e.to_string(),
            })?;
        let probe = format!("{}/callback", url.trim_end_matches('/'));
        for attempt in 1..=self.config.poll_attempts {
            debug!(phase = ?DeploymentPhase::Polling { attempt }, "readiness probe");
            if let Ok(response) = client.get(&probe).send().await {
                if response.status().is_success() {
                    return Ok(true);
                }
            }
            sleep(self.config.poll_interval).await;
        }
        Ok(false)
    }
}
