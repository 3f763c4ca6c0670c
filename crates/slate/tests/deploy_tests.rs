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

use async_trait::async_trait;
use slate::error::HostError;
use slate::host::{
    DeployConfig, Deployer, DeploymentPhase, ExecutionHost, SandboxHandle,
};
use slate::report::ReportDocument;
use slate::shim::{build_router, ShimSpec};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct MockHost {
    fail_address: bool,
    address: Mutex<Option<String>>,
    uploads: Mutex<Vec<String>>,
    commands: Mutex<Vec<String>>,
    disposed: AtomicBool,
}

#[async_trait]
impl ExecutionHost for MockHost {
    async fn provision(&self) -> Result<SandboxHandle, HostError> {
        Ok(SandboxHandle {
            id: "sandbox-1".to_string(),
        })
    }
    async fn upload(
        &self,
        _handle: &SandboxHandle,
        path: &str,
        _bytes: &[u8],
    ) -> Result<(), HostError> {
        self.uploads.lock().expect("lock").push(path.to_string());
        Ok(())
    }
    async fn start_session(
        &self,
        _handle: &SandboxHandle,
        _session_id: &str,
    ) -> Result<(), HostError> {
        Ok(())
    }
    async fn run(
        &self,
        _handle: &SandboxHandle,
        _session_id: &str,
        command: &str,
        _detached: bool,
    ) -> Result<(), HostError> {
        self.commands.lock().expect("lock").push(command.to_string());
        Ok(())
    }
    async fn public_address(
        &self,
        _handle: &SandboxHandle,
        _port: u16,
    ) -> Result<String, HostError> {
        if self.fail_address {
            return Err(HostError::Address {
                reason: "no preview link".to_string(),
            });
        }
        Ok(self
            .address
            .lock()
            .expect("lock")
            .clone()
            .unwrap_or_else(|| "http://127.0.0.1:9".to_string()))
    }
    async fn dispose(&self, _handle: SandboxHandle) -> Result<(), HostError> {
        self.disposed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn document() -> ReportDocument {
    ReportDocument {
        html: "<html><body>report</body></html>".to_string(),
        shim: ShimSpec::standard(),
    }
}

fn fast_deployer() -> Deployer {
    Deployer::with_config(DeployConfig {
        poll_attempts: 2,
        poll_interval: Duration::from_millis(10),
        probe_timeout: Duration::from_millis(200),
    })
}

#[tokio::test]
async fn test_publish_uploads_bundle_and_launches_shim() {
    let host = MockHost::default();
    let deployment = fast_deployer()
        .publish(&host, &document())
        .await
        .expect("publish");
    assert_eq!(deployment.sandbox_id, "sandbox-1");
    let uploads = host.uploads.lock().expect("lock").clone();
    assert_eq!(uploads, vec!["report.html", "routes.json", "app.py"]);
    let commands = host.commands.lock().expect("lock").clone();
    assert!(commands.first().expect("install command").contains("pip"));
    assert!(commands.last().expect("launch command").contains("app.py"));
    assert!(!host.disposed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_unreachable_shim_is_addressable_but_not_ready() {
    let host = MockHost::default();
    let deployment = fast_deployer()
        .publish(&host, &document())
        .await
        .expect("publish");
    assert!(!deployment.ready);
    assert_eq!(deployment.phase, DeploymentPhase::TimedOutButAddressable);
    assert_eq!(deployment.url, "http://127.0.0.1:9");
    assert!(!host.disposed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_reachable_shim_reports_ready() {
    let doc = document();
    let app = build_router(&doc);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    let host = MockHost {
        address: Mutex::new(Some(format!("http://{addr}"))),
        ..MockHost::default()
    };
    let deployment = fast_deployer().publish(&host, &doc).await.expect("publish");
    assert!(deployment.ready);
    assert_eq!(deployment.phase, DeploymentPhase::Ready);
    server.abort();
}

#[tokio::test]
async fn test_failed_deployment_disposes_sandbox() {
    let host = MockHost {
        fail_address: true,
        ..MockHost::default()
    };
    let result = fast_deployer().publish(&host, &document()).await;
    assert!(matches!(result, Err(HostError::Address { .. })));
    assert!(host.disposed.load(Ordering::SeqCst));
}
