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

use crate::report::ReportDocument;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
pub const DEFAULT_PORT: u16 = 3000;
pub const PORT_ENV: &str = "PORT";
pub const DOCUMENT_FILE: &str = "report.html";
pub const ROUTES_FILE: &str = "routes.json";
pub const INTERPRETER_FILE: &str = "app.py";
/// Dependency install commands tried in order inside the sandbox; the
/// first one that succeeds wins.
pub const INSTALL_COMMANDS: [&str; 4] = [
    "python3 -m pip install --no-cache-dir flask",
    "python -m pip install --no-cache-dir flask",
    "pip3 install --no-cache-dir flask",
    "pip install --no-cache-dir flask",
];
pub const LAUNCH_COMMAND: &str = "python3 app.py || python app.py";
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteResponse {
    Document,
    Ok,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub path: String,
    pub method: String,
    pub response: RouteResponse,
}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimSpec {
    pub routes: Vec<Route>,
    pub default_port: u16,
    pub port_env: String,
}
#[derive(Debug, Clone)]
pub struct ShimFile {
    pub path: String,
    pub bytes: Vec<u8>,
}
impl ShimSpec {
    pub fn standard() -> Self {
        let route = |path: &str, response: RouteResponse| Route {
            path: path.to_string(),
            method: "GET".to_string(),
            response,
        };
        Self {
            routes: vec![
                route("/", RouteResponse::Document),
                route("/healthz", RouteResponse::Ok),
                route("/callback", RouteResponse::Ok),
            ],
            default_port: DEFAULT_PORT,
            port_env: PORT_ENV.to_string(),
        }
    }
    pub fn route_table_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
    /// The upload file set: the document, the declared route table, and a
    /// constant interpreter. User-controlled content never passes through
    /// source-code templating.
    pub fn bundle(&self, document_html: &str) -> serde_json::Result<Vec<ShimFile>> {
        Ok(vec![
            ShimFile {
                path: DOCUMENT_FILE.to_string(),
                bytes: document_html.as_bytes().to_vec(),
            },
            ShimFile {
                path: ROUTES_FILE.to_string(),
                bytes: self.route_table_json()?.into_bytes(),
            },
            ShimFile {
                path: INTERPRETER_FILE.to_string(),
                bytes: SHIM_INTERPRETER.as_bytes().to_vec(),
            },
        ])
    }
}
impl Default for ShimSpec {
    fn default() -> Self {
        Self::standard()
    }
}
/// Local embodiment of the shim: an axum router interpreting the same
/// route table the sandbox interpreter reads.
pub fn build_router(document: &ReportDocument) -> Router {
    let html = Arc::new(document.html.clone());
    let mut router = Router::new();
    for route in &document.shim.routes {
        router = match route.response {
            RouteResponse::Document => {
                let html = html.clone();
                router.route(
                    &route.path,
                    get(move || {
                        let html = html.clone();
                        async move { Html(html.as_ref().clone()) }
                    }),
                )
            }
            RouteResponse::Ok => router.route(&route.path, get(|| async { "ok" })),
        };
    }
    router
}
pub fn resolve_port() -> u16 {
    std::env::var(PORT_ENV)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}
const SHIM_INTERPRETER: &str = r#"from flask import Flask
import json
import os

app = Flask(__name__)

with open("report.html", "r", encoding="utf-8") as fh:
    DOCUMENT = fh.read()

with open("routes.json", "r", encoding="utf-8") as fh:
    ROUTES = json.load(fh)["routes"]


def make_handler(response):
    if response == "document":
        return lambda: DOCUMENT
    return lambda: ("ok", 200)


for route in ROUTES:
    app.add_url_rule(
        route["path"],
        endpoint=route["path"],
        view_func=make_handler(route["response"]),
        methods=[route["method"]],
    )

if __name__ == "__main__":
    port = int(os.environ.get("PORT", "3000"))
    app.run(host="0.0.0.0", port=port)
"#;
