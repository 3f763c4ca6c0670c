// SPDX-License-Identifier: AGPL-3.0-only
// Minimal bootstrap; the pipeline and serving logic live in the library.
use anyhow::Result;
use clap::{Parser, Subcommand};
use slate::{shim, AnalysisPipeline, PipelineOutput};
use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug, Clone)]
#[command(name = "slate-service", about = "Tabular analysis and report synthesis runtime")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Analyse the input and write the assembled report to a file.
    Analyze {
        /// Inline CSV/JSON text, a file path, or a URL; '-' reads stdin.
        input: String,
        #[arg(long, default_value = "report.html")]
        out: PathBuf,
    },
    /// Analyse the input and serve the report locally per the shim route table.
    Serve {
        /// Inline CSV/JSON text, a file path, or a URL; '-' reads stdin.
        input: String,
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Analyze { input, out } => analyze(input, out).await,
        Command::Serve { input, addr } => serve(input, addr).await,
    }
}

fn read_input(input: String) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(input)
    }
}

async fn run_pipeline(input: String) -> Result<PipelineOutput> {
    let raw = read_input(input)?;
    tokio::task::spawn_blocking(move || AnalysisPipeline::new().run(&raw))
        .await?
        .map_err(|e| anyhow::anyhow!(e.user_message()))
}

async fn analyze(input: String, out: PathBuf) -> Result<()> {
    let output = run_pipeline(input).await?;
    std::fs::write(&out, &output.document.html)?;
    println!("{}", output.analysis.summary_line());
    println!("Report written to {}", out.display());
    Ok(())
}

async fn serve(input: String, addr: Option<String>) -> Result<()> {
    let output = run_pipeline(input).await?;
    let app = shim::build_router(&output.document);
    let addr: SocketAddr = addr
        .or_else(|| std::env::var("SLATE_HTTP_ADDR").ok())
        .unwrap_or_else(|| format!("0.0.0.0:{}", shim::resolve_port()))
        .parse()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            warn!(error = %e, %addr, "bind failed, using ephemeral");
            tokio::net::TcpListener::bind("127.0.0.1:0").await?
        }
    };
    let local = listener.local_addr()?;
    info!(%local, "report available");
    println!("Serving report at http://{local}/");
    tokio::select! { _ = axum::serve(listener, app) => {} _ = tokio::signal::ctrl_c() => {} }
    info!("slate-service shutting down");
    Ok(())
}
