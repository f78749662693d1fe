//! # Barista Queue
//!
//! Serves the café scheduler over HTTP.
//!
//! ```bash
//! RUST_LOG=info cargo run -- --port 8080 --baristas 3
//! ```
//!
//! The engine runs as a single actor; see [`barista_queue::lifecycle`] for how
//! it is started and stopped and [`barista_queue::http`] for the routes.

use barista_queue::clock::SystemClock;
use barista_queue::config::EngineConfig;
use barista_queue::http::{build_router, AppState};
use barista_queue::lifecycle::tracing::setup_tracing;
use barista_queue::lifecycle::CafeSystem;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "barista-queue")]
#[command(about = "Priority order queue and barista assignment engine")]
struct Args {
    /// Port for the HTTP API
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Number of baristas on the roster
    #[arg(long, default_value = "3")]
    baristas: u32,

    /// Seconds between full rescoring passes
    #[arg(long, default_value = "30")]
    rescore_secs: u64,

    /// Seconds between timeout & fairness sweeps
    #[arg(long, default_value = "5")]
    sweep_secs: u64,

    /// Seconds between automatic assignment cycles (off when absent)
    #[arg(long)]
    assign_secs: Option<u64>,

    /// Run an assignment cycle after every arrival, completion and unassignment
    #[arg(long)]
    auto_assign: bool,

    /// Log level used when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_baristas(self.baristas)
            .with_rescore_interval(Duration::from_secs(self.rescore_secs.max(1)))
            .with_sweep_interval(Duration::from_secs(self.sweep_secs.max(1)))
            .with_assign_interval(self.assign_secs.map(|s| Duration::from_secs(s.max(1))))
            .with_auto_assign(self.auto_assign)
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    setup_tracing(&args.log_level);

    let system = CafeSystem::new(args.engine_config(), Arc::new(SystemClock));
    let router = build_router(AppState::from_system(&system));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
    info!(%addr, "HTTP API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received shutdown signal");
        })
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    system.shutdown().await
}
