//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter. The
//! filter comes from `RUST_LOG` when set, otherwise from the given default
//! level (the binary's `--log-level`).
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: start, shutdown and how many requests were handled
//! - **State Changes** (info): submissions, assignments, completions, unassignments
//! - **Alerts** (warn): timeouts and fairness violations
//! - **Details** (debug): every request and tick, rescoring passes, swallowed
//!   assignment conflicts
//! - **HTTP**: one span per request from `tower_http::trace::TraceLayer`
//!
//! ## Usage Examples
//!
//! ```bash
//! # State changes and alerts
//! RUST_LOG=info cargo run
//!
//! # Every request and tick, with payloads
//! RUST_LOG=debug cargo run
//!
//! # Engine details only
//! RUST_LOG=barista_queue::engine=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a short session looks like:
//!
//! ```text
//! INFO Actor started state_type="Engine"
//! INFO Order submitted order_id=order_1 prep=4 score=8.33 position=1
//! INFO Order assigned barista_id=barista-1 order_id=order_1 skipped=0
//! INFO Order completed order_id=order_1 barista_id=barista-1
//! WARN Order timed out order_id=order_2
//! ```
use tracing_subscriber::EnvFilter;

pub fn setup_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // Fields carry order/barista ids; module paths add nothing
        .compact()
        .init();
}
