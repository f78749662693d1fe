//! # Barista Queue
//!
//! > **A priority order queue for a café, run by a single actor.**
//!
//! Orders arrive, get a priority score, wait in a ranked queue and are handed
//! to baristas one at a time. A periodic rescoring pass lets long waits climb
//! the ranking; a periodic sweep times out orders that waited too long and
//! flags orders that keep getting skipped.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One owner, no locks
//! Order store, queue and barista pool belong to one [`Engine`](engine::Engine)
//! value, owned by one Tokio task. Client requests and timer ticks arrive on
//! the same channel and are handled one at a time, so an assignment never
//! races a rescoring pass and no two assignments can claim the same barista
//! or the same order.
//!
//! ### Ids, not references
//! The queue is an ordered index of `(score, arrival, id)` keys over an arena
//! of order records. Rescoring rebuilds the index; nothing ever holds a
//! reference into the arena across messages.
//!
//! ### Injected time
//! The engine asks a [`Clock`](clock::Clock) for the current instant, injected
//! as actor context. Tests drive a [`ManualClock`](clock::ManualClock) through
//! ten simulated minutes in microseconds.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Framework ([`framework`])
//! The generic single-owner actor: [`ActorState`](framework::ActorState),
//! [`StateActor`](framework::StateActor), [`StateClient`](framework::StateClient),
//! periodic tickers and the [`mock`](framework::mock) helpers for client tests.
//!
//! ### 2. The Engine ([`engine`])
//! The scheduler itself: order store, scorer, queue, barista pool, assignment
//! and the timeout & fairness monitor.
//!
//! ### 3. The Interface ([`clients`])
//! [`OrderClient`](clients::OrderClient) and [`BaristaClient`](clients::BaristaClient)
//! turn typed calls into engine requests and unpack the replies.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! [`CafeSystem`](lifecycle::CafeSystem) spawns the actor and its tickers and
//! shuts them down; [`lifecycle::tracing`] sets up logging.
//!
//! ### 5. The Surface ([`http`])
//! The axum router the web client talks to.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the API on port 8080
//! RUST_LOG=info cargo run -- --port 8080
//!
//! # Run the tests
//! cargo test
//! ```

pub mod clients;
pub mod clock;
pub mod config;
pub mod engine;
pub mod framework;
pub mod http;
pub mod lifecycle;
pub mod model;
