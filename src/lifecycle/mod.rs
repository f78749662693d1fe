//! # System Lifecycle & Orchestration
//!
//! Starting the café means spawning one engine actor, its periodic tickers
//! and handing out clients; stopping it means dropping the clients and
//! waiting for the actor to drain.
//!
//! ```rust,ignore
//! let system = CafeSystem::new(EngineConfig::default(), Arc::new(SystemClock));
//! let submitted = system.order_client.submit(params).await?;
//! system.barista_client.assign_next().await?;
//! system.shutdown().await?;
//! ```

pub mod cafe_system;
pub mod tracing;

pub use cafe_system::*;
