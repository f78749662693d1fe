use crate::clients::{BaristaClient, OrderClient};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::engine::{Engine, EngineTimer};
use crate::framework::{spawn_ticker, StateActor};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The runtime orchestrator for the café scheduler.
///
/// `CafeSystem` is responsible for:
/// - **Lifecycle Management**: starting the engine actor and stopping it
/// - **Dependency Wiring**: injecting the clock as actor context
/// - **Periodic Work**: spawning the rescore, sweep and (optional) assignment tickers
///
/// # Example
///
/// ```ignore
/// let system = CafeSystem::new(EngineConfig::default(), Arc::new(SystemClock));
/// let submitted = system.order_client.submit(params).await?;
/// system.shutdown().await?;
/// ```
pub struct CafeSystem {
    /// Client for order submission, lookup and queue inspection
    pub order_client: OrderClient,

    /// Client for the roster, assignment and completion
    pub barista_client: BaristaClient,

    /// The engine actor task (used for graceful shutdown)
    actor: JoinHandle<Engine>,

    /// Ticker tasks; cancelled on shutdown
    tickers: Vec<JoinHandle<()>>,
}

impl CafeSystem {
    /// Creates the engine, starts its actor and tickers and returns the clients.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let engine = Engine::new(config.clone(), clock.now());
        let (actor, client) = StateActor::new(engine, config.channel_capacity);

        // The clock is injected at run time, not stored in the engine
        let actor = tokio::spawn(actor.run(clock));

        let mut tickers = vec![
            spawn_ticker(&client, EngineTimer::Rescore, config.rescore_interval),
            spawn_ticker(&client, EngineTimer::Sweep, config.sweep_interval),
        ];
        if let Some(period) = config.assign_interval {
            tickers.push(spawn_ticker(&client, EngineTimer::Assign, period));
        }

        info!(
            baristas = config.baristas,
            rescore_secs = config.rescore_interval.as_secs_f64(),
            sweep_secs = config.sweep_interval.as_secs_f64(),
            "Cafe system started"
        );

        Self {
            order_client: OrderClient::new(client.clone()),
            barista_client: BaristaClient::new(client),
            actor,
            tickers,
        }
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the clients closes the channel; the actor finishes whatever
    /// is queued and exits. Tickers only notice at their next tick, so they
    /// are cancelled once the actor is gone. Returns an error if any task
    /// panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.order_client);
        drop(self.barista_client);

        if let Err(e) = self.actor.await {
            error!("Engine task failed: {:?}", e);
            return Err(format!("Engine task failed: {:?}", e));
        }
        for ticker in self.tickers {
            ticker.abort();
            match ticker.await {
                Err(e) if e.is_panic() => {
                    error!("Ticker task failed: {:?}", e);
                    return Err(format!("Ticker task failed: {:?}", e));
                }
                _ => {}
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
