//! # Core Actor Framework
//!
//! This module defines the generic building blocks for the scheduler actor.
//!
//! ## Key Types
//!
//! - [`ActorState`]: The trait the owned state must implement.
//! - [`StateActor`]: The generic actor that owns the state and processes messages.
//! - [`StateClient`]: The generic client for communicating with the actor.
//! - [`FrameworkError`]: Transport errors (actor closed, reply dropped).

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any state must implement to be owned by a [`StateActor`].
///
/// # Architecture Note
/// The actor owns exactly one value implementing this trait. Every read and
/// every mutation reaches it through [`ActorState::handle`] or
/// [`ActorState::on_tick`], one message at a time, so the state itself needs
/// no interior locking.
///
/// We use associated types to keep the message protocol type-safe: a client
/// for `Engine` can only send `Engine::Request` values and only receives
/// `Engine::Response` values.
///
/// # Context
/// `Context` is injected into every hook when the loop starts (`run(ctx)`),
/// not at construction time. This keeps external dependencies (clocks,
/// other clients) out of the state value itself.
#[async_trait]
pub trait ActorState: Send + 'static {
    /// Request enum accepted by the actor.
    type Request: Send + Debug;

    /// Response enum returned for successful requests.
    type Response: Send + Debug;

    /// Periodic trigger identifiers (e.g. `Rescore`, `Sweep`).
    type Timer: Send + Sync + Copy + Debug + 'static;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// Error returned by `handle`. Must absorb transport failures so clients
    /// see a single error type.
    type Error: std::error::Error + From<FrameworkError> + Send + Sync + 'static;

    /// Handle one request.
    async fn handle(
        &mut self,
        request: Self::Request,
        ctx: &Self::Context,
    ) -> Result<Self::Response, Self::Error>;

    /// Called when a periodic timer fires. The default does nothing.
    async fn on_tick(&mut self, _timer: Self::Timer, _ctx: &Self::Context) {}

    /// Called once before the first message is processed.
    async fn on_start(&mut self, _ctx: &Self::Context) {}
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the actor framework itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
}

/// Type alias for the one-shot response channel used by the actor.
pub type Response<S> =
    oneshot::Sender<Result<<S as ActorState>::Response, <S as ActorState>::Error>>;

/// Message delivered to the actor.
///
/// Requests come from clients; ticks come from the periodic ticker tasks.
/// Both travel over the same channel, so a tick can never interleave with a
/// request that is already being handled.
#[derive(Debug)]
pub enum Envelope<S: ActorState> {
    Request {
        request: S::Request,
        respond_to: Response<S>,
    },
    Tick(S::Timer),
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The generic actor that owns a state value.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the state and the
/// receiver end of the channel and processes messages sequentially in a loop.
pub struct StateActor<S: ActorState> {
    receiver: mpsc::Receiver<Envelope<S>>,
    state: S,
}

impl<S: ActorState> StateActor<S> {
    /// Creates a new `StateActor` and its associated `StateClient`.
    ///
    /// `buffer_size` is the capacity of the MPSC channel. If the channel is
    /// full, client calls wait until there is space.
    pub fn new(state: S, buffer_size: usize) -> (Self, StateClient<S>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self { receiver, state };
        (actor, StateClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until every client
    /// handle has been dropped. Returns the final state.
    pub async fn run(mut self, context: S::Context) -> S {
        // Extract just the type name (e.g., "Engine" instead of "barista_queue::engine::Engine")
        let state_type = std::any::type_name::<S>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(state_type, "Actor started");
        self.state.on_start(&context).await;

        let mut handled: u64 = 0;
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                Envelope::Request {
                    request,
                    respond_to,
                } => {
                    debug!(state_type, ?request, "Request");
                    let result = self.state.handle(request, &context).await;
                    if let Err(e) = &result {
                        debug!(state_type, error = %e, "Request failed");
                    }
                    if respond_to.send(result).is_err() {
                        warn!(state_type, "Caller went away before the reply");
                    }
                    handled += 1;
                }
                Envelope::Tick(timer) => {
                    debug!(state_type, ?timer, "Tick");
                    self.state.on_tick(timer, &context).await;
                }
            }
        }

        info!(state_type, handled, "Shutdown");
        self.state
    }
}

/// Spawns a task that delivers `Tick(timer)` to the actor every `period`.
///
/// The ticker holds only a weak sender, so it never keeps the actor alive:
/// once all clients are dropped the next upgrade fails and the task exits.
pub fn spawn_ticker<S: ActorState>(
    client: &StateClient<S>,
    timer: S::Timer,
    period: Duration,
) -> JoinHandle<()> {
    let weak = client.sender.downgrade();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(sender) = weak.upgrade() else {
                break;
            };
            if sender.send(Envelope::Tick(timer)).await.is_err() {
                break;
            }
        }
        debug!(?timer, "Ticker stopped");
    })
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a `StateActor`.
///
/// Cheap to clone: it holds only the channel sender.
pub struct StateClient<S: ActorState> {
    sender: mpsc::Sender<Envelope<S>>,
}

impl<S: ActorState> Clone for StateClient<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: ActorState> StateClient<S> {
    pub fn new(sender: mpsc::Sender<Envelope<S>>) -> Self {
        Self { sender }
    }

    /// Sends a request and waits for the actor's reply.
    pub async fn call(&self, request: S::Request) -> Result<S::Response, S::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(Envelope::Request {
                request,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Delivers a timer tick out of band (used by tests and manual triggers).
    pub async fn tick(&self, timer: S::Timer) -> Result<(), FrameworkError> {
        self.sender
            .send(Envelope::Tick(timer))
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
