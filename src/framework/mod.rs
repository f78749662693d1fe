//! Generic single-owner actor framework.
//!
//! This module provides the building blocks for running a piece of state
//! inside one Tokio task and talking to it through typed messages.
//!
//! # Main Components
//!
//! - [`ActorState`] - Trait that the owned state implements
//! - [`StateActor`] - Generic actor that owns the state and runs the message loop
//! - [`StateClient`] - Type-safe, cloneable handle for sending requests
//! - [`spawn_ticker`] - Periodic triggers delivered through the same channel
//! - [`FrameworkError`] - Transport errors
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning the real actor.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use self::core::*;
