//! Type-safe wrappers around [`StateClient`](crate::framework::StateClient).
//!
//! The HTTP layer never builds engine requests itself; it calls these
//! clients, which unpack each reply into the type the caller expects.

pub mod actor_client;
pub mod barista_client;
pub mod order_client;

pub use actor_client::*;
pub use barista_client::*;
pub use order_client::*;
