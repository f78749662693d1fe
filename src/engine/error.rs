//! Error types for the scheduling engine.

use crate::framework::FrameworkError;
use crate::model::{AlertId, BaristaId, OrderId, OrderStatus};
use thiserror::Error;

/// State conflicts: the request was well-formed but the current state of a
/// barista or order does not allow it.
///
/// During automatic assignment these are benign races and get swallowed;
/// on a direct call they go back to the caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConflictError {
    /// The barista already holds an order.
    #[error("{barista} is busy with {current}")]
    AlreadyBusy { barista: BaristaId, current: OrderId },

    /// The order already has a barista.
    #[error("{order} is already assigned to {barista}")]
    OrderAlreadyAssigned { order: OrderId, barista: BaristaId },

    /// The barista has nothing to complete or unassign.
    #[error("{barista} has no active order")]
    NoActiveOrder { barista: BaristaId },

    /// The barista is working on a different order than the one named.
    #[error("{barista} is working on {actual}, not {requested}")]
    OrderMismatch {
        barista: BaristaId,
        requested: OrderId,
        actual: OrderId,
    },

    /// The order is not in a state that allows the transition.
    #[error("{order} is {status} and cannot become {target}")]
    InvalidTransition {
        order: OrderId,
        status: OrderStatus,
        target: OrderStatus,
    },
}

impl ConflictError {
    /// Machine-readable kind reported to API callers.
    pub fn kind(&self) -> &'static str {
        match self {
            ConflictError::AlreadyBusy { .. } => "AlreadyBusyError",
            ConflictError::OrderAlreadyAssigned { .. } => "OrderAlreadyAssignedError",
            ConflictError::NoActiveOrder { .. } => "NoActiveOrderError",
            ConflictError::OrderMismatch { .. } => "OrderMismatchError",
            ConflictError::InvalidTransition { .. } => "OrderNotWaitingError",
        }
    }
}

/// Errors surfaced by engine operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// Malformed order payload (no items, unknown drink, zero quantity).
    #[error("Invalid order: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Barista not found: {0}")]
    BaristaNotFound(BaristaId),

    #[error("Alert not found: {0}")]
    AlertNotFound(AlertId),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The order already timed out; nothing more can happen to it.
    #[error("Order {0} has timed out")]
    TimeoutExpired(OrderId),

    /// The engine actor is unreachable.
    #[error("Actor communication error: {0}")]
    Actor(#[from] FrameworkError),
}

impl EngineError {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "ValidationError",
            EngineError::OrderNotFound(_)
            | EngineError::BaristaNotFound(_)
            | EngineError::AlertNotFound(_) => "NotFoundError",
            EngineError::Conflict(c) => c.kind(),
            EngineError::TimeoutExpired(_) => "TimeoutExpiredError",
            EngineError::Actor(_) => "UnavailableError",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
