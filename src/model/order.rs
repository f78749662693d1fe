//! Represents a customer order.
//!
//! Orders live in the engine's order store and are referenced everywhere
//! else (queue, baristas) by [`OrderId`], never by reference.
use crate::model::BaristaId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders. Rendered as `order_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OrderId(pub u64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("order_")
            .unwrap_or(s)
            .parse::<u64>()
            .map(OrderId)
            .map_err(|_| format!("invalid order id: {}", s))
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for OrderId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Waiting,
    Assigned,
    Completed,
    TimedOut,
}

impl OrderStatus {
    /// Terminal orders are archived and never come back to the queue.
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::TimedOut)
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// `Assigned -> Waiting` is only reachable through explicit unassignment.
    pub fn can_become(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Waiting, OrderStatus::Assigned)
                | (OrderStatus::Waiting, OrderStatus::TimedOut)
                | (OrderStatus::Assigned, OrderStatus::Completed)
                | (OrderStatus::Assigned, OrderStatus::Waiting)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Waiting => "WAITING",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::TimedOut => "TIMED_OUT",
        };
        f.write_str(s)
    }
}

/// One line of an order: a drink kind and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub drink_type: String,
    pub quantity: u32,
}

impl OrderItem {
    pub fn new(drink_type: impl Into<String>, quantity: u32) -> Self {
        Self {
            drink_type: drink_type.into(),
            quantity,
        }
    }
}

/// Payload for creating a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCreate {
    pub items: Vec<OrderItem>,
    /// Loyalty ("regular") customer; earns the loyalty bonus.
    #[serde(default, alias = "isRegular")]
    pub regular: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    /// Sum of per-item prep minutes, fixed at creation.
    pub total_prep_time: u32,
    pub arrival_time: DateTime<Utc>,
    pub regular: bool,
    pub status: OrderStatus,
    pub priority_score: f64,
    pub skip_count: u32,
    pub fairness_violation: bool,
    pub assigned_barista: Option<BaristaId>,
    pub start_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(
        id: OrderId,
        items: Vec<OrderItem>,
        total_prep_time: u32,
        regular: bool,
        arrival_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            items,
            total_prep_time,
            arrival_time,
            regular,
            status: OrderStatus::Waiting,
            priority_score: 0.0,
            skip_count: 0,
            fairness_violation: false,
            assigned_barista: None,
            start_time: None,
            completion_time: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == OrderStatus::Waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_text_form() {
        let id = OrderId(7);
        assert_eq!(id.to_string(), "order_7");
        assert_eq!("order_7".parse::<OrderId>().unwrap(), id);
        assert_eq!("7".parse::<OrderId>().unwrap(), id);
        assert!("order_x".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        use OrderStatus::*;
        assert!(Waiting.can_become(Assigned));
        assert!(Assigned.can_become(Completed));
        assert!(Waiting.can_become(TimedOut));
        assert!(Assigned.can_become(Waiting));
        assert!(!Completed.can_become(Waiting));
        assert!(!TimedOut.can_become(Waiting));
        assert!(!TimedOut.can_become(Assigned));
        assert!(!Waiting.can_become(Completed));
    }

    #[test]
    fn test_order_serializes_with_frontend_field_names() {
        let order = Order::new(
            OrderId(1),
            vec![OrderItem::new("latte", 2)],
            8,
            true,
            Utc::now(),
        );
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["id"], "order_1");
        assert_eq!(json["items"][0]["drinkType"], "latte");
        assert_eq!(json["status"], "WAITING");
        assert_eq!(json["regular"], true);
        assert!(json.get("priorityScore").is_some());
        assert!(json.get("arrivalTime").is_some());
        assert!(json["assignedBarista"].is_null());
    }

    #[test]
    fn test_create_payload_accepts_is_regular_alias() {
        let payload: OrderCreate = serde_json::from_str(
            r#"{"items":[{"drinkType":"latte","quantity":1}],"isRegular":true}"#,
        )
        .unwrap();
        assert!(payload.regular);
        let payload: OrderCreate =
            serde_json::from_str(r#"{"items":[{"drinkType":"mocha","quantity":1}]}"#).unwrap();
        assert!(!payload.regular);
    }
}
