//! A worker that prepares exactly one order at a time.
//!
//! `status` is not stored: a barista is BUSY exactly when it holds a current
//! order, so the two can never disagree.
use crate::model::{Order, OrderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Baristas. Rendered as `barista-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BaristaId(pub u32);

impl Display for BaristaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "barista-{}", self.0)
    }
}

impl FromStr for BaristaId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("barista-")
            .unwrap_or(s)
            .parse::<u32>()
            .map(BaristaId)
            .map_err(|_| format!("invalid barista id: {}", s))
    }
}

impl From<BaristaId> for String {
    fn from(id: BaristaId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for BaristaId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaristaStatus {
    Idle,
    Busy,
}

/// Where a barista sits relative to the pool's average workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadClass {
    Overloaded,
    Balanced,
    Underutilized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Barista {
    pub id: BaristaId,
    pub name: String,
    pub current_order: Option<OrderId>,
    /// Prep minutes of the current order, remembered for reporting.
    pub current_prep_time: u32,
    pub orders_completed: u32,
    /// Cumulative prep minutes of completed orders.
    pub total_prep_time: u64,
    pub idle_since: DateTime<Utc>,
    /// Skips this barista caused by taking a lower-ranked order.
    pub skips_caused: u32,
}

impl Barista {
    pub fn new(id: BaristaId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            current_order: None,
            current_prep_time: 0,
            orders_completed: 0,
            total_prep_time: 0,
            idle_since: now,
            skips_caused: 0,
        }
    }

    pub fn status(&self) -> BaristaStatus {
        if self.current_order.is_some() {
            BaristaStatus::Busy
        } else {
            BaristaStatus::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current_order.is_none()
    }
}

/// Serialized view of a barista with derived workload figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaristaView {
    pub id: BaristaId,
    pub name: String,
    pub status: BaristaStatus,
    pub current_order: Option<Order>,
    pub orders_completed: u32,
    pub total_prep_time: u64,
    pub current_workload: u32,
    pub workload_ratio: f64,
    pub workload_class: WorkloadClass,
    pub avg_prep_time_per_order: f64,
    pub skips_caused: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_follows_current_order() {
        let mut barista = Barista::new(BaristaId(1), "Barista 1", Utc::now());
        assert_eq!(barista.status(), BaristaStatus::Idle);
        barista.current_order = Some(OrderId(4));
        assert_eq!(barista.status(), BaristaStatus::Busy);
    }

    #[test]
    fn test_barista_id_text_form() {
        assert_eq!(BaristaId(2).to_string(), "barista-2");
        assert_eq!("barista-2".parse::<BaristaId>().unwrap(), BaristaId(2));
        assert!("barista-".parse::<BaristaId>().is_err());
    }
}
