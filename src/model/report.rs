//! Read-only snapshots handed out by the engine.

use crate::model::{AlertId, BaristaId, BaristaView, Order, OrderId};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total_orders: usize,
    pub waiting_orders: usize,
    /// Mean minutes from arrival to completion over completed orders.
    pub avg_wait_time: f64,
    /// Percentage of submitted orders that timed out.
    pub timeout_rate: f64,
}

/// `GET /queue` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    /// Ranked: highest score first, earlier arrival on ties.
    pub waiting_orders: Vec<Order>,
    pub baristas: Vec<BaristaView>,
    pub stats: QueueStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    pub baristas: Vec<BaristaView>,
    pub total_completed: u32,
    /// 100 means perfectly even cumulative workloads.
    pub workload_balance: f64,
    pub overloaded_count: usize,
    pub underutilized_count: usize,
}

/// One order handed to one barista.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub barista_id: BaristaId,
    pub order_id: OrderId,
    /// Higher-ranked orders passed over to make this assignment.
    pub skipped: Vec<OrderId>,
}

/// Submission result: the stored order and its 1-based queue position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submitted {
    #[serde(flatten)]
    pub order: Order,
    pub position: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub timed_out: Vec<OrderId>,
    pub new_violations: Vec<OrderId>,
    pub new_alerts: Vec<AlertId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessReport {
    pub fairness_score: f64,
    /// Skip counts of live orders that have been skipped at least once.
    pub skip_counts: BTreeMap<OrderId, u32>,
    pub violations: usize,
    pub violation_rate: f64,
    pub justified_ratio: f64,
    pub violations_by_barista: BTreeMap<BaristaId, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub total_orders_processed: usize,
    pub avg_wait_time_minutes: f64,
    pub avg_order_complexity: f64,
    pub total_customers_served: usize,
    pub workload_balance: f64,
    pub fairness_score: f64,
    pub timeouts_count: usize,
    pub regular_customers_count: usize,
}
