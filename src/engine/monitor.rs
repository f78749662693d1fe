//! Timeout & fairness monitor.
//!
//! The sweep enforces the hard wait ceiling: a WAITING order that has waited
//! the full timeout becomes TIMED_OUT, leaves the queue and is archived.
//!
//! Managers are alerted along the way: a WARNING once a waiting customer
//! passes the urgency threshold and a CRITICAL when the order times out,
//! at most one of each per order.
//!
//! Fairness is observational. Skips are recorded as they happen; an order
//! skipped more than the configured limit is flagged once and counted in
//! reports, and its score is left alone.

use crate::clock::{elapsed, minutes};
use crate::config::EngineConfig;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::queue::OrderQueue;
use crate::engine::store::OrderStore;
use crate::model::{
    Alert, AlertId, AlertKind, AlertSeverity, BaristaId, FairnessReport, Order, OrderId,
    OrderStatus, SweepReport,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::Duration;
use tracing::warn;

#[derive(Debug)]
pub struct Monitor {
    timeout: Duration,
    urgency_threshold: Duration,
    skip_limit: u32,
    alert_capacity: usize,
    alerts: VecDeque<Alert>,
    /// Severities already raised per live order.
    raised: HashSet<(OrderId, AlertSeverity)>,
    next_alert: u64,
    /// Flagged orders and the barista whose skip crossed the limit.
    violations: BTreeMap<OrderId, Option<BaristaId>>,
    last_skipper: HashMap<OrderId, BaristaId>,
    /// Orders passed over at least once for an order that was not shorter.
    unjustified: HashSet<OrderId>,
}

impl Monitor {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            timeout: config.timeout,
            urgency_threshold: config.urgency_threshold,
            skip_limit: config.fairness_skip_limit,
            alert_capacity: config.alert_capacity.max(1),
            alerts: VecDeque::new(),
            raised: HashSet::new(),
            next_alert: 1,
            violations: BTreeMap::new(),
            last_skipper: HashMap::new(),
            unjustified: HashSet::new(),
        }
    }

    /// Records that `order` was passed over by `by`. Returns true when this
    /// skip newly flags the order.
    pub fn record_skip(&mut self, order: &mut Order, by: BaristaId, justified: bool) -> bool {
        order.skip_count += 1;
        self.last_skipper.insert(order.id, by);
        if !justified {
            self.unjustified.insert(order.id);
        }
        self.check(order)
    }

    /// Flags the order if it crossed the skip limit and is not flagged yet.
    pub fn check(&mut self, order: &mut Order) -> bool {
        if order.fairness_violation || order.skip_count <= self.skip_limit {
            return false;
        }
        order.fairness_violation = true;
        let skipper = self.last_skipper.get(&order.id).copied();
        self.violations.insert(order.id, skipper);
        warn!(
            order_id = %order.id,
            skip_count = order.skip_count,
            "Fairness violation"
        );
        true
    }

    /// Drops per-order bookkeeping once `order` is archived. Flagged orders
    /// keep their justification record for the fairness report.
    pub fn forget(&mut self, order: &Order) {
        self.last_skipper.remove(&order.id);
        if !order.fairness_violation {
            self.unjustified.remove(&order.id);
        }
        for severity in [AlertSeverity::Warning, AlertSeverity::Critical] {
            self.raised.remove(&(order.id, severity));
        }
    }

    /// Raises an alert unless `order` already has one of this severity.
    fn raise(
        &mut self,
        order: OrderId,
        kind: AlertKind,
        severity: AlertSeverity,
        message: String,
        now: DateTime<Utc>,
    ) -> Option<AlertId> {
        if !self.raised.insert((order, severity)) {
            return None;
        }
        let id = AlertId(self.next_alert);
        self.next_alert += 1;
        warn!(alert_id = %id, order_id = %order, ?severity, "{}", message);
        if self.alerts.len() >= self.alert_capacity {
            self.alerts.pop_front();
        }
        self.alerts.push_back(Alert {
            id,
            kind,
            order_id: order,
            message,
            severity,
            timestamp: now,
            acknowledged: false,
        });
        Some(id)
    }

    /// Times out overdue orders, alerts on customers nearing the ceiling and
    /// re-checks fairness on everything live.
    pub fn sweep(
        &mut self,
        store: &mut OrderStore,
        queue: &mut OrderQueue,
        now: DateTime<Utc>,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        let mut expired = Vec::new();
        let mut urgent = Vec::new();
        for order in store.waiting() {
            let waited = elapsed(order.arrival_time, now);
            if waited >= self.timeout {
                expired.push((order.id, waited));
            } else if waited >= self.urgency_threshold {
                urgent.push((order.id, waited));
            }
        }
        expired.sort();
        urgent.sort();

        for (id, waited) in urgent {
            let message = format!("{} has waited {:.1} minutes", id, minutes(waited));
            if let Some(alert) = self.raise(
                id,
                AlertKind::ApproachingTimeout,
                AlertSeverity::Warning,
                message,
                now,
            ) {
                report.new_alerts.push(alert);
            }
        }

        for (id, waited) in expired {
            let order = match store.transition(id, OrderStatus::TimedOut) {
                Ok(order) => order,
                Err(e) => {
                    warn!(order_id = %id, error = %e, "Could not time out order");
                    continue;
                }
            };
            let message = format!("{} timed out after {:.1} minutes", id, minutes(waited));
            if let Some(alert) =
                self.raise(id, AlertKind::TimedOut, AlertSeverity::Critical, message, now)
            {
                report.new_alerts.push(alert);
            }
            self.forget(order);
            queue.remove(id);
            store.archive(id);
            report.timed_out.push(id);
        }

        for order in store.live_mut_iter() {
            if self.check(order) {
                report.new_violations.push(order.id);
            }
        }
        report.new_violations.sort();
        report
    }

    /// Retained alerts, newest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.iter().rev().cloned().collect()
    }

    pub fn acknowledge(&mut self, id: AlertId) -> EngineResult<Alert> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(EngineError::AlertNotFound(id))?;
        alert.acknowledged = true;
        Ok(alert.clone())
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Share of submitted orders that were flagged.
    pub fn violation_rate(&self, total_orders: usize) -> f64 {
        if total_orders == 0 {
            0.0
        } else {
            self.violations.len() as f64 / total_orders as f64
        }
    }

    /// Share of violations whose every skip was for a strictly shorter order.
    pub fn justified_ratio(&self) -> f64 {
        if self.violations.is_empty() {
            return 1.0;
        }
        let justified = self
            .violations
            .keys()
            .filter(|id| !self.unjustified.contains(id))
            .count();
        justified as f64 / self.violations.len() as f64
    }

    pub fn fairness_score(&self, total_orders: usize) -> f64 {
        100.0 * (1.0 - self.violation_rate(total_orders))
    }

    pub fn report(&self, store: &OrderStore) -> FairnessReport {
        let total = store.total();
        let skip_counts = store
            .live()
            .filter(|o| o.skip_count > 0)
            .map(|o| (o.id, o.skip_count))
            .collect();
        let mut violations_by_barista = BTreeMap::new();
        for barista in self.violations.values().flatten() {
            *violations_by_barista.entry(*barista).or_insert(0) += 1;
        }
        FairnessReport {
            fairness_score: self.fairness_score(total),
            skip_counts,
            violations: self.violation_count(),
            violation_rate: self.violation_rate(total),
            justified_ratio: self.justified_ratio(),
            violations_by_barista,
        }
    }
}
