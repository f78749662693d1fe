//! # Scheduling Engine
//!
//! All scheduler state lives in one [`Engine`] value owned by a single actor
//! task. Requests from clients and ticks from the periodic timers reach it
//! through the same channel, so every operation (submission, assignment,
//! completion, rescoring, sweep) runs alone against a consistent snapshot.
//!
//! ## Parts
//!
//! - [`store`]: the arena of order records, keyed by [`OrderId`].
//! - [`scorer`]: pure priority function.
//! - [`queue`]: ranked index over waiting orders.
//! - [`pool`]: the barista roster and workload accounting.
//! - [`assignment`]: matching idle baristas to waiting orders.
//! - [`monitor`]: timeouts, manager alerts and fairness tracking.

pub mod assignment;
pub mod error;
pub mod monitor;
pub mod pool;
pub mod queue;
pub mod scorer;
pub mod store;

pub use error::{ConflictError, EngineError, EngineResult};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::framework::ActorState;
use crate::model::{
    Alert, AlertId, Assignment, Barista, BaristaId, BaristaView, FairnessReport, Menu, MetricsReport, Order,
    OrderCreate, OrderId, OrderStatus, PoolStats, QueueSnapshot, QueueStats, Submitted,
    SweepReport, WorkloadClass,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use monitor::Monitor;
use pool::BaristaPool;
use queue::{OrderQueue, RankKey};
use scorer::Scorer;
use std::sync::Arc;
use store::OrderStore;
use tracing::{debug, info};

/// Requests understood by the engine actor.
#[derive(Debug)]
pub enum EngineRequest {
    SubmitOrder(OrderCreate),
    GetOrder(OrderId),
    ListOrders,
    QueueSnapshot,
    ListBaristas,
    BaristaDetail(BaristaId),
    PoolStats,
    AssignNext,
    AssignManual { barista: BaristaId, order: OrderId },
    Complete { barista: BaristaId, order: OrderId },
    CompleteOrder(OrderId),
    Unassign(BaristaId),
    Fairness,
    Metrics,
    Alerts,
    AcknowledgeAlert(AlertId),
    Rescore,
    SweepTimeouts,
    Menu,
}

/// Replies, one variant per request.
#[derive(Debug)]
pub enum EngineResponse {
    Submitted(Submitted),
    Order(Order),
    Orders(Vec<Order>),
    Queue(QueueSnapshot),
    Baristas(Vec<BaristaView>),
    Barista(BaristaView),
    PoolStats(PoolStats),
    Assignments(Vec<Assignment>),
    Assigned(Assignment),
    Completed(Order),
    Unassigned(Order),
    Fairness(FairnessReport),
    Metrics(MetricsReport),
    Alerts(Vec<Alert>),
    Alert(Alert),
    Rescored(usize),
    Swept(SweepReport),
    Menu(Menu),
}

/// Periodic triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTimer {
    Rescore,
    Sweep,
    Assign,
}

/// The scheduler state: order store, ranked queue, barista pool and monitor.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    menu: Menu,
    scorer: Scorer,
    store: OrderStore,
    queue: OrderQueue,
    pool: BaristaPool,
    monitor: Monitor,
}

impl Engine {
    pub fn new(config: EngineConfig, now: DateTime<Utc>) -> Self {
        Self {
            menu: Menu::default(),
            scorer: Scorer::new(&config),
            store: OrderStore::new(),
            queue: OrderQueue::new(),
            pool: BaristaPool::new(&config, now),
            monitor: Monitor::new(&config),
            config,
        }
    }

    /// Stores a new order, scores it and ranks it.
    pub fn submit(&mut self, params: OrderCreate, now: DateTime<Utc>) -> EngineResult<Submitted> {
        let order = self.store.create(params, &self.menu, now)?;
        order.priority_score = self.scorer.score(order, now);
        let key = RankKey {
            score: order.priority_score,
            arrival: order.arrival_time,
            id: order.id,
        };
        let order = order.clone();
        self.queue.insert(key);
        let position = self.queue.position(order.id).unwrap_or(self.queue.len());
        info!(
            order_id = %order.id,
            prep = order.total_prep_time,
            score = order.priority_score,
            position,
            "Order submitted"
        );
        if self.config.auto_assign {
            self.assign_next(now);
        }
        Ok(Submitted { order, position })
    }

    pub fn order(&self, id: OrderId) -> EngineResult<Order> {
        self.store
            .get(id)
            .cloned()
            .ok_or(EngineError::OrderNotFound(id))
    }

    /// Recomputes every waiting order's score and rebuilds the ranking.
    pub fn rescore(&mut self, now: DateTime<Utc>) -> usize {
        let mut keys = Vec::with_capacity(self.queue.len());
        for order in self.store.live_mut_iter().filter(|o| o.is_waiting()) {
            order.priority_score = self.scorer.score(order, now);
            keys.push(RankKey {
                score: order.priority_score,
                arrival: order.arrival_time,
                id: order.id,
            });
        }
        let count = keys.len();
        self.queue.reorder(keys);
        debug!(count, "Rescored waiting orders");
        count
    }

    pub fn sweep(&mut self, now: DateTime<Utc>) -> SweepReport {
        let report = self.monitor.sweep(&mut self.store, &mut self.queue, now);
        if !report.timed_out.is_empty()
            || !report.new_violations.is_empty()
            || !report.new_alerts.is_empty()
        {
            info!(
                timed_out = report.timed_out.len(),
                violations = report.new_violations.len(),
                alerts = report.new_alerts.len(),
                "Sweep finished"
            );
        }
        report
    }

    /// Completes `order` on `barista`, crediting the barista's workload.
    pub fn complete(
        &mut self,
        barista: BaristaId,
        order: OrderId,
        now: DateTime<Utc>,
    ) -> EngineResult<Order> {
        let current = self.pool.get(barista)?.current_order;
        match self.store.get(order) {
            None => return Err(EngineError::OrderNotFound(order)),
            Some(o) if o.status == OrderStatus::TimedOut => {
                return Err(EngineError::TimeoutExpired(order))
            }
            Some(_) => {}
        }
        match current {
            None => return Err(ConflictError::NoActiveOrder { barista }.into()),
            Some(actual) if actual != order => {
                return Err(ConflictError::OrderMismatch {
                    barista,
                    requested: order,
                    actual,
                }
                .into())
            }
            Some(_) => {}
        }

        self.pool.complete(barista, now)?;
        let completed = self.store.transition(order, OrderStatus::Completed)?;
        completed.completion_time = Some(now);
        self.monitor.forget(completed);
        let completed = completed.clone();
        self.store.archive(order);
        info!(order_id = %order, barista_id = %barista, "Order completed");

        if self.config.auto_assign {
            self.assign_next(now);
        }
        Ok(completed)
    }

    /// Completes an order through whichever barista holds it.
    pub fn complete_order(&mut self, order: OrderId, now: DateTime<Utc>) -> EngineResult<Order> {
        let existing = self.store.get(order).ok_or(EngineError::OrderNotFound(order))?;
        let (status, holder) = (existing.status, existing.assigned_barista);
        if status == OrderStatus::TimedOut {
            return Err(EngineError::TimeoutExpired(order));
        }
        match holder {
            Some(barista) if status == OrderStatus::Assigned => self.complete(barista, order, now),
            _ => Err(ConflictError::InvalidTransition {
                order,
                status,
                target: OrderStatus::Completed,
            }
            .into()),
        }
    }

    /// Returns the barista's current order to the queue.
    pub fn unassign(&mut self, barista: BaristaId, now: DateTime<Utc>) -> EngineResult<Order> {
        let id = self.pool.unassign(barista, now)?;
        let order = self.store.transition(id, OrderStatus::Waiting)?;
        order.assigned_barista = None;
        order.start_time = None;
        order.priority_score = self.scorer.score(order, now);
        self.queue.insert(RankKey {
            score: order.priority_score,
            arrival: order.arrival_time,
            id,
        });
        let order = order.clone();
        info!(order_id = %id, barista_id = %barista, "Order returned to queue");

        if self.config.auto_assign {
            self.assign_next(now);
        }
        Ok(order)
    }

    fn view(&self, barista: &Barista) -> BaristaView {
        let current = barista
            .current_order
            .and_then(|id| self.store.get(id))
            .cloned();
        self.pool.view(barista, current)
    }

    pub fn baristas(&self) -> Vec<BaristaView> {
        self.pool.iter().map(|b| self.view(b)).collect()
    }

    pub fn barista(&self, id: BaristaId) -> EngineResult<BaristaView> {
        Ok(self.view(self.pool.get(id)?))
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            baristas: self.baristas(),
            total_completed: self.pool.total_completed(),
            workload_balance: self.pool.workload_balance(),
            overloaded_count: self.pool.count_class(WorkloadClass::Overloaded),
            underutilized_count: self.pool.count_class(WorkloadClass::Underutilized),
        }
    }

    /// Mean minutes from arrival to completion over completed orders.
    fn avg_wait_minutes(&self) -> f64 {
        let waits: Vec<f64> = self
            .store
            .archived()
            .filter(|o| o.status == OrderStatus::Completed)
            .filter_map(|o| o.completion_time.map(|done| Scorer::waited_minutes(o, done)))
            .collect();
        if waits.is_empty() {
            0.0
        } else {
            waits.iter().sum::<f64>() / waits.len() as f64
        }
    }

    pub fn queue_stats(&self) -> QueueStats {
        let total = self.store.total();
        let timed_out = self.store.count_status(OrderStatus::TimedOut);
        QueueStats {
            total_orders: total,
            waiting_orders: self.queue.len(),
            avg_wait_time: self.avg_wait_minutes(),
            timeout_rate: if total == 0 {
                0.0
            } else {
                100.0 * timed_out as f64 / total as f64
            },
        }
    }

    pub fn queue_snapshot(&self) -> QueueSnapshot {
        let waiting_orders = self
            .queue
            .iter()
            .filter_map(|id| self.store.get(id))
            .cloned()
            .collect();
        QueueSnapshot {
            waiting_orders,
            baristas: self.baristas(),
            stats: self.queue_stats(),
        }
    }

    pub fn orders(&self) -> Vec<Order> {
        self.store.all().into_iter().cloned().collect()
    }

    pub fn fairness(&self) -> FairnessReport {
        self.monitor.report(&self.store)
    }

    /// Manager alerts, newest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.monitor.alerts()
    }

    pub fn acknowledge_alert(&mut self, id: AlertId) -> EngineResult<Alert> {
        let alert = self.monitor.acknowledge(id)?;
        info!(alert_id = %id, order_id = %alert.order_id, "Alert acknowledged");
        Ok(alert)
    }

    pub fn metrics(&self) -> MetricsReport {
        let all = self.store.all();
        let completed = self.store.count_status(OrderStatus::Completed);
        let avg_order_complexity = if all.is_empty() {
            0.0
        } else {
            all.iter().map(|o| f64::from(o.total_prep_time)).sum::<f64>() / all.len() as f64
        };
        MetricsReport {
            total_orders_processed: completed,
            avg_wait_time_minutes: self.avg_wait_minutes(),
            avg_order_complexity,
            total_customers_served: completed,
            workload_balance: self.pool.workload_balance(),
            fairness_score: self.monitor.fairness_score(all.len()),
            timeouts_count: self.store.count_status(OrderStatus::TimedOut),
            regular_customers_count: all.iter().filter(|o| o.regular).count(),
        }
    }
}

#[async_trait]
impl ActorState for Engine {
    type Request = EngineRequest;
    type Response = EngineResponse;
    type Timer = EngineTimer;
    type Context = Arc<dyn Clock>;
    type Error = EngineError;

    async fn handle(
        &mut self,
        request: EngineRequest,
        clock: &Arc<dyn Clock>,
    ) -> EngineResult<EngineResponse> {
        let now = clock.now();
        let response = match request {
            EngineRequest::SubmitOrder(params) => {
                EngineResponse::Submitted(self.submit(params, now)?)
            }
            EngineRequest::GetOrder(id) => EngineResponse::Order(self.order(id)?),
            EngineRequest::ListOrders => EngineResponse::Orders(self.orders()),
            EngineRequest::QueueSnapshot => EngineResponse::Queue(self.queue_snapshot()),
            EngineRequest::ListBaristas => EngineResponse::Baristas(self.baristas()),
            EngineRequest::BaristaDetail(id) => EngineResponse::Barista(self.barista(id)?),
            EngineRequest::PoolStats => EngineResponse::PoolStats(self.pool_stats()),
            EngineRequest::AssignNext => EngineResponse::Assignments(self.assign_next(now)),
            EngineRequest::AssignManual { barista, order } => {
                EngineResponse::Assigned(self.assign_manual(barista, order, now)?)
            }
            EngineRequest::Complete { barista, order } => {
                EngineResponse::Completed(self.complete(barista, order, now)?)
            }
            EngineRequest::CompleteOrder(order) => {
                EngineResponse::Completed(self.complete_order(order, now)?)
            }
            EngineRequest::Unassign(barista) => {
                EngineResponse::Unassigned(self.unassign(barista, now)?)
            }
            EngineRequest::Fairness => EngineResponse::Fairness(self.fairness()),
            EngineRequest::Metrics => EngineResponse::Metrics(self.metrics()),
            EngineRequest::Alerts => EngineResponse::Alerts(self.alerts()),
            EngineRequest::AcknowledgeAlert(id) => {
                EngineResponse::Alert(self.acknowledge_alert(id)?)
            }
            EngineRequest::Rescore => EngineResponse::Rescored(self.rescore(now)),
            EngineRequest::SweepTimeouts => EngineResponse::Swept(self.sweep(now)),
            EngineRequest::Menu => EngineResponse::Menu(self.menu.clone()),
        };
        Ok(response)
    }

    async fn on_tick(&mut self, timer: EngineTimer, clock: &Arc<dyn Clock>) {
        let now = clock.now();
        match timer {
            EngineTimer::Rescore => {
                self.rescore(now);
            }
            EngineTimer::Sweep => {
                self.sweep(now);
            }
            EngineTimer::Assign => {
                self.assign_next(now);
            }
        }
    }

    async fn on_start(&mut self, _clock: &Arc<dyn Clock>) {
        info!(
            baristas = self.pool.len(),
            auto_assign = self.config.auto_assign,
            "Engine ready"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaristaStatus, OrderItem};

    fn params(drink: &str, regular: bool) -> OrderCreate {
        OrderCreate {
            items: vec![OrderItem::new(drink, 1)],
            regular,
        }
    }

    fn mins(n: i64) -> chrono::Duration {
        chrono::Duration::minutes(n)
    }

    #[test]
    fn test_submit_scores_and_ranks() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default(), t0);
        let slow = engine.submit(params("mocha", false), t0).unwrap();
        let quick = engine.submit(params("cold-brew", true), t0).unwrap();

        assert_eq!(slow.order.priority_score, 0.0);
        assert_eq!(slow.position, 1);
        // 25 × (1 − 1/6) + 10
        assert!((quick.order.priority_score - (25.0 * 5.0 / 6.0 + 10.0)).abs() < 1e-9);
        assert_eq!(quick.position, 1);

        let snapshot = engine.queue_snapshot();
        let ids: Vec<OrderId> = snapshot.waiting_orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![quick.order.id, slow.order.id]);
        assert_eq!(snapshot.stats.total_orders, 2);
        assert_eq!(snapshot.stats.waiting_orders, 2);
    }

    #[test]
    fn test_rescore_lets_waiting_orders_climb() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default(), t0);
        let a = engine.submit(params("espresso", false), t0).unwrap().order.id;
        let b = engine.submit(params("mocha", true), t0 + mins(7)).unwrap().order.id;

        assert_eq!(engine.rescore(t0 + mins(8)), 2);
        let top = engine.queue_snapshot().waiting_orders;
        assert_eq!(top[0].id, a);
        assert_eq!(top[1].id, b);
        assert!(top[0].priority_score > 98.0);
        assert!((top[1].priority_score - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_complete_archives_and_credits() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default(), t0);
        let id = engine.submit(params("latte", false), t0).unwrap().order.id;
        let assigned = engine.assign_next(t0 + mins(1));
        assert_eq!(assigned.len(), 1);
        let barista = assigned[0].barista_id;

        let done = engine.complete(barista, id, t0 + mins(5)).unwrap();
        assert_eq!(done.status, OrderStatus::Completed);
        assert_eq!(done.completion_time, Some(t0 + mins(5)));

        let view = engine.barista(barista).unwrap();
        assert_eq!(view.status, BaristaStatus::Idle);
        assert_eq!(view.orders_completed, 1);
        assert_eq!(view.total_prep_time, 4);
        assert!((engine.queue_stats().avg_wait_time - 5.0).abs() < 1e-9);

        assert!(matches!(
            engine.complete(barista, id, t0 + mins(6)),
            Err(EngineError::Conflict(ConflictError::NoActiveOrder { .. }))
        ));
        assert!(matches!(
            engine.complete_order(id, t0 + mins(6)),
            Err(EngineError::Conflict(ConflictError::InvalidTransition { .. }))
        ));
    }

    #[test]
    fn test_complete_wrong_order_is_a_mismatch() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default().with_baristas(1), t0);
        let first = engine.submit(params("latte", false), t0).unwrap().order.id;
        let second = engine.submit(params("mocha", false), t0).unwrap().order.id;
        engine.assign_manual(BaristaId(1), first, t0).unwrap();

        assert!(matches!(
            engine.complete(BaristaId(1), second, t0),
            Err(EngineError::Conflict(ConflictError::OrderMismatch { .. }))
        ));
        assert!(matches!(
            engine.complete(BaristaId(1), OrderId(99), t0),
            Err(EngineError::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_unassign_requeues_order() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default().with_baristas(1), t0);
        let id = engine.submit(params("latte", false), t0).unwrap().order.id;
        engine.assign_next(t0);
        assert!(engine.queue_snapshot().waiting_orders.is_empty());

        let order = engine.unassign(BaristaId(1), t0 + mins(2)).unwrap();
        assert_eq!(order.status, OrderStatus::Waiting);
        assert_eq!(order.assigned_barista, None);
        assert_eq!(engine.queue_snapshot().waiting_orders[0].id, id);
        assert_eq!(engine.barista(BaristaId(1)).unwrap().total_prep_time, 0);
    }

    #[test]
    fn test_timed_out_order_rejects_operations() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default(), t0);
        let id = engine.submit(params("latte", false), t0).unwrap().order.id;
        let report = engine.sweep(t0 + mins(10));
        assert_eq!(report.timed_out, vec![id]);

        assert!(matches!(
            engine.assign_manual(BaristaId(1), id, t0 + mins(11)),
            Err(EngineError::TimeoutExpired(_))
        ));
        assert!(matches!(
            engine.complete_order(id, t0 + mins(11)),
            Err(EngineError::TimeoutExpired(_))
        ));
        assert!(engine.assign_next(t0 + mins(11)).is_empty());

        let stats = engine.queue_stats();
        assert_eq!(stats.timeout_rate, 100.0);
        assert_eq!(engine.metrics().timeouts_count, 1);
    }

    #[test]
    fn test_alerts_follow_waiting_customers() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default().with_baristas(1), t0);
        let served = engine.submit(params("latte", false), t0).unwrap().order.id;
        let left = engine.submit(params("mocha", false), t0).unwrap().order.id;
        engine.assign_manual(BaristaId(1), served, t0).unwrap();

        engine.sweep(t0 + mins(8));
        let alerts = engine.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].order_id, left);

        let acked = engine.acknowledge_alert(alerts[0].id).unwrap();
        assert!(acked.acknowledged);
        assert!(matches!(
            engine.acknowledge_alert(AlertId(42)),
            Err(EngineError::AlertNotFound(_))
        ));

        engine.complete(BaristaId(1), served, t0 + mins(9)).unwrap();
        engine.sweep(t0 + mins(10));
        let alerts = engine.alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].order_id, left);
        assert_eq!(alerts[0].severity, crate::model::AlertSeverity::Critical);
        assert!(alerts.iter().all(|a| a.order_id != served));
    }

    #[test]
    fn test_auto_assign_runs_on_arrival() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default().with_auto_assign(true), t0);
        let submitted = engine.submit(params("latte", false), t0).unwrap();
        assert_eq!(submitted.position, 1);
        let order = engine.order(submitted.order.id).unwrap();
        assert_eq!(order.status, OrderStatus::Assigned);
    }

    #[test]
    fn test_metrics_summarise_history() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default(), t0);
        let a = engine.submit(params("espresso", true), t0).unwrap().order.id;
        engine.submit(params("mocha", false), t0).unwrap();
        engine.assign_manual(BaristaId(1), a, t0).unwrap();
        engine.complete(BaristaId(1), a, t0 + mins(3)).unwrap();

        let metrics = engine.metrics();
        assert_eq!(metrics.total_orders_processed, 1);
        assert_eq!(metrics.total_customers_served, 1);
        assert_eq!(metrics.regular_customers_count, 1);
        assert!((metrics.avg_order_complexity - 4.0).abs() < 1e-9);
        assert!((metrics.avg_wait_time_minutes - 3.0).abs() < 1e-9);
        assert_eq!(metrics.fairness_score, 100.0);
    }
}
