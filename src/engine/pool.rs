//! Barista pool: the fixed roster of workers and their workload accounting.
//!
//! Cumulative workload is the sum of prep minutes of completed orders. A
//! worker's ratio compares it to the pool mean; when nobody has completed
//! anything yet every ratio is 1.0.

use crate::config::EngineConfig;
use crate::engine::error::{ConflictError, EngineError, EngineResult};
use crate::model::{Barista, BaristaId, BaristaView, Order, OrderId, WorkloadClass};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct BaristaPool {
    baristas: BTreeMap<BaristaId, Barista>,
    overload_ratio: f64,
    underutilized_ratio: f64,
}

impl BaristaPool {
    pub fn new(config: &EngineConfig, now: DateTime<Utc>) -> Self {
        let baristas = (1..=config.baristas)
            .map(|n| {
                let id = BaristaId(n);
                (id, Barista::new(id, format!("Barista {}", n), now))
            })
            .collect();
        Self {
            baristas,
            overload_ratio: config.overload_ratio,
            underutilized_ratio: config.underutilized_ratio,
        }
    }

    pub fn len(&self) -> usize {
        self.baristas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baristas.is_empty()
    }

    pub fn get(&self, id: BaristaId) -> EngineResult<&Barista> {
        self.baristas
            .get(&id)
            .ok_or(EngineError::BaristaNotFound(id))
    }

    fn get_mut(&mut self, id: BaristaId) -> EngineResult<&mut Barista> {
        self.baristas
            .get_mut(&id)
            .ok_or(EngineError::BaristaNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Barista> {
        self.baristas.values()
    }

    /// Idle workers in the order an assignment cycle should serve them:
    /// overloaded first, then least-loaded, then idle-longest, then id.
    pub fn available_workers(&self) -> Vec<BaristaId> {
        let mut idle: Vec<(&Barista, bool)> = self
            .baristas
            .values()
            .filter(|b| b.is_idle())
            .map(|b| (b, self.classify(b.id) == WorkloadClass::Overloaded))
            .collect();
        idle.sort_by(|(a, a_over), (b, b_over)| {
            b_over
                .cmp(a_over)
                .then_with(|| a.total_prep_time.cmp(&b.total_prep_time))
                .then_with(|| a.idle_since.cmp(&b.idle_since))
                .then_with(|| a.id.cmp(&b.id))
        });
        idle.into_iter().map(|(b, _)| b.id).collect()
    }

    /// Hands `order` to `worker`. Status of the order is left to the caller.
    pub fn assign(
        &mut self,
        worker: BaristaId,
        order: &mut Order,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let barista = self.get_mut(worker)?;
        if let Some(current) = barista.current_order {
            return Err(ConflictError::AlreadyBusy {
                barista: worker,
                current,
            }
            .into());
        }
        if let Some(holder) = order.assigned_barista {
            return Err(ConflictError::OrderAlreadyAssigned {
                order: order.id,
                barista: holder,
            }
            .into());
        }
        barista.current_order = Some(order.id);
        barista.current_prep_time = order.total_prep_time;
        order.assigned_barista = Some(worker);
        order.start_time = Some(now);
        Ok(())
    }

    /// Finishes the worker's current order and credits its prep time.
    pub fn complete(&mut self, worker: BaristaId, now: DateTime<Utc>) -> EngineResult<OrderId> {
        let barista = self.get_mut(worker)?;
        let order = barista
            .current_order
            .take()
            .ok_or(ConflictError::NoActiveOrder { barista: worker })?;
        barista.orders_completed += 1;
        barista.total_prep_time += u64::from(barista.current_prep_time);
        barista.current_prep_time = 0;
        barista.idle_since = now;
        Ok(order)
    }

    /// Releases the worker's current order without crediting any work.
    pub fn unassign(&mut self, worker: BaristaId, now: DateTime<Utc>) -> EngineResult<OrderId> {
        let barista = self.get_mut(worker)?;
        let order = barista
            .current_order
            .take()
            .ok_or(ConflictError::NoActiveOrder { barista: worker })?;
        barista.current_prep_time = 0;
        barista.idle_since = now;
        Ok(order)
    }

    pub fn record_skips(&mut self, worker: BaristaId, skips: u32) {
        if let Some(barista) = self.baristas.get_mut(&worker) {
            barista.skips_caused += skips;
        }
    }

    fn mean_workload(&self) -> f64 {
        if self.baristas.is_empty() {
            return 0.0;
        }
        let total: u64 = self.baristas.values().map(|b| b.total_prep_time).sum();
        total as f64 / self.baristas.len() as f64
    }

    pub fn workload_ratio(&self, worker: BaristaId) -> f64 {
        let mean = self.mean_workload();
        match self.baristas.get(&worker) {
            Some(b) if mean > 0.0 => b.total_prep_time as f64 / mean,
            _ => 1.0,
        }
    }

    pub fn classify(&self, worker: BaristaId) -> WorkloadClass {
        let ratio = self.workload_ratio(worker);
        if ratio > self.overload_ratio {
            WorkloadClass::Overloaded
        } else if ratio <= self.underutilized_ratio {
            WorkloadClass::Underutilized
        } else {
            WorkloadClass::Balanced
        }
    }

    /// 100 minus the coefficient of variation of cumulative workloads, in percent.
    pub fn workload_balance(&self) -> f64 {
        let mean = self.mean_workload();
        if mean <= 0.0 {
            return 100.0;
        }
        let n = self.baristas.len() as f64;
        let variance = self
            .baristas
            .values()
            .map(|b| (b.total_prep_time as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        (100.0 - 100.0 * variance.sqrt() / mean).max(0.0)
    }

    pub fn total_completed(&self) -> u32 {
        self.baristas.values().map(|b| b.orders_completed).sum()
    }

    pub fn count_class(&self, class: WorkloadClass) -> usize {
        self.baristas
            .keys()
            .filter(|id| self.classify(**id) == class)
            .count()
    }

    /// Serializable view of one worker; `current` is its order, if any.
    pub fn view(&self, barista: &Barista, current: Option<Order>) -> BaristaView {
        let avg = if barista.orders_completed == 0 {
            0.0
        } else {
            barista.total_prep_time as f64 / f64::from(barista.orders_completed)
        };
        BaristaView {
            id: barista.id,
            name: barista.name.clone(),
            status: barista.status(),
            current_order: current,
            orders_completed: barista.orders_completed,
            total_prep_time: barista.total_prep_time,
            current_workload: barista.current_prep_time,
            workload_ratio: self.workload_ratio(barista.id),
            workload_class: self.classify(barista.id),
            avg_prep_time_per_order: avg,
            skips_caused: barista.skips_caused,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_workload(&mut self, worker: BaristaId, total_prep_time: u64) {
        if let Some(b) = self.baristas.get_mut(&worker) {
            b.total_prep_time = total_prep_time;
        }
    }
}
