//! Order store: the arena that owns every order record.
//!
//! Live orders (WAITING / ASSIGNED) and archived ones (COMPLETED /
//! TIMED_OUT) are kept apart so sweeps and rescoring only walk live records,
//! while reports and lookups still see the full history.

use crate::engine::error::{ConflictError, EngineError, EngineResult};
use crate::model::{Menu, Order, OrderCreate, OrderId, OrderStatus};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct OrderStore {
    live: HashMap<OrderId, Order>,
    archive: HashMap<OrderId, Order>,
    next_id: u64,
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Validates the payload against the menu and stores a new WAITING order.
    pub fn create(
        &mut self,
        params: OrderCreate,
        menu: &Menu,
        now: DateTime<Utc>,
    ) -> EngineResult<&mut Order> {
        let total_prep_time = validate(&params, menu)?;
        let id = OrderId(self.next_id);
        self.next_id += 1;
        let order = Order::new(id, params.items, total_prep_time, params.regular, now);
        Ok(self.live.entry(id).or_insert(order))
    }

    /// Looks up an order, live or archived.
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.live.get(&id).or_else(|| self.archive.get(&id))
    }

    /// Live order for mutation. Archived orders answer with the matching error.
    pub fn live_mut(&mut self, id: OrderId) -> EngineResult<&mut Order> {
        self.live_for(id, OrderStatus::Assigned)
    }

    fn live_for(&mut self, id: OrderId, target: OrderStatus) -> EngineResult<&mut Order> {
        if let Some(order) = self.live.get_mut(&id) {
            return Ok(order);
        }
        match self.archive.get(&id) {
            Some(order) if order.status == OrderStatus::TimedOut => {
                Err(EngineError::TimeoutExpired(id))
            }
            Some(order) => Err(ConflictError::InvalidTransition {
                order: id,
                status: order.status,
                target,
            }
            .into()),
            None => Err(EngineError::OrderNotFound(id)),
        }
    }

    /// Applies a status transition, rejecting anything non-monotonic.
    pub fn transition(&mut self, id: OrderId, target: OrderStatus) -> EngineResult<&mut Order> {
        let order = self.live_for(id, target)?;
        if !order.status.can_become(target) {
            return Err(ConflictError::InvalidTransition {
                order: id,
                status: order.status,
                target,
            }
            .into());
        }
        order.status = target;
        Ok(order)
    }

    /// Moves a terminal order out of the live set.
    pub fn archive(&mut self, id: OrderId) {
        if let Some(order) = self.live.remove(&id) {
            debug_assert!(order.status.is_terminal());
            self.archive.insert(id, order);
        }
    }

    pub fn live(&self) -> impl Iterator<Item = &Order> {
        self.live.values()
    }

    pub fn live_mut_iter(&mut self) -> impl Iterator<Item = &mut Order> {
        self.live.values_mut()
    }

    pub fn waiting(&self) -> impl Iterator<Item = &Order> {
        self.live.values().filter(|o| o.is_waiting())
    }

    pub fn archived(&self) -> impl Iterator<Item = &Order> {
        self.archive.values()
    }

    /// Every order ever submitted, oldest first.
    pub fn all(&self) -> Vec<&Order> {
        let mut all: Vec<&Order> = self.live.values().chain(self.archive.values()).collect();
        all.sort_by_key(|o| o.id);
        all
    }

    pub fn total(&self) -> usize {
        self.live.len() + self.archive.len()
    }

    pub fn count_status(&self, status: OrderStatus) -> usize {
        if status.is_terminal() {
            self.archive.values().filter(|o| o.status == status).count()
        } else {
            self.live.values().filter(|o| o.status == status).count()
        }
    }
}

/// Checks the payload and returns its total prep time in minutes.
fn validate(params: &OrderCreate, menu: &Menu) -> EngineResult<u32> {
    if params.items.is_empty() {
        return Err(EngineError::Validation("order has no items".to_string()));
    }
    let mut total: u32 = 0;
    for item in &params.items {
        if item.quantity == 0 {
            return Err(EngineError::Validation(format!(
                "quantity for {} must be at least 1",
                item.drink_type
            )));
        }
        let prep = menu.prep_time(&item.drink_type).ok_or_else(|| {
            EngineError::Validation(format!("unknown drink: {}", item.drink_type))
        })?;
        total = prep
            .checked_mul(item.quantity)
            .and_then(|t| total.checked_add(t))
            .ok_or_else(|| EngineError::Validation("order is too large".to_string()))?;
    }
    Ok(total)
}
