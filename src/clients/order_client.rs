//! # Order Client
//!
//! High-level API for the order side of the engine: submission, lookup, the
//! ranked queue, manager alerts and the periodic passes that can also be
//! forced by hand.
use crate::clients::actor_client::ActorClient;
use crate::engine::{Engine, EngineRequest, EngineResponse, EngineResult};
use crate::framework::StateClient;
use async_trait::async_trait;
use crate::model::{
    Alert, AlertId, FairnessReport, Menu, MetricsReport, Order, OrderCreate, OrderId, QueueSnapshot, Submitted,
    SweepReport,
};
use tracing::{debug, info, instrument};

/// Client for the order-facing operations of the engine actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: StateClient<Engine>,
}

impl OrderClient {
    pub fn new(inner: StateClient<Engine>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Engine> for OrderClient {
    fn inner(&self) -> &StateClient<Engine> {
        &self.inner
    }
}

impl OrderClient {
    #[instrument(skip(self, params))]
    pub async fn submit(&self, params: OrderCreate) -> EngineResult<Submitted> {
        debug!(?params, "submit called");
        info!("Sending order to engine");
        match self.request(EngineRequest::SubmitOrder(params)).await? {
            EngineResponse::Submitted(submitted) => Ok(submitted),
            other => unreachable!("SubmitOrder must return Submitted, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> EngineResult<Order> {
        match self.request(EngineRequest::GetOrder(id)).await? {
            EngineResponse::Order(order) => Ok(order),
            other => unreachable!("GetOrder must return Order, got {:?}", other),
        }
    }

    /// Every order ever submitted, oldest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> EngineResult<Vec<Order>> {
        match self.request(EngineRequest::ListOrders).await? {
            EngineResponse::Orders(orders) => Ok(orders),
            other => unreachable!("ListOrders must return Orders, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn queue(&self) -> EngineResult<QueueSnapshot> {
        match self.request(EngineRequest::QueueSnapshot).await? {
            EngineResponse::Queue(snapshot) => Ok(snapshot),
            other => unreachable!("QueueSnapshot must return Queue, got {:?}", other),
        }
    }

    /// Completes an order through the barista holding it.
    #[instrument(skip(self))]
    pub async fn complete(&self, id: OrderId) -> EngineResult<Order> {
        match self.request(EngineRequest::CompleteOrder(id)).await? {
            EngineResponse::Completed(order) => Ok(order),
            other => unreachable!("CompleteOrder must return Completed, got {:?}", other),
        }
    }

    /// Forces a rescoring pass. Returns how many orders were rescored.
    #[instrument(skip(self))]
    pub async fn rescore(&self) -> EngineResult<usize> {
        match self.request(EngineRequest::Rescore).await? {
            EngineResponse::Rescored(count) => Ok(count),
            other => unreachable!("Rescore must return Rescored, got {:?}", other),
        }
    }

    /// Forces a timeout & fairness sweep.
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> EngineResult<SweepReport> {
        match self.request(EngineRequest::SweepTimeouts).await? {
            EngineResponse::Swept(report) => Ok(report),
            other => unreachable!("SweepTimeouts must return Swept, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn menu(&self) -> EngineResult<Menu> {
        match self.request(EngineRequest::Menu).await? {
            EngineResponse::Menu(menu) => Ok(menu),
            other => unreachable!("Menu must return Menu, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn fairness(&self) -> EngineResult<FairnessReport> {
        match self.request(EngineRequest::Fairness).await? {
            EngineResponse::Fairness(report) => Ok(report),
            other => unreachable!("Fairness must return Fairness, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn metrics(&self) -> EngineResult<MetricsReport> {
        match self.request(EngineRequest::Metrics).await? {
            EngineResponse::Metrics(report) => Ok(report),
            other => unreachable!("Metrics must return Metrics, got {:?}", other),
        }
    }

    /// Manager alerts, newest first.
    #[instrument(skip(self))]
    pub async fn alerts(&self) -> EngineResult<Vec<Alert>> {
        match self.request(EngineRequest::Alerts).await? {
            EngineResponse::Alerts(alerts) => Ok(alerts),
            other => unreachable!("Alerts must return Alerts, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn acknowledge_alert(&self, id: AlertId) -> EngineResult<Alert> {
        match self.request(EngineRequest::AcknowledgeAlert(id)).await? {
            EngineResponse::Alert(alert) => Ok(alert),
            other => unreachable!("AcknowledgeAlert must return Alert, got {:?}", other),
        }
    }
}
