//! # Barista Client
//!
//! High-level API for the barista side of the engine: the roster, assignment
//! cycles, manual overrides and completion reports.
use crate::clients::actor_client::ActorClient;
use crate::engine::{Engine, EngineRequest, EngineResponse, EngineResult};
use crate::framework::StateClient;
use crate::model::{Assignment, BaristaId, BaristaView, Order, OrderId, PoolStats};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the barista-facing operations of the engine actor.
#[derive(Clone)]
pub struct BaristaClient {
    inner: StateClient<Engine>,
}

impl BaristaClient {
    pub fn new(inner: StateClient<Engine>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Engine> for BaristaClient {
    fn inner(&self) -> &StateClient<Engine> {
        &self.inner
    }
}

impl BaristaClient {
    #[instrument(skip(self))]
    pub async fn list(&self) -> EngineResult<Vec<BaristaView>> {
        match self.request(EngineRequest::ListBaristas).await? {
            EngineResponse::Baristas(baristas) => Ok(baristas),
            other => unreachable!("ListBaristas must return Baristas, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: BaristaId) -> EngineResult<BaristaView> {
        match self.request(EngineRequest::BaristaDetail(id)).await? {
            EngineResponse::Barista(view) => Ok(view),
            other => unreachable!("BaristaDetail must return Barista, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> EngineResult<PoolStats> {
        match self.request(EngineRequest::PoolStats).await? {
            EngineResponse::PoolStats(stats) => Ok(stats),
            other => unreachable!("PoolStats must return PoolStats, got {:?}", other),
        }
    }

    /// Runs one assignment cycle. An empty result means nothing could be paired.
    #[instrument(skip(self))]
    pub async fn assign_next(&self) -> EngineResult<Vec<Assignment>> {
        debug!("Triggering assignment cycle");
        match self.request(EngineRequest::AssignNext).await? {
            EngineResponse::Assignments(made) => Ok(made),
            other => unreachable!("AssignNext must return Assignments, got {:?}", other),
        }
    }

    /// Manual override: give `order` to `barista` regardless of rank.
    #[instrument(skip(self))]
    pub async fn assign(&self, barista: BaristaId, order: OrderId) -> EngineResult<Assignment> {
        match self
            .request(EngineRequest::AssignManual { barista, order })
            .await?
        {
            EngineResponse::Assigned(assignment) => Ok(assignment),
            other => unreachable!("AssignManual must return Assigned, got {:?}", other),
        }
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, barista: BaristaId, order: OrderId) -> EngineResult<Order> {
        match self
            .request(EngineRequest::Complete { barista, order })
            .await?
        {
            EngineResponse::Completed(order) => Ok(order),
            other => unreachable!("Complete must return Completed, got {:?}", other),
        }
    }

    /// Returns the barista's current order to the queue.
    #[instrument(skip(self))]
    pub async fn unassign(&self, barista: BaristaId) -> EngineResult<Order> {
        match self.request(EngineRequest::Unassign(barista)).await? {
            EngineResponse::Unassigned(order) => Ok(order),
            other => unreachable!("Unassign must return Unassigned, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ConflictError, EngineError};
    use crate::framework::mock::{create_mock_client, expect_request, MockClient};

    #[tokio::test]
    async fn test_manual_assign_sends_both_ids() {
        let (client, mut receiver) = create_mock_client::<Engine>(10);
        let barista_client = BaristaClient::new(client);

        let task =
            tokio::spawn(async move { barista_client.assign(BaristaId(2), OrderId(5)).await });

        let (request, responder) = expect_request(&mut receiver)
            .await
            .expect("Expected AssignManual request");
        match request {
            EngineRequest::AssignManual { barista, order } => {
                assert_eq!(barista, BaristaId(2));
                assert_eq!(order, OrderId(5));
            }
            other => panic!("Expected AssignManual, got {:?}", other),
        }
        responder
            .send(Ok(EngineResponse::Assigned(Assignment {
                barista_id: BaristaId(2),
                order_id: OrderId(5),
                skipped: vec![],
            })))
            .unwrap();

        let assignment = task.await.unwrap().unwrap();
        assert_eq!(assignment.order_id, OrderId(5));
    }

    #[tokio::test]
    async fn test_conflicts_reach_the_caller() {
        let mut mock = MockClient::<Engine>::new();
        mock.expect(|r| matches!(r, EngineRequest::Complete { .. }))
            .return_err(
                ConflictError::NoActiveOrder {
                    barista: BaristaId(1),
                }
                .into(),
            );
        mock.expect(|r| matches!(r, EngineRequest::AssignNext))
            .return_ok(EngineResponse::Assignments(vec![]));

        let barista_client = BaristaClient::new(mock.client());
        let result = barista_client.complete(BaristaId(1), OrderId(1)).await;
        assert_eq!(result.unwrap_err().kind(), "NoActiveOrderError");
        assert!(barista_client.assign_next().await.unwrap().is_empty());
        mock.verify();
    }

    #[tokio::test]
    async fn test_closed_actor_is_unavailable() {
        let (client, receiver) = create_mock_client::<Engine>(1);
        drop(receiver);
        let barista_client = BaristaClient::new(client);
        let err = barista_client.list().await.unwrap_err();
        assert!(matches!(err, EngineError::Actor(_)));
        assert_eq!(err.kind(), "UnavailableError");
    }
}
