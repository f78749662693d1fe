//! # HTTP API
//!
//! The JSON surface the web client polls. Handlers never touch engine state
//! directly: each request becomes one call on an [`OrderClient`] or
//! [`BaristaClient`], so HTTP traffic serializes with the periodic ticks
//! like any other engine request.
//!
//! Field names are camelCase and ids are strings (`order_7`, `barista-2`).

pub mod error;
pub mod handlers;

use crate::clients::{BaristaClient, OrderClient};
use crate::lifecycle::CafeSystem;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state: the two domain clients.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderClient,
    pub baristas: BaristaClient,
}

impl AppState {
    pub fn new(orders: OrderClient, baristas: BaristaClient) -> Self {
        Self { orders, baristas }
    }

    pub fn from_system(system: &CafeSystem) -> Self {
        Self::new(system.order_client.clone(), system.barista_client.clone())
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/menu", get(handlers::menu))
        // Orders
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route("/orders/:order_id", get(handlers::get_order))
        .route("/orders/:order_id/complete", post(handlers::complete_order))
        // Queue
        .route("/queue", get(handlers::queue))
        .route("/queue/rescore", post(handlers::rescore))
        .route("/queue/sweep", post(handlers::sweep))
        // Baristas
        .route("/baristas", get(handlers::list_baristas))
        .route("/baristas/stats", get(handlers::barista_stats))
        .route("/baristas/assign", post(handlers::assign_next))
        .route("/baristas/:barista_id", get(handlers::get_barista))
        .route(
            "/baristas/:barista_id/assign/:order_id",
            post(handlers::assign_manual),
        )
        .route("/baristas/:barista_id/unassign", post(handlers::unassign))
        .route(
            "/baristas/:barista_id/orders/:order_id/complete",
            post(handlers::complete_for_barista),
        )
        // Reporting
        .route("/metrics", get(handlers::metrics))
        .route("/metrics/fairness", get(handlers::fairness))
        // Alerts
        .route("/alerts", get(handlers::alerts))
        .route(
            "/alerts/:alert_id/acknowledge",
            post(handlers::acknowledge_alert),
        )
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()) // The web client runs on another origin
                .into_inner(),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::EngineConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn system() -> CafeSystem {
        system_with_clock().0
    }

    fn system_with_clock() -> (CafeSystem, ManualClock) {
        let config = EngineConfig::default()
            .with_rescore_interval(Duration::from_secs(3600))
            .with_sweep_interval(Duration::from_secs(3600));
        let clock = ManualClock::default();
        (CafeSystem::new(config, Arc::new(clock.clone())), clock)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_and_menu() {
        let system = system();
        let app = build_router(AppState::from_system(&system));

        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = call(&app, "GET", "/menu", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["menu"]["mocha"]["prepTime"], 6);
    }

    #[tokio::test]
    async fn test_submit_then_queue_round_trip() {
        let system = system();
        let app = build_router(AppState::from_system(&system));

        let (status, body) = call(
            &app,
            "POST",
            "/orders",
            Some(json!({"items": [{"drinkType": "espresso", "quantity": 1}], "regular": true})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "order_1");
        assert_eq!(body["position"], 1);
        assert_eq!(body["status"], "WAITING");

        let (status, body) = call(&app, "GET", "/queue", None).await;
        assert_eq!(status, StatusCode::OK);
        let waiting = body["waitingOrders"].as_array().unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0]["id"], "order_1");
        assert_eq!(waiting[0]["status"], "WAITING");
        // No wait yet: complexity 25 × (1 − 2/6) plus the loyalty bonus.
        let score = waiting[0]["priorityScore"].as_f64().unwrap();
        assert!((score - (25.0 * 4.0 / 6.0 + 10.0)).abs() < 1e-9);
        assert_eq!(body["stats"]["totalOrders"], 1);
        assert_eq!(body["baristas"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_error_bodies_carry_kind() {
        let system = system();
        let app = build_router(AppState::from_system(&system));

        let (status, body) = call(&app, "POST", "/orders", Some(json!({"items": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "ValidationError");

        let (status, body) = call(&app, "POST", "/orders", Some(json!({"items": "latte"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "ValidationError");

        let (status, body) = call(&app, "GET", "/orders/order_42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NotFoundError");

        let (status, body) = call(&app, "GET", "/baristas/barista-9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NotFoundError");

        let (status, body) = call(&app, "POST", "/baristas/barista-1/unassign", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "NoActiveOrderError");
    }

    #[tokio::test]
    async fn test_malformed_ids_are_json_not_found() {
        let system = system();
        let app = build_router(AppState::from_system(&system));

        for (method, uri) in [
            ("GET", "/orders/abc"),
            ("POST", "/orders/abc/complete"),
            ("GET", "/baristas/bob"),
            ("POST", "/baristas/bob/unassign"),
            ("POST", "/baristas/barista-1/assign/9f1c-uuid"),
            ("POST", "/baristas/bob/orders/order_1/complete"),
            ("POST", "/alerts/nope/acknowledge"),
        ] {
            let (status, body) = call(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
            assert_eq!(body["kind"], "NotFoundError", "{} {}", method, uri);
            assert!(body["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_alerts_over_http() {
        let (system, clock) = system_with_clock();
        let app = build_router(AppState::from_system(&system));
        call(
            &app,
            "POST",
            "/orders",
            Some(json!({"items": [{"drinkType": "mocha", "quantity": 1}]})),
        )
        .await;

        let (status, body) = call(&app, "GET", "/alerts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        clock.advance(Duration::from_secs(8 * 60));
        let (_, report) = call(&app, "POST", "/queue/sweep", None).await;
        assert_eq!(report["newAlerts"], json!(["alert_1"]));

        let (_, body) = call(&app, "GET", "/alerts", None).await;
        assert_eq!(body[0]["id"], "alert_1");
        assert_eq!(body[0]["type"], "APPROACHING_TIMEOUT");
        assert_eq!(body[0]["severity"], "WARNING");
        assert_eq!(body[0]["orderId"], "order_1");
        assert_eq!(body[0]["acknowledged"], false);

        let (status, body) = call(&app, "POST", "/alerts/alert_1/acknowledge", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["acknowledged"], true);

        let (status, body) = call(&app, "POST", "/alerts/alert_9/acknowledge", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NotFoundError");

        clock.advance(Duration::from_secs(2 * 60));
        call(&app, "POST", "/queue/sweep", None).await;
        let (_, body) = call(&app, "GET", "/alerts", None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["severity"], "CRITICAL");
        assert_eq!(body[0]["type"], "TIMED_OUT");
    }

    #[tokio::test]
    async fn test_assign_and_complete_over_http() {
        let system = system();
        let app = build_router(AppState::from_system(&system));
        call(
            &app,
            "POST",
            "/orders",
            Some(json!({"items": [{"drinkType": "latte", "quantity": 1}]})),
        )
        .await;

        let (status, body) = call(&app, "POST", "/baristas/assign", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["assignments"][0]["baristaId"], "barista-1");
        assert_eq!(body["assignments"][0]["orderId"], "order_1");

        let (status, body) = call(&app, "POST", "/baristas/barista-2/assign/order_1", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "OrderAlreadyAssignedError");

        let (status, body) = call(
            &app,
            "POST",
            "/baristas/barista-1/orders/order_1/complete",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], "COMPLETED");

        let (_, body) = call(&app, "GET", "/baristas/stats", None).await;
        assert_eq!(body["totalCompleted"], 1);

        let (_, body) = call(&app, "GET", "/metrics", None).await;
        assert_eq!(body["totalOrdersProcessed"], 1);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let system = system();
        let app = build_router(AppState::from_system(&system));
        let request = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}
