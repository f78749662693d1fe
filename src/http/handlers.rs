//! Request handlers. Each one forwards to a client and shapes the reply.

use crate::http::error::ApiResult;
use crate::http::AppState;
use crate::model::{
    Alert, AlertId, BaristaId, BaristaView, FairnessReport, MetricsReport, Order, OrderCreate, OrderId, PoolStats,
    QueueSnapshot, Submitted, SweepReport,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

pub async fn health() -> Json<Value> {
    let environment = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "environment": environment,
    }))
}

pub async fn menu(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let menu = state.orders.menu().await?;
    Ok(Json(json!({ "menu": menu })))
}

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderCreate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Submitted>)> {
    let Json(params) = payload?;
    let submitted = state.orders.submit(params).await?;
    Ok((StatusCode::CREATED, Json(submitted)))
}

pub async fn list_orders(State(state): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list().await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    path: Result<Path<OrderId>, PathRejection>,
) -> ApiResult<Json<Order>> {
    let Path(order_id) = path?;
    Ok(Json(state.orders.get(order_id).await?))
}

pub async fn complete_order(
    State(state): State<AppState>,
    path: Result<Path<OrderId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(order_id) = path?;
    let order = state.orders.complete(order_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Order completed",
        "orderId": order.id,
        "order": order,
    })))
}

pub async fn queue(State(state): State<AppState>) -> ApiResult<Json<QueueSnapshot>> {
    Ok(Json(state.orders.queue().await?))
}

pub async fn rescore(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let rescored = state.orders.rescore().await?;
    Ok(Json(json!({ "status": "success", "rescored": rescored })))
}

pub async fn sweep(State(state): State<AppState>) -> ApiResult<Json<SweepReport>> {
    Ok(Json(state.orders.sweep().await?))
}

pub async fn list_baristas(State(state): State<AppState>) -> ApiResult<Json<Vec<BaristaView>>> {
    Ok(Json(state.baristas.list().await?))
}

pub async fn barista_stats(State(state): State<AppState>) -> ApiResult<Json<PoolStats>> {
    Ok(Json(state.baristas.stats().await?))
}

pub async fn get_barista(
    State(state): State<AppState>,
    path: Result<Path<BaristaId>, PathRejection>,
) -> ApiResult<Json<BaristaView>> {
    let Path(barista_id) = path?;
    Ok(Json(state.baristas.get(barista_id).await?))
}

pub async fn assign_next(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let made = state.baristas.assign_next().await?;
    let message = match made.len() {
        0 => "No assignment possible".to_string(),
        1 => "Order assigned to barista".to_string(),
        n => format!("{} orders assigned", n),
    };
    info!(assigned = made.len(), "Assignment cycle requested");
    Ok(Json(json!({
        "status": "success",
        "message": message,
        "assignments": made,
    })))
}

pub async fn assign_manual(
    State(state): State<AppState>,
    path: Result<Path<(BaristaId, OrderId)>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path((barista_id, order_id)) = path?;
    let assignment = state.baristas.assign(barista_id, order_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Order manually assigned to barista",
        "baristaId": assignment.barista_id,
        "orderId": assignment.order_id,
        "skipped": assignment.skipped,
    })))
}

pub async fn unassign(
    State(state): State<AppState>,
    path: Result<Path<BaristaId>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(barista_id) = path?;
    let order = state.baristas.unassign(barista_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Order returned to queue",
        "baristaId": barista_id,
        "order": order,
    })))
}

pub async fn complete_for_barista(
    State(state): State<AppState>,
    path: Result<Path<(BaristaId, OrderId)>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path((barista_id, order_id)) = path?;
    let order = state.baristas.complete(barista_id, order_id).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Order completed",
        "orderId": order.id,
        "order": order,
    })))
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<Json<MetricsReport>> {
    Ok(Json(state.orders.metrics().await?))
}

pub async fn fairness(State(state): State<AppState>) -> ApiResult<Json<FairnessReport>> {
    Ok(Json(state.orders.fairness().await?))
}

pub async fn alerts(State(state): State<AppState>) -> ApiResult<Json<Vec<Alert>>> {
    Ok(Json(state.orders.alerts().await?))
}

pub async fn acknowledge_alert(
    State(state): State<AppState>,
    path: Result<Path<AlertId>, PathRejection>,
) -> ApiResult<Json<Alert>> {
    let Path(alert_id) = path?;
    Ok(Json(state.orders.acknowledge_alert(alert_id).await?))
}

/// Fallback for unknown routes, so they also answer with `{kind, message}`.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "kind": "NotFoundError", "message": "No such route" })),
    )
}

