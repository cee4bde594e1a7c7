use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use ledger_domain::{validate_new_transaction, AuditRecord, QueueMessage, Transaction, TransactionStatus};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 100;

/// Out-of-range or unparseable values revert to the default rather than
/// clamping to the nearest bound — only `1..=100` is honored as given.
fn resolve_limit(raw: Option<i64>) -> i64 {
    match raw {
        Some(v) if (MIN_LIMIT..=MAX_LIMIT).contains(&v) => v,
        _ => DEFAULT_LIMIT,
    }
}

fn clamp_offset(raw: Option<i64>) -> i64 {
    raw.unwrap_or(0).max(0)
}

// ── Liveness / readiness / health ───────────────────────────────────────────

pub async fn live() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.health().await?;
    Ok(Json(json!({ "status": "ready" })))
}

/// Composite probe: SQL, then object store, then queue. Short-circuits on
/// the first failure and names which dependency is down.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .store
        .health()
        .await
        .map_err(|e| ApiError::service_unavailable(format!("sql store unhealthy: {e}")))?;
    state
        .objects
        .health()
        .await
        .map_err(|e| ApiError::service_unavailable(format!("object store unhealthy: {e}")))?;
    state
        .queue
        .health()
        .await
        .map_err(|e| ApiError::service_unavailable(format!("queue unhealthy: {e}")))?;
    Ok(Json(json!({
        "status": "healthy",
        "region": *state.region,
        "database": "ok",
        "s3": "ok",
        "sqs": "ok",
    })))
}

// ── Transactions ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IngestBody {
    pub from_account: String,
    pub to_account: String,
    pub amount: String,
}

/// Validate, persist, then best-effort audit and enqueue. Persistence
/// failures fail the request; audit/queue failures are logged and do not —
/// the transaction already exists and is discoverable via `GET`.
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(body): Json<IngestBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new = validate_new_transaction(&body.from_account, &body.to_account, &body.amount)?;
    let tx = Transaction::new(new, &state.region, Utc::now());

    let created = state.store.create(&tx).await?;

    let audit = AuditRecord {
        transaction_id: created.id,
        region: created.region.clone(),
        action: "transaction_created".to_string(),
        timestamp: Utc::now(),
        details: json!(created),
    };
    if let Err(e) = state.objects.write(&audit.key(), serde_json::to_vec(&audit).unwrap_or_default()).await {
        error!(transaction_id = %created.id, error = %e, "failed to write audit record");
    }

    let message = QueueMessage {
        transaction_id: created.id,
        region: created.region.clone(),
        action: "transaction_created".to_string(),
        timestamp: Utc::now(),
        data: json!(created),
    };
    if let Err(e) = state.queue.publish(&message).await {
        error!(transaction_id = %created.id, error = %e, "failed to publish queue message");
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "transaction": created, "message": "transaction created" })),
    ))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let tx = state.store.get_by_id(id).await?;
    Ok(Json(json!(tx)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let limit = resolve_limit(params.get("limit").and_then(|v| v.parse().ok()));
    let offset = clamp_offset(params.get("offset").and_then(|v| v.parse().ok()));
    let transactions = state.store.list(limit, offset).await?;
    Ok(Json(json!({ "transactions": transactions, "limit": limit, "offset": offset })))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.store.stats().await?;
    Ok(Json(json!(stats)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
}

/// Guarded forward-only transition. Rejects with 409 rather than touching
/// the store when the transition isn't legal from the current status.
pub async fn update_transaction_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<Value>, ApiError> {
    let new_status = TransactionStatus::from_str(&body.status)?;
    let current = state.store.get_by_id(id).await?;

    if !current.status.can_transition_to(new_status) {
        return Err(ApiError::conflict(format!(
            "cannot transition from '{}' to '{}'",
            current.status, new_status
        )));
    }

    state.store.update_status(id, new_status).await?;
    let updated = state.store.get_by_id(id).await?;
    Ok(Json(json!(updated)))
}

pub async fn not_found() -> impl IntoResponse {
    ApiError::not_found("route not found")
}
