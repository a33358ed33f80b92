//! # Batch Call API Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use super::types::{BatchCallDetail, BatchCallInfo, ListResponse, RecipientStatusUpdate};
use crate::auth::{OperatorAuth, OrganizationContext, OrganizationHeader};
use crate::error::{ApiError, not_found};
use crate::repositories::NewBatchCall;
use crate::server::AppState;

#[utoipa::path(
    get,
    path = "/batch-calls",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    responses(
        (status = 200, description = "Batch calls of the organization", body = ListResponse<BatchCallInfo>),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "batch-calls"
)]
pub async fn list_batch_calls(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
) -> Result<Json<ListResponse<BatchCallInfo>>, ApiError> {
    let batches = state.batch_calls().list(ctx.organization_id).await?;
    Ok(Json(ListResponse::from_models(batches)))
}

/// Schedules a batch of outbound calls for one agent
#[utoipa::path(
    post,
    path = "/batch-calls",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    request_body = NewBatchCall,
    responses(
        (status = 201, description = "Batch call created", body = BatchCallDetail),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "Agent not found in this organization", body = ApiError)
    ),
    tag = "batch-calls"
)]
pub async fn create_batch_call(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    payload: Result<Json<NewBatchCall>, JsonRejection>,
) -> Result<(StatusCode, Json<BatchCallDetail>), ApiError> {
    let Json(input) = payload?;
    let repo = state.batch_calls();
    let created = repo.create(ctx.organization_id, input).await?;
    let summary = repo
        .summary(created.batch.id, ctx.organization_id)
        .await?
        .ok_or_else(|| not_found("Batch call not found"))?;

    Ok((
        StatusCode::CREATED,
        Json(BatchCallDetail {
            batch: created.batch.into(),
            recipients: created.recipients.into_iter().map(Into::into).collect(),
            summary,
        }),
    ))
}

/// Batch call with its recipients and per-status counts
#[utoipa::path(
    get,
    path = "/batch-calls/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Batch call id")),
    responses(
        (status = 200, description = "Batch call", body = BatchCallDetail),
        (status = 404, description = "No such batch call in this organization", body = ApiError)
    ),
    tag = "batch-calls"
)]
pub async fn get_batch_call(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchCallDetail>, ApiError> {
    let repo = state.batch_calls();
    let batch = repo
        .find(id, ctx.organization_id)
        .await?
        .ok_or_else(|| not_found("Batch call not found"))?;
    let summary = repo
        .summary(id, ctx.organization_id)
        .await?
        .ok_or_else(|| not_found("Batch call not found"))?;
    let recipients = repo.recipients(id, ctx.organization_id).await?;

    Ok(Json(BatchCallDetail {
        batch: batch.into(),
        recipients: recipients.into_iter().map(Into::into).collect(),
        summary,
    }))
}

#[utoipa::path(
    delete,
    path = "/batch-calls/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Batch call id")),
    responses(
        (status = 204, description = "Batch call absent for this organization")
    ),
    tag = "batch-calls"
)]
pub async fn delete_batch_call(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.batch_calls().delete(id, ctx.organization_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Records the dialer's outcome for one recipient.
///
/// Unknown recipients and recipients of other organizations are ignored.
#[utoipa::path(
    put,
    path = "/batch-call-recipients/{id}/status",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Recipient id")),
    request_body = RecipientStatusUpdate,
    responses(
        (status = 204, description = "Status recorded"),
        (status = 400, description = "Invalid status", body = ApiError)
    ),
    tag = "batch-calls"
)]
pub async fn record_recipient_status(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
    payload: Result<Json<RecipientStatusUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(update) = payload?;
    state
        .batch_calls()
        .record_recipient_status(id, ctx.organization_id, update.status, update.external_call_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
