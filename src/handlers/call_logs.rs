//! # Call Log API Handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use super::types::{CallLogCreated, CallLogInfo, PaginatedResponse};
use crate::auth::{OperatorAuth, OrganizationContext, OrganizationHeader};
use crate::error::{ApiError, not_found};
use crate::repositories::NewCallLog;
use crate::server::AppState;

/// Query parameters for call log listing
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct ListCallLogsQuery {
    /// Only calls handled by this agent
    pub agent_id: Option<Uuid>,
    /// Opaque cursor for pagination continuation
    pub cursor: Option<String>,
    /// Maximum number of entries to return (max: 100)
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/call-logs",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ListCallLogsQuery),
    responses(
        (status = 200, description = "One page of call logs", body = PaginatedResponse<CallLogInfo>),
        (status = 400, description = "Invalid cursor", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "call-logs"
)]
pub async fn list_call_logs(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Query(query): Query<ListCallLogsQuery>,
) -> Result<Json<PaginatedResponse<CallLogInfo>>, ApiError> {
    let limit = state.config.page_size(query.limit);
    let page = state
        .call_logs()
        .list_page(
            ctx.organization_id,
            query.agent_id,
            query.cursor.as_deref(),
            limit,
        )
        .await?;

    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Records a finished call and charges its cost against the monthly credits.
///
/// The log is stored even when the allowance is exhausted; `credits_charged`
/// reports whether the charge applied.
#[utoipa::path(
    post,
    path = "/call-logs",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    request_body = NewCallLog,
    responses(
        (status = 201, description = "Call logged", body = CallLogCreated),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "Agent not found in this organization", body = ApiError)
    ),
    tag = "call-logs"
)]
pub async fn append_call_log(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    payload: Result<Json<NewCallLog>, JsonRejection>,
) -> Result<(StatusCode, Json<CallLogCreated>), ApiError> {
    let Json(input) = payload?;
    let entry = state.call_logs().append(ctx.organization_id, input).await?;

    let credits_charged = if entry.cost_credits > 0 {
        let charged = state
            .organizations()
            .consume_credits(ctx.organization_id, entry.cost_credits)
            .await?;
        if !charged {
            tracing::warn!(
                organization_id = %ctx.organization_id,
                call_log_id = %entry.id,
                cost_credits = entry.cost_credits,
                "Monthly credits exhausted"
            );
        }
        charged
    } else {
        true
    };

    Ok((
        StatusCode::CREATED,
        Json(CallLogCreated {
            call_log: entry.into(),
            credits_charged,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/call-logs/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Call log id")),
    responses(
        (status = 200, description = "Call log", body = CallLogInfo),
        (status = 404, description = "No such call log in this organization", body = ApiError)
    ),
    tag = "call-logs"
)]
pub async fn get_call_log(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<Json<CallLogInfo>, ApiError> {
    state
        .call_logs()
        .find(id, ctx.organization_id)
        .await?
        .map(|entry| Json(entry.into()))
        .ok_or_else(|| not_found("Call log not found"))
}
