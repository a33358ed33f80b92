//! # Agents API Handlers
//!
//! CRUD over the calling organization's voice agents. Deletes answer 204
//! whether or not the agent existed for this organization.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use super::types::{AgentInfo, PageQuery, PaginatedResponse};
use crate::auth::{OperatorAuth, OrganizationContext, OrganizationHeader};
use crate::error::{ApiError, not_found};
use crate::repositories::{AgentChanges, NewAgent};
use crate::server::AppState;

/// Lists the organization's agents, oldest first
#[utoipa::path(
    get,
    path = "/agents",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, PageQuery),
    responses(
        (status = 200, description = "One page of agents", body = PaginatedResponse<AgentInfo>),
        (status = 400, description = "Invalid cursor", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "agents"
)]
pub async fn list_agents(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<AgentInfo>>, ApiError> {
    let limit = state.config.page_size(query.limit);
    let page = state
        .agents()
        .list_page(ctx.organization_id, query.cursor.as_deref(), limit)
        .await?;

    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Creates an agent, subject to the organization's agent quota
#[utoipa::path(
    post,
    path = "/agents",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    request_body = NewAgent,
    responses(
        (status = 201, description = "Agent created", body = AgentInfo),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "Organization not found", body = ApiError),
        (status = 409, description = "Agent quota exhausted", body = ApiError)
    ),
    tag = "agents"
)]
pub async fn create_agent(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    payload: Result<Json<NewAgent>, JsonRejection>,
) -> Result<(StatusCode, Json<AgentInfo>), ApiError> {
    let Json(input) = payload?;
    let agent = state.agents().create(ctx.organization_id, input).await?;

    Ok((StatusCode::CREATED, Json(agent.into())))
}

#[utoipa::path(
    get,
    path = "/agents/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Agent id")),
    responses(
        (status = 200, description = "Agent", body = AgentInfo),
        (status = 404, description = "No such agent in this organization", body = ApiError)
    ),
    tag = "agents"
)]
pub async fn get_agent(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<Json<AgentInfo>, ApiError> {
    state
        .agents()
        .find(id, ctx.organization_id)
        .await?
        .map(|agent| Json(agent.into()))
        .ok_or_else(|| not_found("Agent not found"))
}

/// Applies a partial update
#[utoipa::path(
    patch,
    path = "/agents/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Agent id")),
    request_body = AgentChanges,
    responses(
        (status = 200, description = "Updated agent", body = AgentInfo),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "No such agent in this organization", body = ApiError)
    ),
    tag = "agents"
)]
pub async fn update_agent(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
    payload: Result<Json<AgentChanges>, JsonRejection>,
) -> Result<Json<AgentInfo>, ApiError> {
    let Json(changes) = payload?;
    state
        .agents()
        .update(id, ctx.organization_id, changes)
        .await?
        .map(|agent| Json(agent.into()))
        .ok_or_else(|| not_found("Agent not found"))
}

/// Deletes an agent of the calling organization
#[utoipa::path(
    delete,
    path = "/agents/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Agent id")),
    responses(
        (status = 204, description = "Agent absent for this organization"),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "agents"
)]
pub async fn delete_agent(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.agents().delete(id, ctx.organization_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
