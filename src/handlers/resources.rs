//! # Approval-Tracked Resource Handlers
//!
//! Integrations, phone numbers and RAG configurations share one shape:
//! tenants create them (status `PENDING_APPROVAL`), list them optionally
//! filtered by status, and delete them. Status transitions live under
//! `/admin`.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use super::types::{
    IntegrationInfo, ListResponse, PhoneNumberInfo, RagConfigurationInfo, StatusFilterQuery,
};
use crate::auth::{OperatorAuth, OrganizationContext, OrganizationHeader};
use crate::error::ApiError;
use crate::models::ApprovalTracked;
use crate::repositories::{
    NewIntegration, NewPhoneNumber, NewRagConfiguration, ScopedRepository,
};
use crate::server::AppState;

async fn list_filtered<E, T>(
    repo: ScopedRepository<E>,
    organization_id: Uuid,
    filter: StatusFilterQuery,
) -> Result<Json<ListResponse<T>>, ApiError>
where
    E: ApprovalTracked,
    T: From<E::Model>,
{
    let rows = match filter.status {
        Some(status) => repo.list_by_status(organization_id, status).await?,
        None => repo.list(organization_id).await?,
    };
    Ok(Json(ListResponse::from_models(rows)))
}

#[utoipa::path(
    get,
    path = "/integrations",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, StatusFilterQuery),
    responses(
        (status = 200, description = "Integrations of the organization", body = ListResponse<IntegrationInfo>),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "resources"
)]
pub async fn list_integrations(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Query(filter): Query<StatusFilterQuery>,
) -> Result<Json<ListResponse<IntegrationInfo>>, ApiError> {
    list_filtered(state.integrations(), ctx.organization_id, filter).await
}

#[utoipa::path(
    post,
    path = "/integrations",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    request_body = NewIntegration,
    responses(
        (status = 201, description = "Integration requested", body = IntegrationInfo),
        (status = 400, description = "Validation error", body = ApiError)
    ),
    tag = "resources"
)]
pub async fn create_integration(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    payload: Result<Json<NewIntegration>, JsonRejection>,
) -> Result<(StatusCode, Json<IntegrationInfo>), ApiError> {
    let Json(input) = payload?;
    let integration = state
        .integrations()
        .create(ctx.organization_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(integration.into())))
}

#[utoipa::path(
    delete,
    path = "/integrations/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Integration id")),
    responses(
        (status = 204, description = "Integration absent for this organization")
    ),
    tag = "resources"
)]
pub async fn delete_integration(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.integrations().delete(id, ctx.organization_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/phone-numbers",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, StatusFilterQuery),
    responses(
        (status = 200, description = "Phone numbers of the organization", body = ListResponse<PhoneNumberInfo>),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "resources"
)]
pub async fn list_phone_numbers(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Query(filter): Query<StatusFilterQuery>,
) -> Result<Json<ListResponse<PhoneNumberInfo>>, ApiError> {
    list_filtered(state.phone_numbers(), ctx.organization_id, filter).await
}

#[utoipa::path(
    post,
    path = "/phone-numbers",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    request_body = NewPhoneNumber,
    responses(
        (status = 201, description = "Phone number registered", body = PhoneNumberInfo),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "Agent not found in this organization", body = ApiError),
        (status = 409, description = "Number already registered", body = ApiError)
    ),
    tag = "resources"
)]
pub async fn create_phone_number(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    payload: Result<Json<NewPhoneNumber>, JsonRejection>,
) -> Result<(StatusCode, Json<PhoneNumberInfo>), ApiError> {
    let Json(input) = payload?;
    let phone = state
        .phone_numbers()
        .create(ctx.organization_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(phone.into())))
}

#[utoipa::path(
    delete,
    path = "/phone-numbers/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "Phone number id")),
    responses(
        (status = 204, description = "Phone number absent for this organization")
    ),
    tag = "resources"
)]
pub async fn delete_phone_number(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.phone_numbers().delete(id, ctx.organization_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/rag-configurations",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, StatusFilterQuery),
    responses(
        (status = 200, description = "RAG configurations of the organization", body = ListResponse<RagConfigurationInfo>),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    tag = "resources"
)]
pub async fn list_rag_configurations(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Query(filter): Query<StatusFilterQuery>,
) -> Result<Json<ListResponse<RagConfigurationInfo>>, ApiError> {
    list_filtered(state.rag_configurations(), ctx.organization_id, filter).await
}

#[utoipa::path(
    post,
    path = "/rag-configurations",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    request_body = NewRagConfiguration,
    responses(
        (status = 201, description = "RAG configuration stored", body = RagConfigurationInfo),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "Agent not found in this organization", body = ApiError)
    ),
    tag = "resources"
)]
pub async fn create_rag_configuration(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    payload: Result<Json<NewRagConfiguration>, JsonRejection>,
) -> Result<(StatusCode, Json<RagConfigurationInfo>), ApiError> {
    let Json(input) = payload?;
    let config = state
        .rag_configurations()
        .create(ctx.organization_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(config.into())))
}

#[utoipa::path(
    delete,
    path = "/rag-configurations/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "RAG configuration id")),
    responses(
        (status = 204, description = "RAG configuration absent for this organization")
    ),
    tag = "resources"
)]
pub async fn delete_rag_configuration(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .rag_configurations()
        .delete(id, ctx.organization_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
