//! # Organization API Handlers
//!
//! The caller's own organization profile, its users and payments, and the
//! public catalogue of billing packages.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use super::types::{BillingPackageInfo, ListResponse, OrganizationInfo, PaymentInfo, UserInfo};
use crate::auth::{OperatorAuth, OrganizationContext, OrganizationHeader};
use crate::error::{ApiError, not_found};
use crate::repositories::NewUser;
use crate::server::AppState;

/// Profile, quotas and credit balance of the calling organization
#[utoipa::path(
    get,
    path = "/organization",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    responses(
        (status = 200, description = "Organization", body = OrganizationInfo),
        (status = 404, description = "Organization not found", body = ApiError)
    ),
    tag = "organization"
)]
pub async fn get_organization(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
) -> Result<Json<OrganizationInfo>, ApiError> {
    state
        .organizations()
        .find(ctx.organization_id)
        .await?
        .map(|org| Json(org.into()))
        .ok_or_else(|| not_found("Organization not found"))
}

#[utoipa::path(
    get,
    path = "/users",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    responses(
        (status = 200, description = "Users of the organization", body = ListResponse<UserInfo>)
    ),
    tag = "organization"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
) -> Result<Json<ListResponse<UserInfo>>, ApiError> {
    let users = state.users().list(ctx.organization_id).await?;
    Ok(Json(ListResponse::from_models(users)))
}

/// Adds a user, subject to the organization's user quota
#[utoipa::path(
    post,
    path = "/users",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = UserInfo),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 409, description = "Email taken or user quota exhausted", body = ApiError)
    ),
    tag = "organization"
)]
pub async fn create_user(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    let Json(input) = payload?;
    let user = state.users().create(ctx.organization_id, input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    security(("bearer_auth" = [])),
    params(OrganizationHeader, ("id" = String, Path, description = "User id")),
    responses(
        (status = 204, description = "User absent for this organization")
    ),
    tag = "organization"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.users().delete(id, ctx.organization_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/payments",
    security(("bearer_auth" = [])),
    params(OrganizationHeader),
    responses(
        (status = 200, description = "Payments of the organization", body = ListResponse<PaymentInfo>)
    ),
    tag = "organization"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    _operator: OperatorAuth,
    ctx: OrganizationContext,
) -> Result<Json<ListResponse<PaymentInfo>>, ApiError> {
    let payments = state.payments().list(ctx.organization_id).await?;
    Ok(Json(ListResponse::from_models(payments)))
}

/// Active billing packages, cheapest first
#[utoipa::path(
    get,
    path = "/billing-packages",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available billing packages", body = ListResponse<BillingPackageInfo>)
    ),
    tag = "organization"
)]
pub async fn list_billing_packages(
    State(state): State<AppState>,
    _operator: OperatorAuth,
) -> Result<Json<ListResponse<BillingPackageInfo>>, ApiError> {
    let packages = state.billing_packages().list_active().await?;
    Ok(Json(ListResponse::from_models(packages)))
}
