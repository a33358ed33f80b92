//! # Administrative Handlers
//!
//! Routes reserved for admin tokens: approval transitions, the billing
//! catalogue, organization provisioning and credit bookkeeping. These address
//! rows by id without an organization header.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use super::types::{
    ApprovalUpdateRequest, AssignPackageRequest, BillingPackageInfo, OrganizationInfo, PaymentInfo,
};
use crate::auth::AdminAuth;
use crate::error::{ApiError, not_found};
use crate::repositories::{NewBillingPackage, NewOrganization, NewPayment};
use crate::server::AppState;

/// Moves an integration, phone number or RAG configuration to a new
/// approval status.
#[utoipa::path(
    put,
    path = "/admin/{kind}/{id}/status",
    security(("bearer_auth" = [])),
    params(
        ("kind" = String, Path, description = "One of integrations, phone-numbers, rag-configurations"),
        ("id" = String, Path, description = "Resource id")
    ),
    request_body = ApprovalUpdateRequest,
    responses(
        (status = 204, description = "Status updated"),
        (status = 403, description = "Admin token required", body = ApiError),
        (status = 404, description = "Unknown resource kind or id", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn set_approval_status(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path((kind, id)): Path<(String, Uuid)>,
    payload: Result<Json<ApprovalUpdateRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(update) = payload?;
    let updated = match kind.as_str() {
        "integrations" => {
            state
                .integrations()
                .set_approval_status(id, update.status)
                .await?
        }
        "phone-numbers" => {
            state
                .phone_numbers()
                .set_approval_status(id, update.status)
                .await?
        }
        "rag-configurations" => {
            state
                .rag_configurations()
                .set_approval_status(id, update.status)
                .await?
        }
        _ => return Err(not_found("Unknown resource kind")),
    };

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Resource not found"))
    }
}

#[utoipa::path(
    post,
    path = "/admin/billing-packages",
    security(("bearer_auth" = [])),
    request_body = NewBillingPackage,
    responses(
        (status = 201, description = "Billing package created", body = BillingPackageInfo),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 409, description = "Package name taken", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_billing_package(
    State(state): State<AppState>,
    _admin: AdminAuth,
    payload: Result<Json<NewBillingPackage>, JsonRejection>,
) -> Result<(StatusCode, Json<BillingPackageInfo>), ApiError> {
    let Json(input) = payload?;
    let package = state.billing_packages().create(input).await?;
    Ok((StatusCode::CREATED, Json(package.into())))
}

/// Provisions a tenant, optionally on a billing package
#[utoipa::path(
    post,
    path = "/admin/organizations",
    security(("bearer_auth" = [])),
    request_body = NewOrganization,
    responses(
        (status = 201, description = "Organization created", body = OrganizationInfo),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "Billing package not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn create_organization(
    State(state): State<AppState>,
    _admin: AdminAuth,
    payload: Result<Json<NewOrganization>, JsonRejection>,
) -> Result<(StatusCode, Json<OrganizationInfo>), ApiError> {
    let Json(input) = payload?;
    let org = state.organizations().create(input).await?;
    Ok((StatusCode::CREATED, Json(org.into())))
}

#[utoipa::path(
    put,
    path = "/admin/organizations/{id}/billing-package",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Organization id")),
    request_body = AssignPackageRequest,
    responses(
        (status = 200, description = "Quotas copied from the package", body = OrganizationInfo),
        (status = 400, description = "Package inactive", body = ApiError),
        (status = 404, description = "Organization or package not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn assign_billing_package(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    payload: Result<Json<AssignPackageRequest>, JsonRejection>,
) -> Result<Json<OrganizationInfo>, ApiError> {
    let Json(request) = payload?;
    let org = state
        .organizations()
        .assign_billing_package(id, request.billing_package_id)
        .await?;
    Ok(Json(org.into()))
}

/// Starts a new billing period by zeroing used credits
#[utoipa::path(
    post,
    path = "/admin/organizations/{id}/credits/reset",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Organization id")),
    responses(
        (status = 204, description = "Credits reset"),
        (status = 404, description = "Organization not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn reset_credits(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.organizations().reset_credits(id).await?;
    tracing::info!(target: "audit", organization_id = %id, "Credits reset");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/admin/organizations/{id}/payments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Organization id")),
    request_body = NewPayment,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentInfo),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "Organization not found", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    payload: Result<Json<NewPayment>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentInfo>), ApiError> {
    let Json(input) = payload?;
    let payment = state.payments().record(id, input).await?;
    Ok((StatusCode::CREATED, Json(payment.into())))
}
