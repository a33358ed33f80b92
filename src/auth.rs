//! # Authentication and Authorization
//!
//! Operator bearer authentication plus the `X-Organization-Id` header that
//! selects the tenant every scoped operation runs against. Administrative
//! routes use a separate token list.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, unauthorized, validation_error};
use crate::server::AppState;

pub const ORGANIZATION_HEADER: &str = "X-Organization-Id";

/// The organization a request acts for, taken from `X-Organization-Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationContext {
    pub organization_id: Uuid,
}

/// Marker type for authenticated operator requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorAuth;

/// Marker type for requests authenticated with an admin token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminAuth;

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Validates the operator bearer token and the organization header.
pub async fn operator_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;
    if !token_matches(&config.operator_tokens, token) {
        return Err(unauthorized(Some("Invalid bearer token")));
    }

    let organization_id = extract_organization_id(request.headers())?;
    tracing::debug!(organization_id = %organization_id, "Authenticated operator request");

    request
        .extensions_mut()
        .insert(OrganizationContext { organization_id });
    request.extensions_mut().insert(OperatorAuth);

    Ok(next.run(request).await)
}

/// Validates an admin bearer token. Operator tokens are recognised but
/// refused with 403.
pub async fn admin_auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    if !token_matches(&config.admin_tokens, token) {
        if token_matches(&config.operator_tokens, token) {
            tracing::warn!(target: "audit", "Operator token used on admin route");
            return Err(forbidden(Some("Admin token required")));
        }
        return Err(unauthorized(Some("Invalid bearer token")));
    }

    request.extensions_mut().insert(AdminAuth);
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))?
        .to_str()
        .map_err(|_| unauthorized(Some("Invalid Authorization header")))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
}

/// Constant-time comparison against every configured token
fn token_matches(configured: &[String], token: &str) -> bool {
    configured
        .iter()
        .fold(false, |matched, candidate| {
            let equal: bool = candidate.as_bytes().ct_eq(token.as_bytes()).into();
            matched | equal
        })
}

fn extract_organization_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let header_value = headers
        .get(ORGANIZATION_HEADER)
        .ok_or_else(|| {
            validation_error(
                "Missing required header",
                serde_json::json!({ ORGANIZATION_HEADER: "Required header is missing" }),
            )
        })?
        .to_str()
        .map_err(|_| {
            validation_error(
                "Invalid organization header",
                serde_json::json!({ ORGANIZATION_HEADER: "Header must be valid UTF-8" }),
            )
        })?;

    header_value.trim().parse::<Uuid>().map_err(|_| {
        validation_error(
            "Invalid organization ID",
            serde_json::json!({ ORGANIZATION_HEADER: "Must be a valid UUID" }),
        )
    })
}

/// OpenAPI header parameter for X-Organization-Id
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Header)]
pub struct OrganizationHeader {
    /// Organization (tenant) identifier that scopes the request
    #[serde(rename = "X-Organization-Id")]
    #[param(rename = "X-Organization-Id", value_type = String)]
    pub organization_id: String,
}

impl<S> FromRequestParts<S> for OrganizationContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OrganizationContext>()
            .copied()
            .ok_or_else(|| {
                validation_error(
                    "Organization context missing",
                    serde_json::json!({ ORGANIZATION_HEADER: "Organization context not present" }),
                )
            })
    }
}

impl<S> FromRequestParts<S> for OperatorAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OperatorAuth>()
            .copied()
            .ok_or_else(|| unauthorized(Some("Operator authentication required")))
    }
}

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminAuth>()
            .copied()
            .ok_or_else(|| forbidden(Some("Admin token required")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn create_test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            operator_tokens: vec!["test-token-123".to_string()],
            admin_tokens: vec!["admin-token-456".to_string()],
            ..Default::default()
        })
    }

    async fn organization_handler(ctx: OrganizationContext) -> String {
        ctx.organization_id.to_string()
    }

    async fn run_operator(config: Arc<AppConfig>, request: Request<Body>) -> Response {
        Router::new()
            .route("/test", get(organization_handler))
            .layer(axum::middleware::from_fn_with_state(
                config,
                operator_auth_middleware,
            ))
            .oneshot(request)
            .await
            .unwrap()
    }

    async fn run_admin(config: Arc<AppConfig>, request: Request<Body>) -> Response {
        async fn handler(_admin: AdminAuth) -> &'static str {
            "OK"
        }

        Router::new()
            .route("/admin", get(handler))
            .layer(axum::middleware::from_fn_with_state(
                config,
                admin_auth_middleware,
            ))
            .oneshot(request)
            .await
            .unwrap()
    }

    fn operator_request(token: Option<&str>, organization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", token);
        }
        if let Some(organization) = organization {
            builder = builder.header(ORGANIZATION_HEADER, organization);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_auth_header_returns_401() {
        let org = Uuid::new_v4().to_string();
        let response = run_operator(create_test_config(), operator_request(None, Some(&org))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_auth_scheme_returns_401() {
        let org = Uuid::new_v4().to_string();
        let response = run_operator(
            create_test_config(),
            operator_request(Some("Basic dGVzdDoxMjM="), Some(&org)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_returns_401() {
        let org = Uuid::new_v4().to_string();
        let response = run_operator(
            create_test_config(),
            operator_request(Some("Bearer wrong-token"), Some(&org)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_organization_header_returns_400() {
        let response = run_operator(
            create_test_config(),
            operator_request(Some("Bearer test-token-123"), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_organization_uuid_returns_400() {
        let response = run_operator(
            create_test_config(),
            operator_request(Some("Bearer test-token-123"), Some("not-a-uuid")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_request_exposes_organization_context() {
        let org = Uuid::new_v4();
        let response = run_operator(
            create_test_config(),
            operator_request(Some("Bearer test-token-123"), Some(&org.to_string())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, org.to_string().as_bytes());
    }

    #[tokio::test]
    async fn admin_route_distinguishes_operator_tokens() {
        let config = create_test_config();
        let request = |token: &str| {
            Request::builder()
                .uri("/admin")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let ok = run_admin(Arc::clone(&config), request("admin-token-456")).await;
        assert_eq!(ok.status(), StatusCode::OK);

        let operator = run_admin(Arc::clone(&config), request("test-token-123")).await;
        assert_eq!(operator.status(), StatusCode::FORBIDDEN);

        let unknown = run_admin(config, request("nope")).await;
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn token_matching_checks_every_candidate() {
        let tokens = vec!["token-one".to_string(), "token-two".to_string()];
        assert!(token_matches(&tokens, "token-one"));
        assert!(token_matches(&tokens, "token-two"));
        assert!(!token_matches(&tokens, "token-thr"));
        assert!(!token_matches(&[], "token-one"));
    }
}
