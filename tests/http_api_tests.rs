//! End-to-end HTTP tests against the assembled router.

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use voice_admin::config::AppConfig;
use voice_admin::models::ApprovalStatus;
use voice_admin::repositories::{AgentRepository, IntegrationRepository, NewIntegration};
use voice_admin::server::{AppState, create_app};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{create_test_agent, create_test_organization, setup_test_db};

const OPERATOR: &str = "Bearer operator-token";
const ADMIN: &str = "Bearer admin-token";

async fn test_app() -> Result<(Router, AppState)> {
    let config = AppConfig {
        operator_tokens: vec!["operator-token".to_string()],
        admin_tokens: vec!["admin-token".to_string()],
        ..AppConfig::default()
    };
    let state = AppState::new(config, setup_test_db().await?);
    Ok((create_app(state.clone()), state))
}

fn request(method: &str, uri: &str, token: &str, org: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, token);
    if let Some(org) = org {
        builder = builder.header("X-Organization-Id", org.to_string());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn delete_agent_answers_204_for_own_foreign_and_missing() -> Result<()> {
    let (app, state) = test_app().await?;
    let org_a = create_test_organization(&state.db).await?;
    let org_b = create_test_organization(&state.db).await?;
    let agent = create_test_agent(&state.db, org_a, "Receptionist").await?;
    let uri = format!("/agents/{}", agent.id);

    let foreign = app
        .clone()
        .oneshot(request("DELETE", &uri, OPERATOR, Some(org_b), None))
        .await?;
    assert_eq!(foreign.status(), StatusCode::NO_CONTENT);
    let agents = AgentRepository::new(Arc::clone(&state.db), true);
    assert!(agents.exists(agent.id, org_a).await?);

    let own = app
        .clone()
        .oneshot(request("DELETE", &uri, OPERATOR, Some(org_a), None))
        .await?;
    assert_eq!(own.status(), StatusCode::NO_CONTENT);
    assert!(!agents.exists(agent.id, org_a).await?);

    let missing = app
        .oneshot(request("DELETE", &uri, OPERATOR, Some(org_a), None))
        .await?;
    assert_eq!(missing.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn tenant_routes_require_token_and_organization() -> Result<()> {
    let (app, _state) = test_app().await?;

    let no_token = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/agents")
                .header("X-Organization-Id", Uuid::new_v4().to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(no_token.status(), StatusCode::UNAUTHORIZED);

    let no_org = app
        .oneshot(request("GET", "/agents", OPERATOR, None, None))
        .await?;
    assert_eq!(no_org.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn agent_lifecycle_over_http() -> Result<()> {
    let (app, state) = test_app().await?;
    let org = create_test_organization(&state.db).await?;

    let created = app
        .clone()
        .oneshot(request(
            "POST",
            "/agents",
            OPERATOR,
            Some(org),
            Some(json!({ "name": "Concierge", "first_message": "Hi there" })),
        ))
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = json_body(created).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["language"], "en");

    let patched = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/agents/{}", id),
            OPERATOR,
            Some(org),
            Some(json!({ "name": "Night concierge" })),
        ))
        .await?;
    assert_eq!(patched.status(), StatusCode::OK);
    assert_eq!(json_body(patched).await["name"], "Night concierge");

    let listed = app
        .clone()
        .oneshot(request("GET", "/agents?limit=10", OPERATOR, Some(org), None))
        .await?;
    let listed = json_body(listed).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed["has_more"], false);

    let foreign = app
        .oneshot(request(
            "GET",
            &format!("/agents/{}", id),
            OPERATOR,
            Some(Uuid::new_v4()),
            None,
        ))
        .await?;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    assert!(foreign.headers().contains_key("x-trace-id"));
    let problem = json_body(foreign).await;
    assert_eq!(problem["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn blank_agent_name_is_rejected() -> Result<()> {
    let (app, state) = test_app().await?;
    let org = create_test_organization(&state.db).await?;

    let response = app
        .oneshot(request("POST", "/agents", OPERATOR, Some(org), Some(json!({ "name": "" }))))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn call_log_append_charges_credits() -> Result<()> {
    let (app, state) = test_app().await?;
    let org = create_test_organization(&state.db).await?;
    let agent = create_test_agent(&state.db, org, "Support").await?;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/call-logs",
            OPERATOR,
            Some(org),
            Some(json!({
                "agent_id": agent.id,
                "direction": "inbound",
                "status": "done",
                "duration_seconds": 90,
                "cost_credits": 30
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["credits_charged"], true);

    let org_info = app
        .oneshot(request("GET", "/organization", OPERATOR, Some(org), None))
        .await?;
    let org_info = json_body(org_info).await;
    assert_eq!(org_info["used_credits"], 30);
    assert_eq!(org_info["remaining_credits"], 970);
    Ok(())
}

#[tokio::test]
async fn approval_transitions_require_admin_token() -> Result<()> {
    let (app, state) = test_app().await?;
    let org = create_test_organization(&state.db).await?;
    let integrations = IntegrationRepository::new(Arc::clone(&state.db), true);
    let integration = integrations
        .create(
            org,
            NewIntegration {
                provider: "hubspot".to_string(),
                name: "CRM".to_string(),
                config: None,
            },
        )
        .await?;
    let uri = format!("/admin/integrations/{}/status", integration.id);
    let body = json!({ "status": "ACTIVE" });

    let as_operator = app
        .clone()
        .oneshot(request("PUT", &uri, OPERATOR, None, Some(body.clone())))
        .await?;
    assert_eq!(as_operator.status(), StatusCode::FORBIDDEN);

    let as_admin = app
        .clone()
        .oneshot(request("PUT", &uri, ADMIN, None, Some(body.clone())))
        .await?;
    assert_eq!(as_admin.status(), StatusCode::NO_CONTENT);
    let stored = integrations.find(integration.id, org).await?.unwrap();
    assert_eq!(stored.status, ApprovalStatus::Active);

    let unknown_kind = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/admin/widgets/{}/status", integration.id),
            ADMIN,
            None,
            Some(body.clone()),
        ))
        .await?;
    assert_eq!(unknown_kind.status(), StatusCode::NOT_FOUND);

    let filtered = app
        .oneshot(request(
            "GET",
            "/integrations?status=ACTIVE",
            OPERATOR,
            Some(org),
            None,
        ))
        .await?;
    let filtered = json_body(filtered).await;
    assert_eq!(filtered["data"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn agent_quota_maps_to_409() -> Result<()> {
    let (app, state) = test_app().await?;
    let created = app
        .clone()
        .oneshot(request(
            "POST",
            "/admin/organizations",
            ADMIN,
            None,
            Some(json!({ "name": "Tiny Co" })),
        ))
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let org: Uuid = json_body(created).await["id"].as_str().unwrap().parse()?;
    create_test_agent(&state.db, org, "Only").await?;

    let response = app
        .oneshot(request(
            "POST",
            "/agents",
            OPERATOR,
            Some(org),
            Some(json!({ "name": "One too many" })),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let problem = json_body(response).await;
    assert_eq!(problem["code"], "QUOTA_EXCEEDED");
    assert_eq!(problem["details"]["resource"], "agents");
    Ok(())
}
