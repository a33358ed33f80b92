//! # Server Configuration
//!
//! Router assembly, shared state and the OpenAPI document.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{admin_auth_middleware, operator_auth_middleware};
use crate::config::AppConfig;
use crate::handlers;
use crate::repositories::{
    AgentRepository, BatchCallRepository, BillingPackageRepository, CallLogRepository,
    IntegrationRepository, OrganizationRepository, PaymentRepository, PhoneNumberRepository,
    RagConfigurationRepository, UserRepository,
};
use crate::telemetry::trace_id_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseConnection>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
        }
    }

    fn audit(&self) -> bool {
        self.config.audit_cross_tenant
    }

    pub fn agents(&self) -> AgentRepository {
        AgentRepository::new(Arc::clone(&self.db), self.audit())
    }

    pub fn call_logs(&self) -> CallLogRepository {
        CallLogRepository::new(Arc::clone(&self.db))
    }

    pub fn integrations(&self) -> IntegrationRepository {
        IntegrationRepository::new(Arc::clone(&self.db), self.audit())
    }

    pub fn phone_numbers(&self) -> PhoneNumberRepository {
        PhoneNumberRepository::new(Arc::clone(&self.db), self.audit())
    }

    pub fn rag_configurations(&self) -> RagConfigurationRepository {
        RagConfigurationRepository::new(Arc::clone(&self.db), self.audit())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(Arc::clone(&self.db), self.audit())
    }

    pub fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(Arc::clone(&self.db), self.audit())
    }

    pub fn batch_calls(&self) -> BatchCallRepository {
        BatchCallRepository::new(Arc::clone(&self.db), self.audit())
    }

    pub fn organizations(&self) -> OrganizationRepository {
        OrganizationRepository::new(Arc::clone(&self.db))
    }

    pub fn billing_packages(&self) -> BillingPackageRepository {
        BillingPackageRepository::new(Arc::clone(&self.db))
    }
}

fn operator_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/agents",
            get(handlers::agents::list_agents).post(handlers::agents::create_agent),
        )
        .route(
            "/agents/{id}",
            get(handlers::agents::get_agent)
                .patch(handlers::agents::update_agent)
                .delete(handlers::agents::delete_agent),
        )
        .route(
            "/call-logs",
            get(handlers::call_logs::list_call_logs).post(handlers::call_logs::append_call_log),
        )
        .route("/call-logs/{id}", get(handlers::call_logs::get_call_log))
        .route(
            "/integrations",
            get(handlers::resources::list_integrations)
                .post(handlers::resources::create_integration),
        )
        .route(
            "/integrations/{id}",
            axum::routing::delete(handlers::resources::delete_integration),
        )
        .route(
            "/phone-numbers",
            get(handlers::resources::list_phone_numbers)
                .post(handlers::resources::create_phone_number),
        )
        .route(
            "/phone-numbers/{id}",
            axum::routing::delete(handlers::resources::delete_phone_number),
        )
        .route(
            "/rag-configurations",
            get(handlers::resources::list_rag_configurations)
                .post(handlers::resources::create_rag_configuration),
        )
        .route(
            "/rag-configurations/{id}",
            axum::routing::delete(handlers::resources::delete_rag_configuration),
        )
        .route(
            "/batch-calls",
            get(handlers::batch_calls::list_batch_calls)
                .post(handlers::batch_calls::create_batch_call),
        )
        .route(
            "/batch-calls/{id}",
            get(handlers::batch_calls::get_batch_call)
                .delete(handlers::batch_calls::delete_batch_call),
        )
        .route(
            "/batch-call-recipients/{id}/status",
            put(handlers::batch_calls::record_recipient_status),
        )
        .route("/organization", get(handlers::organization::get_organization))
        .route(
            "/users",
            get(handlers::organization::list_users).post(handlers::organization::create_user),
        )
        .route(
            "/users/{id}",
            axum::routing::delete(handlers::organization::delete_user),
        )
        .route("/payments", get(handlers::organization::list_payments))
        .route(
            "/billing-packages",
            get(handlers::organization::list_billing_packages),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            operator_auth_middleware,
        ))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/admin/{kind}/{id}/status",
            put(handlers::admin::set_approval_status),
        )
        .route(
            "/admin/billing-packages",
            post(handlers::admin::create_billing_package),
        )
        .route(
            "/admin/organizations",
            post(handlers::admin::create_organization),
        )
        .route(
            "/admin/organizations/{id}/billing-package",
            put(handlers::admin::assign_billing_package),
        )
        .route(
            "/admin/organizations/{id}/credits/reset",
            post(handlers::admin::reset_credits),
        )
        .route(
            "/admin/organizations/{id}/payments",
            post(handlers::admin::record_payment),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            admin_auth_middleware,
        ))
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::health))
        .merge(operator_routes(&state))
        .merge(admin_routes(&state))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(trace_id_middleware))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let app = create_app(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::agents::list_agents,
        crate::handlers::agents::create_agent,
        crate::handlers::agents::get_agent,
        crate::handlers::agents::update_agent,
        crate::handlers::agents::delete_agent,
        crate::handlers::call_logs::list_call_logs,
        crate::handlers::call_logs::append_call_log,
        crate::handlers::call_logs::get_call_log,
        crate::handlers::resources::list_integrations,
        crate::handlers::resources::create_integration,
        crate::handlers::resources::delete_integration,
        crate::handlers::resources::list_phone_numbers,
        crate::handlers::resources::create_phone_number,
        crate::handlers::resources::delete_phone_number,
        crate::handlers::resources::list_rag_configurations,
        crate::handlers::resources::create_rag_configuration,
        crate::handlers::resources::delete_rag_configuration,
        crate::handlers::batch_calls::list_batch_calls,
        crate::handlers::batch_calls::create_batch_call,
        crate::handlers::batch_calls::get_batch_call,
        crate::handlers::batch_calls::delete_batch_call,
        crate::handlers::batch_calls::record_recipient_status,
        crate::handlers::organization::get_organization,
        crate::handlers::organization::list_users,
        crate::handlers::organization::create_user,
        crate::handlers::organization::delete_user,
        crate::handlers::organization::list_payments,
        crate::handlers::organization::list_billing_packages,
        crate::handlers::admin::set_approval_status,
        crate::handlers::admin::create_billing_package,
        crate::handlers::admin::create_organization,
        crate::handlers::admin::assign_billing_package,
        crate::handlers::admin::reset_credits,
        crate::handlers::admin::record_payment,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::error::QuotaDetails,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service metadata"),
        (name = "agents", description = "Voice agents of the calling organization"),
        (name = "call-logs", description = "Append-only call history"),
        (name = "resources", description = "Approval-tracked integrations, phone numbers and RAG configurations"),
        (name = "batch-calls", description = "Outbound batch calls"),
        (name = "organization", description = "Organization profile, users and billing"),
        (name = "admin", description = "Administrative operations"),
    ),
    info(
        title = "Voice Admin API",
        description = "Organization-scoped administration of voice agents",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
