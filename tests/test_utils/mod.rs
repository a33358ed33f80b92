//! Test utilities for database testing.
//!
//! In-memory SQLite with all migrations applied, plus fixtures that go
//! through the repositories so every row satisfies the schema.

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use uuid::Uuid;
use voice_admin::models::{agent, billing_package, organization};
use voice_admin::repositories::{
    AgentRepository, BillingPackageRepository, NewAgent, NewBillingPackage, NewOrganization,
    OrganizationRepository,
};

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Same as [`setup_test_db`], wrapped for repository constructors.
pub async fn setup_test_db_arc() -> Result<Arc<DatabaseConnection>> {
    Ok(Arc::new(setup_test_db().await?))
}

/// Creates a billing package with the given quotas.
#[allow(dead_code)]
pub async fn create_test_package(
    db: &Arc<DatabaseConnection>,
    max_agents: i32,
    max_users: i32,
    monthly_credits: i64,
) -> Result<billing_package::Model> {
    let package = BillingPackageRepository::new(Arc::clone(db))
        .create(NewBillingPackage {
            name: format!("Package {}", Uuid::new_v4().simple()),
            price_cents: 1_000,
            monthly_credits,
            max_agents,
            max_users,
        })
        .await?;
    Ok(package)
}

/// Creates an organization on a generous package (10 agents, 10 users,
/// 1000 credits).
#[allow(dead_code)]
pub async fn create_test_organization(db: &Arc<DatabaseConnection>) -> Result<Uuid> {
    let package = create_test_package(db, 10, 10, 1_000).await?;
    let org = create_test_organization_on(db, Some(package.id)).await?;
    Ok(org.id)
}

/// Creates an organization, optionally assigned to `package_id`.
#[allow(dead_code)]
pub async fn create_test_organization_on(
    db: &Arc<DatabaseConnection>,
    package_id: Option<Uuid>,
) -> Result<organization::Model> {
    let org = OrganizationRepository::new(Arc::clone(db))
        .create(NewOrganization {
            name: format!("Org {}", Uuid::new_v4().simple()),
            billing_package_id: package_id,
            rate_per_minute_cents: None,
        })
        .await?;
    Ok(org)
}

#[allow(dead_code)]
pub fn new_agent(name: &str) -> NewAgent {
    NewAgent {
        name: name.to_string(),
        elevenlabs_agent_id: None,
        first_message: Some("Hello, how can I help?".to_string()),
        system_prompt: None,
        language: "en".to_string(),
        settings: Default::default(),
    }
}

/// Creates an agent in `organization_id`.
#[allow(dead_code)]
pub async fn create_test_agent(
    db: &Arc<DatabaseConnection>,
    organization_id: Uuid,
    name: &str,
) -> Result<agent::Model> {
    let agent = AgentRepository::new(Arc::clone(db), true)
        .create(organization_id, new_agent(name))
        .await?;
    Ok(agent)
}
