//! Agent repository
//!
//! Agents are only reachable through organization-scoped operations. Deleting
//! an agent keeps its call logs and batch calls, and detaches the phone
//! numbers and RAG configurations that pointed at it.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::organization::lock_organization;
use super::scoped::{ScopedRepository, delete_scoped, page_scoped};
use crate::cursor::{Page, PageCursor};
use crate::error::RepositoryError;
use crate::models::agent::{self, Entity as Agent};
use crate::models::{AgentSettings, phone_number, rag_configuration};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAgent {
    pub name: String,
    #[serde(default)]
    pub elevenlabs_agent_id: Option<String>,
    #[serde(default)]
    pub first_message: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub settings: AgentSettings,
}

fn default_language() -> String {
    "en".to_string()
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AgentChanges {
    pub name: Option<String>,
    pub elevenlabs_agent_id: Option<String>,
    pub first_message: Option<String>,
    pub system_prompt: Option<String>,
    pub language: Option<String>,
    pub settings: Option<AgentSettings>,
}

fn check_settings(settings: &AgentSettings) -> Result<(), RepositoryError> {
    let problems = settings.validate();
    if problems.is_empty() {
        return Ok(());
    }
    let joined = problems
        .iter()
        .map(|(field, problem)| format!("{}: {}", field, problem))
        .collect::<Vec<_>>()
        .join("; ");
    Err(RepositoryError::validation_error(format!(
        "invalid agent settings ({})",
        joined
    )))
}

fn check_name(name: &str) -> Result<String, RepositoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RepositoryError::validation_error("name is required"));
    }
    Ok(name.to_string())
}

/// Repository for agent database operations
#[derive(Debug, Clone)]
pub struct AgentRepository {
    scoped: ScopedRepository<Agent>,
}

impl AgentRepository {
    pub fn new(db: Arc<DatabaseConnection>, audit_cross_tenant: bool) -> Self {
        Self {
            scoped: ScopedRepository::new(db, audit_cross_tenant),
        }
    }

    fn db(&self) -> &DatabaseConnection {
        self.scoped.db.as_ref()
    }

    /// Create an agent, enforcing the organization's `max_agents` quota.
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: NewAgent,
    ) -> Result<agent::Model, RepositoryError> {
        let name = check_name(&input.name)?;
        check_settings(&input.settings)?;

        let txn = self.db().begin().await?;
        let org = lock_organization(&txn, organization_id).await?;

        let current = Agent::find()
            .filter(agent::Column::OrganizationId.eq(organization_id))
            .count(&txn)
            .await?;
        if current >= org.max_agents.max(0) as u64 {
            return Err(RepositoryError::QuotaExceeded {
                resource: "agents",
                limit: org.max_agents as i64,
            });
        }

        let now = Utc::now();
        let agent = agent::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            name: Set(name),
            elevenlabs_agent_id: Set(input.elevenlabs_agent_id),
            first_message: Set(input.first_message),
            system_prompt: Set(input.system_prompt),
            language: Set(input.language),
            settings: Set(input.settings),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let agent = agent.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            organization_id = %organization_id,
            agent_id = %agent.id,
            "Created agent"
        );
        Ok(agent)
    }

    pub async fn find(
        &self,
        id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<agent::Model>, RepositoryError> {
        self.scoped.find(id, organization_id).await
    }

    pub async fn exists(&self, id: Uuid, organization_id: Uuid) -> Result<bool, RepositoryError> {
        self.scoped.exists(id, organization_id).await
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<agent::Model>, RepositoryError> {
        self.scoped.list(organization_id).await
    }

    /// Cursor-paginated listing in `(created_at, id)` order
    pub async fn list_page(
        &self,
        organization_id: Uuid,
        cursor: Option<&str>,
        limit: u64,
    ) -> Result<Page<agent::Model>, RepositoryError> {
        page_scoped::<Agent, _, _>(
            self.db(),
            organization_id,
            Condition::all(),
            cursor,
            limit,
            agent_cursor,
        )
        .await
    }

    /// Apply `changes` to an agent of `organization_id`. `None` when the agent
    /// does not exist there.
    pub async fn update(
        &self,
        id: Uuid,
        organization_id: Uuid,
        changes: AgentChanges,
    ) -> Result<Option<agent::Model>, RepositoryError> {
        let mut active = agent::ActiveModel {
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        if let Some(name) = changes.name {
            active.name = Set(check_name(&name)?);
        }
        if let Some(settings) = changes.settings {
            check_settings(&settings)?;
            active.settings = Set(settings);
        }
        if let Some(external_id) = changes.elevenlabs_agent_id {
            active.elevenlabs_agent_id = Set(Some(external_id));
        }
        if let Some(first_message) = changes.first_message {
            active.first_message = Set(Some(first_message));
        }
        if let Some(system_prompt) = changes.system_prompt {
            active.system_prompt = Set(Some(system_prompt));
        }
        if let Some(language) = changes.language {
            active.language = Set(language);
        }

        self.scoped.update(id, organization_id, active).await
    }

    /// Delete an agent of `organization_id`.
    ///
    /// Missing and foreign agents are a silent no-op. When the agent is
    /// removed, its phone numbers and RAG configurations are detached in the
    /// same transaction.
    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db().begin().await?;

        let affected = delete_scoped::<Agent, _>(&txn, id, organization_id).await?;
        let detached = if affected > 0 {
            detach_agent(&txn, id, organization_id).await?
        } else {
            0
        };

        txn.commit().await?;

        if affected == 0 {
            self.scoped.audit_miss("delete", id, organization_id).await;
        } else {
            tracing::info!(
                organization_id = %organization_id,
                agent_id = %id,
                detached,
                "Deleted agent"
            );
        }
        Ok(())
    }
}

pub(crate) fn agent_cursor(agent: &agent::Model) -> PageCursor {
    PageCursor::new(agent.created_at.with_timezone(&Utc), agent.id)
}

/// Clear `agent_id` on the organization's phone numbers and RAG
/// configurations. Returns how many rows were detached.
async fn detach_agent<C: ConnectionTrait>(
    conn: &C,
    agent_id: Uuid,
    organization_id: Uuid,
) -> Result<u64, RepositoryError> {
    let now: DateTimeWithTimeZone = Utc::now().into();

    let numbers = phone_number::Entity::update_many()
        .col_expr(phone_number::Column::AgentId, Expr::value(Option::<Uuid>::None))
        .col_expr(phone_number::Column::UpdatedAt, Expr::value(now))
        .filter(phone_number::Column::AgentId.eq(agent_id))
        .filter(phone_number::Column::OrganizationId.eq(organization_id))
        .exec(conn)
        .await?;

    let rag = rag_configuration::Entity::update_many()
        .col_expr(rag_configuration::Column::AgentId, Expr::value(Option::<Uuid>::None))
        .col_expr(rag_configuration::Column::UpdatedAt, Expr::value(now))
        .filter(rag_configuration::Column::AgentId.eq(agent_id))
        .filter(rag_configuration::Column::OrganizationId.eq(organization_id))
        .exec(conn)
        .await?;

    Ok(numbers.rows_affected + rag.rows_affected)
}
