//! Call log repository
//!
//! Call logs are an append-only history of calls placed by agents. There is no
//! update or delete path.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, Set};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::scoped::{exists_scoped, find_scoped, page_scoped};
use crate::cursor::{Page, PageCursor};
use crate::error::RepositoryError;
use crate::models::agent::Entity as Agent;
use crate::models::call_log::{self, Entity as CallLog};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewCallLog {
    pub agent_id: Uuid,
    #[serde(default)]
    pub external_call_id: Option<String>,
    /// `inbound` or `outbound`
    pub direction: String,
    #[serde(default)]
    pub from_number: Option<String>,
    #[serde(default)]
    pub to_number: Option<String>,
    pub status: String,
    #[serde(default)]
    pub duration_seconds: i32,
    #[serde(default)]
    pub cost_credits: i64,
    #[serde(default)]
    pub transcript: Option<serde_json::Value>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

/// Repository for call log database operations
#[derive(Debug, Clone)]
pub struct CallLogRepository {
    pub db: Arc<DatabaseConnection>,
}

impl CallLogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record a finished call. The agent must belong to `organization_id`.
    pub async fn append(
        &self,
        organization_id: Uuid,
        input: NewCallLog,
    ) -> Result<call_log::Model, RepositoryError> {
        if !matches!(input.direction.as_str(), "inbound" | "outbound") {
            return Err(RepositoryError::validation_error(
                "direction must be 'inbound' or 'outbound'",
            ));
        }
        if input.duration_seconds < 0 || input.cost_credits < 0 {
            return Err(RepositoryError::validation_error(
                "duration_seconds and cost_credits must not be negative",
            ));
        }
        if !exists_scoped::<Agent, _>(self.db.as_ref(), input.agent_id, organization_id).await? {
            return Err(RepositoryError::not_found(format!(
                "Agent '{}' not found",
                input.agent_id
            )));
        }

        let entry = call_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            agent_id: Set(input.agent_id),
            external_call_id: Set(input.external_call_id),
            direction: Set(input.direction),
            from_number: Set(input.from_number),
            to_number: Set(input.to_number),
            status: Set(input.status),
            duration_seconds: Set(input.duration_seconds),
            cost_credits: Set(input.cost_credits),
            transcript: Set(input.transcript),
            started_at: Set(input.started_at.map(Into::into)),
            created_at: Set(Utc::now().into()),
        };

        Ok(entry.insert(self.db.as_ref()).await?)
    }

    pub async fn find(
        &self,
        id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<call_log::Model>, RepositoryError> {
        Ok(find_scoped::<CallLog, _>(self.db.as_ref(), id, organization_id).await?)
    }

    /// Cursor-paginated listing, optionally restricted to one agent
    pub async fn list_page(
        &self,
        organization_id: Uuid,
        agent_id: Option<Uuid>,
        cursor: Option<&str>,
        limit: u64,
    ) -> Result<Page<call_log::Model>, RepositoryError> {
        let filter = match agent_id {
            Some(agent_id) => Condition::all().add(call_log::Column::AgentId.eq(agent_id)),
            None => Condition::all(),
        };

        page_scoped::<CallLog, _, _>(
            self.db.as_ref(),
            organization_id,
            filter,
            cursor,
            limit,
            |entry: &call_log::Model| {
                PageCursor::new(entry.created_at.with_timezone(&Utc), entry.id)
            },
        )
        .await
    }
}
