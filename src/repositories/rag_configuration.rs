//! RAG configuration repository

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::organization::require_organization;
use super::scoped::{ScopedRepository, exists_scoped};
use crate::error::RepositoryError;
use crate::models::ApprovalStatus;
use crate::models::agent::Entity as Agent;
use crate::models::rag_configuration::{self, Entity as RagConfiguration};

pub type RagConfigurationRepository = ScopedRepository<RagConfiguration>;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewRagConfiguration {
    pub name: String,
    #[serde(default)]
    pub agent_id: Option<Uuid>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i32,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: i32,
    #[serde(default)]
    pub document_ids: Vec<String>,
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_chunk_size() -> i32 {
    1000
}

fn default_chunk_overlap() -> i32 {
    200
}

impl NewRagConfiguration {
    fn validate(&self) -> Result<(), RepositoryError> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::validation_error("name is required"));
        }
        if self.chunk_size <= 0 {
            return Err(RepositoryError::validation_error(
                "chunk_size must be positive",
            ));
        }
        if self.chunk_overlap < 0 || self.chunk_overlap >= self.chunk_size {
            return Err(RepositoryError::validation_error(
                "chunk_overlap must be between 0 and chunk_size",
            ));
        }
        Ok(())
    }
}

impl RagConfigurationRepository {
    /// Store a retrieval configuration. It starts out `PENDING_APPROVAL`.
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: NewRagConfiguration,
    ) -> Result<rag_configuration::Model, RepositoryError> {
        input.validate()?;

        require_organization(self.db.as_ref(), organization_id).await?;
        if let Some(agent_id) = input.agent_id {
            if !exists_scoped::<Agent, _>(self.db.as_ref(), agent_id, organization_id).await? {
                return Err(RepositoryError::not_found(format!(
                    "Agent '{}' not found",
                    agent_id
                )));
            }
        }

        let now = Utc::now();
        let config = rag_configuration::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            agent_id: Set(input.agent_id),
            name: Set(input.name.trim().to_string()),
            embedding_model: Set(input.embedding_model),
            chunk_size: Set(input.chunk_size),
            chunk_overlap: Set(input.chunk_overlap),
            document_ids: Set(serde_json::json!(input.document_ids)),
            status: Set(ApprovalStatus::PendingApproval),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(config.insert(self.db.as_ref()).await?)
    }
}
