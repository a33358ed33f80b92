//! Integration repository

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::organization::require_organization;
use super::scoped::ScopedRepository;
use crate::error::RepositoryError;
use crate::models::ApprovalStatus;
use crate::models::integration::{self, Entity as Integration};

pub type IntegrationRepository = ScopedRepository<Integration>;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewIntegration {
    pub provider: String,
    pub name: String,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

impl IntegrationRepository {
    /// Request an integration. It starts out `PENDING_APPROVAL`.
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: NewIntegration,
    ) -> Result<integration::Model, RepositoryError> {
        let provider = input.provider.trim();
        if provider.is_empty() || input.name.trim().is_empty() {
            return Err(RepositoryError::validation_error(
                "provider and name are required",
            ));
        }
        if input.config.as_ref().is_some_and(|config| !config.is_object()) {
            return Err(RepositoryError::validation_error(
                "config must be a JSON object",
            ));
        }

        require_organization(self.db.as_ref(), organization_id).await?;

        let now = Utc::now();
        let integration = integration::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            provider: Set(provider.to_ascii_lowercase()),
            name: Set(input.name.trim().to_string()),
            config: Set(input.config),
            status: Set(ApprovalStatus::PendingApproval),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(integration.insert(self.db.as_ref()).await?)
    }
}
