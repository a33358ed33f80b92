//! Phone number repository
//!
//! Numbers are unique per organization; a duplicate insert surfaces as a
//! unique violation from the database.

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
use crate::models::phone_number::{self, Entity as PhoneNumber};

pub type PhoneNumberRepository = ScopedRepository<PhoneNumber>;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPhoneNumber {
    /// E.164 formatted number
    pub number: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub agent_id: Option<Uuid>,
}

fn default_provider() -> String {
    "twilio".to_string()
}

pub(crate) fn is_e164(number: &str) -> bool {
    match number.strip_prefix('+') {
        Some(digits) => {
            (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

impl PhoneNumberRepository {
    /// Register a number. It starts out `PENDING_APPROVAL`; an optional agent
    /// must belong to the same organization.
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: NewPhoneNumber,
    ) -> Result<phone_number::Model, RepositoryError> {
        let number = input.number.trim().to_string();
        if !is_e164(&number) {
            return Err(RepositoryError::validation_error(
                "number must be in E.164 format",
            ));
        }

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
        let phone = phone_number::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            agent_id: Set(input.agent_id),
            number: Set(number),
            label: Set(input.label),
            provider: Set(input.provider),
            status: Set(ApprovalStatus::PendingApproval),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(phone.insert(self.db.as_ref()).await?)
    }
}
