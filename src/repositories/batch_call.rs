//! Batch call repository
//!
//! A batch call groups many outbound targets for one agent. The dialing itself
//! happens at the voice provider; this repository stores the batch and the
//! per-target status the provider reports back.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::phone_number::is_e164;
use super::scoped::{
    ScopedRepository, audit_missed_mutation, delete_scoped, exists_scoped, ownership,
};
use crate::error::RepositoryError;
use crate::models::agent::Entity as Agent;
use crate::models::batch_call::{self, Entity as BatchCall};
use crate::models::batch_call_recipient::{self, Entity as Recipient, RecipientStatus};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewBatchCall {
    pub agent_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// E.164 numbers to dial; must be non-empty and free of duplicates
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BatchCallWithRecipients {
    pub batch: batch_call::Model,
    pub recipients: Vec<batch_call_recipient::Model>,
}

/// Recipient counts of one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BatchCallSummary {
    pub total: u64,
    pub by_status: BTreeMap<RecipientStatus, u64>,
    /// Whether every recipient reached a terminal status
    pub finished: bool,
}

impl BatchCallSummary {
    fn from_statuses(statuses: impl IntoIterator<Item = RecipientStatus>) -> Self {
        let mut by_status = BTreeMap::new();
        let mut total = 0;
        let mut finished = true;
        for status in statuses {
            *by_status.entry(status).or_insert(0) += 1;
            total += 1;
            finished &= status.is_terminal();
        }
        Self {
            total,
            by_status,
            finished,
        }
    }
}

/// Repository for batch call database operations
#[derive(Debug, Clone)]
pub struct BatchCallRepository {
    scoped: ScopedRepository<BatchCall>,
}

impl BatchCallRepository {
    pub fn new(db: Arc<DatabaseConnection>, audit_cross_tenant: bool) -> Self {
        Self {
            scoped: ScopedRepository::new(db, audit_cross_tenant),
        }
    }

    fn db(&self) -> &DatabaseConnection {
        self.scoped.db.as_ref()
    }

    /// Create the batch and all of its recipients in one transaction.
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: NewBatchCall,
    ) -> Result<BatchCallWithRecipients, RepositoryError> {
        if input.name.trim().is_empty() {
            return Err(RepositoryError::validation_error("name is required"));
        }
        if input.recipients.is_empty() {
            return Err(RepositoryError::validation_error(
                "at least one recipient is required",
            ));
        }
        let mut seen = HashSet::new();
        let mut numbers = Vec::with_capacity(input.recipients.len());
        for raw in &input.recipients {
            let number = raw.trim().to_string();
            if !is_e164(&number) {
                return Err(RepositoryError::validation_error(format!(
                    "recipient '{}' is not in E.164 format",
                    raw
                )));
            }
            if !seen.insert(number.clone()) {
                return Err(RepositoryError::validation_error(format!(
                    "recipient '{}' is listed more than once",
                    number
                )));
            }
            numbers.push(number);
        }

        let txn = self.db().begin().await?;

        if !exists_scoped::<Agent, _>(&txn, input.agent_id, organization_id).await? {
            return Err(RepositoryError::not_found(format!(
                "Agent '{}' not found",
                input.agent_id
            )));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let batch = batch_call::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            agent_id: Set(input.agent_id),
            name: Set(input.name.trim().to_string()),
            scheduled_at: Set(input.scheduled_at.map(Into::into)),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut recipients = Vec::with_capacity(numbers.len());
        for number in numbers {
            let recipient = batch_call_recipient::ActiveModel {
                id: Set(Uuid::new_v4()),
                batch_call_id: Set(batch.id),
                organization_id: Set(organization_id),
                phone_number: Set(number),
                status: Set(RecipientStatus::Pending),
                external_call_id: Set(None),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
            recipients.push(recipient);
        }

        txn.commit().await?;

        tracing::info!(
            organization_id = %organization_id,
            batch_call_id = %batch.id,
            recipients = recipients.len(),
            "Created batch call"
        );
        Ok(BatchCallWithRecipients { batch, recipients })
    }

    pub async fn find(
        &self,
        id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<batch_call::Model>, RepositoryError> {
        self.scoped.find(id, organization_id).await
    }

    pub async fn list(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<batch_call::Model>, RepositoryError> {
        self.scoped.list(organization_id).await
    }

    /// Recipients of a batch of `organization_id`, ordered by number.
    /// Empty for missing and foreign batches.
    pub async fn recipients(
        &self,
        batch_call_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Vec<batch_call_recipient::Model>, RepositoryError> {
        Ok(Recipient::find()
            .filter(batch_call_recipient::Column::BatchCallId.eq(batch_call_id))
            .filter(batch_call_recipient::Column::OrganizationId.eq(organization_id))
            .order_by_asc(batch_call_recipient::Column::PhoneNumber)
            .all(self.db())
            .await?)
    }

    /// Store the provider-reported status of one recipient.
    ///
    /// Scoped like every other mutation: an unknown or foreign recipient is a
    /// silent no-op.
    pub async fn record_recipient_status(
        &self,
        recipient_id: Uuid,
        organization_id: Uuid,
        status: RecipientStatus,
        external_call_id: Option<String>,
    ) -> Result<(), RepositoryError> {
        let mut changes = batch_call_recipient::ActiveModel {
            status: Set(status),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        if external_call_id.is_some() {
            changes.external_call_id = Set(external_call_id);
        }

        let result = Recipient::update_many()
            .set(changes)
            .filter(ownership::<Recipient>(recipient_id, organization_id))
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 && self.scoped.audit_cross_tenant {
            audit_missed_mutation::<Recipient, _>(
                self.db(),
                "record_status",
                recipient_id,
                organization_id,
            )
            .await;
        }
        Ok(())
    }

    /// Counts per recipient status. `None` for missing and foreign batches.
    pub async fn summary(
        &self,
        batch_call_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<BatchCallSummary>, RepositoryError> {
        if !self.scoped.exists(batch_call_id, organization_id).await? {
            return Ok(None);
        }
        let recipients = self.recipients(batch_call_id, organization_id).await?;
        Ok(Some(BatchCallSummary::from_statuses(
            recipients.into_iter().map(|r| r.status),
        )))
    }

    /// Delete the batch and its recipients if the batch belongs to
    /// `organization_id`; otherwise a silent no-op.
    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db().begin().await?;

        let affected = delete_scoped::<BatchCall, _>(&txn, id, organization_id).await?;
        if affected > 0 {
            Recipient::delete_many()
                .filter(batch_call_recipient::Column::BatchCallId.eq(id))
                .filter(batch_call_recipient::Column::OrganizationId.eq(organization_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        if affected == 0 {
            self.scoped.audit_miss("delete", id, organization_id).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_status() {
        let summary = BatchCallSummary::from_statuses([
            RecipientStatus::Completed,
            RecipientStatus::Completed,
            RecipientStatus::Busy,
            RecipientStatus::Calling,
        ]);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_status[&RecipientStatus::Completed], 2);
        assert_eq!(summary.by_status[&RecipientStatus::Busy], 1);
        assert!(!summary.by_status.contains_key(&RecipientStatus::Failed));
        assert!(!summary.finished);
    }

    #[test]
    fn summary_of_terminal_recipients_is_finished() {
        let summary =
            BatchCallSummary::from_statuses([RecipientStatus::Failed, RecipientStatus::NoAnswer]);

        assert!(summary.finished);
    }
}
