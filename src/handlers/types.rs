//! # Common API Types
//!
//! Response bodies shared by the handlers, plus pagination and filter query
//! parameters. Request bodies are the `New*` inputs of the repository layer.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::cursor::Page;
use crate::models::{
    AgentSettings, ApprovalStatus, RecipientStatus, agent, batch_call, batch_call_recipient,
    billing_package, call_log, integration, organization, payment, phone_number,
    rag_configuration, user,
};

fn utc(ts: DateTimeWithTimeZone) -> DateTime<Utc> {
    ts.with_timezone(&Utc)
}

/// Generic paginated response wrapper for list endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    /// List of items for the current page
    pub data: Vec<T>,
    /// Opaque cursor for fetching the next page (null if this is the last page)
    pub next_cursor: Option<String>,
    /// Convenience field indicating if more pages exist
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn from_page<M>(page: Page<M>) -> Self
    where
        T: From<M>,
    {
        let page = page.map(T::from);
        Self {
            has_more: page.next_cursor.is_some(),
            data: page.items,
            next_cursor: page.next_cursor,
        }
    }
}

/// Simple list wrapper for unpaginated collections
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn from_models<M>(models: Vec<M>) -> Self
    where
        T: From<M>,
    {
        Self {
            data: models.into_iter().map(T::from).collect(),
        }
    }
}

/// Cursor pagination query parameters
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct PageQuery {
    /// Opaque cursor returned as `next_cursor` by the previous page
    pub cursor: Option<String>,
    /// Page size (default from configuration, max: 100)
    pub limit: Option<u64>,
}

/// Optional approval status filter for approval-tracked resources
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct StatusFilterQuery {
    pub status: Option<ApprovalStatus>,
}

/// Body of an administrative approval transition
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ApprovalUpdateRequest {
    pub status: ApprovalStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgentInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub elevenlabs_agent_id: Option<String>,
    pub first_message: Option<String>,
    pub system_prompt: Option<String>,
    pub language: String,
    pub settings: AgentSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<agent::Model> for AgentInfo {
    fn from(model: agent::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            elevenlabs_agent_id: model.elevenlabs_agent_id,
            first_message: model.first_message,
            system_prompt: model.system_prompt,
            language: model.language,
            settings: model.settings,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CallLogInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub agent_id: Uuid,
    pub external_call_id: Option<String>,
    pub direction: String,
    pub from_number: Option<String>,
    pub to_number: Option<String>,
    pub status: String,
    pub duration_seconds: i32,
    pub cost_credits: i64,
    pub transcript: Option<serde_json::Value>,
    pub started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<call_log::Model> for CallLogInfo {
    fn from(model: call_log::Model) -> Self {
        Self {
            id: model.id,
            agent_id: model.agent_id,
            external_call_id: model.external_call_id,
            direction: model.direction,
            from_number: model.from_number,
            to_number: model.to_number,
            status: model.status,
            duration_seconds: model.duration_seconds,
            cost_credits: model.cost_credits,
            transcript: model.transcript,
            started_at: model.started_at.map(utc),
            created_at: utc(model.created_at),
        }
    }
}

/// Result of appending a call log
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CallLogCreated {
    pub call_log: CallLogInfo,
    /// Whether `cost_credits` could be charged against the monthly allowance
    pub credits_charged: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntegrationInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub provider: String,
    pub name: String,
    pub config: Option<serde_json::Value>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<integration::Model> for IntegrationInfo {
    fn from(model: integration::Model) -> Self {
        Self {
            id: model.id,
            provider: model.provider,
            name: model.name,
            config: model.config,
            status: model.status,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PhoneNumberInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = Option<String>)]
    pub agent_id: Option<Uuid>,
    pub number: String,
    pub label: Option<String>,
    pub provider: String,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<phone_number::Model> for PhoneNumberInfo {
    fn from(model: phone_number::Model) -> Self {
        Self {
            id: model.id,
            agent_id: model.agent_id,
            number: model.number,
            label: model.label,
            provider: model.provider,
            status: model.status,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RagConfigurationInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = Option<String>)]
    pub agent_id: Option<Uuid>,
    pub name: String,
    pub embedding_model: String,
    pub chunk_size: i32,
    pub chunk_overlap: i32,
    pub document_ids: Vec<String>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<rag_configuration::Model> for RagConfigurationInfo {
    fn from(model: rag_configuration::Model) -> Self {
        Self {
            document_ids: model.documents(),
            id: model.id,
            agent_id: model.agent_id,
            name: model.name,
            embedding_model: model.embedding_model,
            chunk_size: model.chunk_size,
            chunk_overlap: model.chunk_overlap,
            status: model.status,
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = Option<String>)]
    pub billing_package_id: Option<Uuid>,
    pub rate_per_minute_cents: i32,
    pub max_agents: i32,
    pub max_users: i32,
    pub monthly_credits: i64,
    pub used_credits: i64,
    pub remaining_credits: i64,
    pub created_at: DateTime<Utc>,
}

impl From<organization::Model> for OrganizationInfo {
    fn from(model: organization::Model) -> Self {
        Self {
            remaining_credits: model.remaining_credits(),
            id: model.id,
            name: model.name,
            billing_package_id: model.billing_package_id,
            rate_per_minute_cents: model.rate_per_minute_cents,
            max_agents: model.max_agents,
            max_users: model.max_users,
            monthly_credits: model.monthly_credits,
            used_credits: model.used_credits,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BillingPackageInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub monthly_credits: i64,
    pub max_agents: i32,
    pub max_users: i32,
}

impl From<billing_package::Model> for BillingPackageInfo {
    fn from(model: billing_package::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price_cents: model.price_cents,
            monthly_credits: model.monthly_credits,
            max_agents: model.max_agents,
            max_users: model.max_users,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserInfo {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            role: model.role,
            is_admin: model.is_admin,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = Option<String>)]
    pub billing_package_id: Option<Uuid>,
    pub amount_cents: i64,
    pub currency: String,
    pub external_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<payment::Model> for PaymentInfo {
    fn from(model: payment::Model) -> Self {
        Self {
            id: model.id,
            billing_package_id: model.billing_package_id,
            amount_cents: model.amount_cents,
            currency: model.currency,
            external_reference: model.external_reference,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchCallInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub agent_id: Uuid,
    pub name: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<batch_call::Model> for BatchCallInfo {
    fn from(model: batch_call::Model) -> Self {
        Self {
            id: model.id,
            agent_id: model.agent_id,
            name: model.name,
            scheduled_at: model.scheduled_at.map(utc),
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipientInfo {
    #[schema(value_type = String)]
    pub id: Uuid,
    pub phone_number: String,
    pub status: RecipientStatus,
    pub external_call_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<batch_call_recipient::Model> for RecipientInfo {
    fn from(model: batch_call_recipient::Model) -> Self {
        Self {
            id: model.id,
            phone_number: model.phone_number,
            status: model.status,
            external_call_id: model.external_call_id,
            updated_at: utc(model.updated_at),
        }
    }
}

/// A batch call with its recipients and status counts
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchCallDetail {
    pub batch: BatchCallInfo,
    pub recipients: Vec<RecipientInfo>,
    pub summary: crate::repositories::BatchCallSummary,
}

/// Provider-reported recipient status update
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RecipientStatusUpdate {
    pub status: RecipientStatus,
    #[serde(default)]
    pub external_call_id: Option<String>,
}

/// Administrative billing package assignment
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AssignPackageRequest {
    #[schema(value_type = String)]
    pub billing_package_id: Uuid,
}
