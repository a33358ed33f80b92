//! # Data Models
//!
//! SeaORM entities for the organization-scoped schema, plus the traits that
//! let repositories treat every tenant-owned table uniformly.

use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod agent;
pub mod agent_settings;
pub mod approval;
pub mod batch_call;
pub mod batch_call_recipient;
pub mod billing_package;
pub mod call_log;
pub mod integration;
pub mod organization;
pub mod payment;
pub mod phone_number;
pub mod rag_configuration;
pub mod user;

pub use agent::Entity as Agent;
pub use agent_settings::AgentSettings;
pub use approval::ApprovalStatus;
pub use batch_call::Entity as BatchCall;
pub use batch_call_recipient::{Entity as BatchCallRecipient, RecipientStatus};
pub use billing_package::Entity as BillingPackage;
pub use call_log::Entity as CallLog;
pub use integration::Entity as Integration;
pub use organization::Entity as Organization;
pub use payment::Entity as Payment;
pub use phone_number::Entity as PhoneNumber;
pub use rag_configuration::Entity as RagConfiguration;
pub use user::Entity as User;

/// A table whose rows belong to exactly one organization.
///
/// Every scoped read and write combines [`id_column`](Self::id_column) and
/// [`organization_column`](Self::organization_column) in the same `WHERE`
/// clause.
pub trait OrganizationScoped: EntityTrait {
    fn id_column() -> Self::Column;
    fn organization_column() -> Self::Column;
    /// Column used for stable `(created_at, id)` listing order
    fn created_at_column() -> Self::Column;
}

/// A scoped table carrying an [`ApprovalStatus`] set by administrators.
pub trait ApprovalTracked: OrganizationScoped {
    fn status_column() -> Self::Column;
    fn updated_at_column() -> Self::Column;
}

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "voice-admin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
