//! BatchCallRecipient entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::OrganizationScoped;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "batch_call_recipients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub batch_call_id: Uuid,

    /// Copied from the parent batch so writes can be guarded without a join
    pub organization_id: Uuid,

    pub phone_number: String,

    pub status: RecipientStatus,

    pub external_call_id: Option<String>,

    pub updated_at: DateTimeWithTimeZone,
}

/// Per-target dialing outcome as reported by the voice provider
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum RecipientStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,

    #[sea_orm(string_value = "calling")]
    Calling,

    #[sea_orm(string_value = "completed")]
    Completed,

    #[sea_orm(string_value = "failed")]
    Failed,

    #[sea_orm(string_value = "no_answer")]
    NoAnswer,

    #[sea_orm(string_value = "busy")]
    Busy,
}

impl RecipientStatus {
    /// Whether the provider has finished with this target
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecipientStatus::Pending | RecipientStatus::Calling)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::batch_call::Entity",
        from = "Column::BatchCallId",
        to = "super::batch_call::Column::Id"
    )]
    BatchCall,
}

impl Related<super::batch_call::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BatchCall.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// Recipients have no created_at; updated_at orders them well enough for listings.
impl OrganizationScoped for Entity {
    fn id_column() -> Column {
        Column::Id
    }

    fn organization_column() -> Column {
        Column::OrganizationId
    }

    fn created_at_column() -> Column {
        Column::UpdatedAt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_and_calling_are_in_flight() {
        assert!(!RecipientStatus::Pending.is_terminal());
        assert!(!RecipientStatus::Calling.is_terminal());
        for status in [
            RecipientStatus::Completed,
            RecipientStatus::Failed,
            RecipientStatus::NoAnswer,
            RecipientStatus::Busy,
        ] {
            assert!(status.is_terminal());
        }
    }

    #[test]
    fn wire_values_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&RecipientStatus::NoAnswer).unwrap(),
            "\"no_answer\""
        );
    }
}
