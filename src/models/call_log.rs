//! CallLog entity model
//!
//! Append-only record of call events reported by the voice provider. There is
//! deliberately no update or delete path for this table.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

use super::OrganizationScoped;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "call_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub organization_id: Uuid,

    /// Agent that handled the call; kept after the agent is deleted
    pub agent_id: Uuid,

    /// Conversation id at the voice provider
    pub external_call_id: Option<String>,

    /// `inbound` or `outbound`
    pub direction: String,

    pub from_number: Option<String>,

    pub to_number: Option<String>,

    /// Provider-reported terminal status (e.g. done, failed)
    pub status: String,

    pub duration_seconds: i32,

    pub cost_credits: i64,

    #[sea_orm(column_type = "JsonBinary")]
    pub transcript: Option<JsonValue>,

    pub started_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl OrganizationScoped for Entity {
    fn id_column() -> Column {
        Column::Id
    }

    fn organization_column() -> Column {
        Column::OrganizationId
    }

    fn created_at_column() -> Column {
        Column::CreatedAt
    }
}
