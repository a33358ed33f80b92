//! Integration entity model
//!
//! Tenant-requested connection to a third-party system (CRM, calendar, ...)
//! that an administrator approves or rejects.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde_json::Value as JsonValue;

use super::approval::ApprovalStatus;
use super::{ApprovalTracked, OrganizationScoped};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "integrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub organization_id: Uuid,

    /// Integration kind slug (e.g. `hubspot`, `google_calendar`)
    pub provider: String,

    pub name: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub config: Option<JsonValue>,

    pub status: ApprovalStatus,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
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

impl ApprovalTracked for Entity {
    fn status_column() -> Column {
        Column::Status
    }

    fn updated_at_column() -> Column {
        Column::UpdatedAt
    }
}
