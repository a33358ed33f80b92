//! Agent entity model
//!
//! Mirrors the configuration of an externally hosted voice agent. Every read
//! and write goes through organization-scoped operations.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::OrganizationScoped;
use super::agent_settings::AgentSettings;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "agents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning organization
    pub organization_id: Uuid,

    pub name: String,

    /// Identifier of the agent at the voice provider (not referentially enforced)
    pub elevenlabs_agent_id: Option<String>,

    pub first_message: Option<String>,

    pub system_prompt: Option<String>,

    /// BCP-47 language tag
    pub language: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub settings: AgentSettings,

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
    #[sea_orm(has_many = "super::phone_number::Entity")]
    PhoneNumber,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::phone_number::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PhoneNumber.def()
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
