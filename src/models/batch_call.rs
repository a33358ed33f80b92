//! BatchCall entity model
//!
//! Parent row of a bulk outbound-call job. Dialing is orchestrated by the
//! voice provider; recipients only carry the status it reports back.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::OrganizationScoped;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "batch_calls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub organization_id: Uuid,

    pub agent_id: Uuid,

    pub name: String,

    pub scheduled_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::batch_call_recipient::Entity")]
    Recipient,
}

impl Related<super::batch_call_recipient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
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
