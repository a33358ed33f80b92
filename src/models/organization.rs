//! Organization entity model
//!
//! The tenant root. Every scoped table references `organizations.id`.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub billing_package_id: Option<Uuid>,

    pub rate_per_minute_cents: i32,

    pub max_agents: i32,

    pub max_users: i32,

    pub monthly_credits: i64,

    pub used_credits: i64,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Credits left in the current billing period (never negative)
    pub fn remaining_credits(&self) -> i64 {
        (self.monthly_credits - self.used_credits).max(0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::billing_package::Entity",
        from = "Column::BillingPackageId",
        to = "super::billing_package::Column::Id"
    )]
    BillingPackage,
    #[sea_orm(has_many = "super::agent::Entity")]
    Agent,
    #[sea_orm(has_many = "super::user::Entity")]
    User,
}

impl Related<super::billing_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillingPackage.def()
    }
}

impl Related<super::agent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Agent.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
