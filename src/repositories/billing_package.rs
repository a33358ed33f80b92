//! Billing package catalog
//!
//! Packages are tenant independent. Organizations copy a package's quotas when
//! it is assigned, so editing the catalog never changes existing tenants.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::billing_package::{self, Entity as BillingPackage};

/// Catalog entry as submitted by an administrator
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewBillingPackage {
    pub name: String,
    pub price_cents: i64,
    pub monthly_credits: i64,
    pub max_agents: i32,
    pub max_users: i32,
}

impl NewBillingPackage {
    fn validate(&self) -> Result<(), RepositoryError> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::validation_error("name is required"));
        }
        if self.price_cents < 0 || self.monthly_credits < 0 {
            return Err(RepositoryError::validation_error(
                "price_cents and monthly_credits must not be negative",
            ));
        }
        if self.max_agents < 0 || self.max_users < 0 {
            return Err(RepositoryError::validation_error(
                "max_agents and max_users must not be negative",
            ));
        }
        Ok(())
    }
}

/// Repository for billing package database operations
#[derive(Debug, Clone)]
pub struct BillingPackageRepository {
    pub db: Arc<DatabaseConnection>,
}

impl BillingPackageRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        input: NewBillingPackage,
    ) -> Result<billing_package::Model, RepositoryError> {
        input.validate()?;

        let now = Utc::now();
        let package = billing_package::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            price_cents: Set(input.price_cents),
            monthly_credits: Set(input.monthly_credits),
            max_agents: Set(input.max_agents),
            max_users: Set(input.max_users),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(package.insert(self.db.as_ref()).await?)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<billing_package::Model>, RepositoryError> {
        Ok(BillingPackage::find_by_id(id).one(self.db.as_ref()).await?)
    }

    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<billing_package::Model>, RepositoryError> {
        Ok(BillingPackage::find()
            .filter(billing_package::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await?)
    }

    /// Packages that can still be assigned, cheapest first
    pub async fn list_active(&self) -> Result<Vec<billing_package::Model>, RepositoryError> {
        Ok(BillingPackage::find()
            .filter(billing_package::Column::IsActive.eq(true))
            .order_by_asc(billing_package::Column::PriceCents)
            .order_by_asc(billing_package::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }
}
