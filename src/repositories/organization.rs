//! Organization repository
//!
//! Organizations are the tenant root: they are addressed by their own id, so
//! nothing here goes through the scoped helpers. Quota and credit bookkeeping
//! lives here as guarded single-statement updates.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Select, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::billing_package::{self, Entity as BillingPackage};
use crate::models::organization::{self, Column, Entity as Organization};

const MAX_NAME_LEN: usize = 255;

const DEFAULT_MAX_AGENTS: i32 = 1;
const DEFAULT_MAX_USERS: i32 = 1;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewOrganization {
    pub name: String,
    /// Package whose quotas are copied onto the organization
    #[serde(default)]
    pub billing_package_id: Option<Uuid>,
    #[serde(default)]
    pub rate_per_minute_cents: Option<i32>,
}

/// Repository for organization database operations
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pub db: Arc<DatabaseConnection>,
}

impl OrganizationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        input: NewOrganization,
    ) -> Result<organization::Model, RepositoryError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(RepositoryError::validation_error("name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(RepositoryError::validation_error(format!(
                "name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }
        if input.rate_per_minute_cents.is_some_and(|rate| rate < 0) {
            return Err(RepositoryError::validation_error(
                "rate_per_minute_cents must not be negative",
            ));
        }

        let txn = self.db.begin().await?;

        let package = match input.billing_package_id {
            Some(package_id) => Some(assignable_package(&txn, package_id).await?),
            None => None,
        };

        let now = Utc::now();
        let org = organization::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            billing_package_id: Set(package.as_ref().map(|p| p.id)),
            rate_per_minute_cents: Set(input.rate_per_minute_cents.unwrap_or(0)),
            max_agents: Set(package.as_ref().map_or(DEFAULT_MAX_AGENTS, |p| p.max_agents)),
            max_users: Set(package.as_ref().map_or(DEFAULT_MAX_USERS, |p| p.max_users)),
            monthly_credits: Set(package.as_ref().map_or(0, |p| p.monthly_credits)),
            used_credits: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let org = org.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            organization_id = %org.id,
            billing_package_id = ?org.billing_package_id,
            "Created organization"
        );
        Ok(org)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<organization::Model>, RepositoryError> {
        Ok(Organization::find_by_id(id).one(self.db.as_ref()).await?)
    }

    /// Point the organization at `package_id` and copy its quotas.
    /// Credits already used in the current period are kept.
    pub async fn assign_billing_package(
        &self,
        organization_id: Uuid,
        package_id: Uuid,
    ) -> Result<organization::Model, RepositoryError> {
        let package = assignable_package(self.db.as_ref(), package_id).await?;

        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = Organization::update_many()
            .col_expr(Column::BillingPackageId, Expr::value(package.id))
            .col_expr(Column::MaxAgents, Expr::value(package.max_agents))
            .col_expr(Column::MaxUsers, Expr::value(package.max_users))
            .col_expr(Column::MonthlyCredits, Expr::value(package.monthly_credits))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(organization_id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!(
                "Organization '{}' not found",
                organization_id
            )));
        }

        tracing::info!(
            organization_id = %organization_id,
            billing_package_id = %package.id,
            "Assigned billing package"
        );

        self.find(organization_id).await?.ok_or_else(|| {
            RepositoryError::not_found(format!("Organization '{}' not found", organization_id))
        })
    }

    /// Charge `amount` credits if the monthly allowance still covers it.
    ///
    /// The check and the increment are one statement, so concurrent charges
    /// can never push `used_credits` past `monthly_credits`. Returns whether
    /// the charge applied.
    pub async fn consume_credits(
        &self,
        organization_id: Uuid,
        amount: i64,
    ) -> Result<bool, RepositoryError> {
        if amount <= 0 {
            return Err(RepositoryError::validation_error(
                "amount must be positive",
            ));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = Organization::update_many()
            .col_expr(Column::UsedCredits, Expr::col(Column::UsedCredits).add(amount))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(organization_id))
            .filter(Expr::col(Column::UsedCredits).lte(Expr::col(Column::MonthlyCredits).sub(amount)))
            .exec(self.db.as_ref())
            .await?;

        let applied = result.rows_affected > 0;
        if !applied {
            tracing::debug!(
                organization_id = %organization_id,
                amount,
                "Credit charge rejected"
            );
        }
        Ok(applied)
    }

    /// Start a new billing period
    pub async fn reset_credits(&self, organization_id: Uuid) -> Result<(), RepositoryError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = Organization::update_many()
            .col_expr(Column::UsedCredits, Expr::value(0i64))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(organization_id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(format!(
                "Organization '{}' not found",
                organization_id
            )));
        }
        Ok(())
    }
}

/// Load the organization or fail with `NotFound`; used before inserting rows
/// that need an existing parent.
pub async fn require_organization<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
) -> Result<organization::Model, RepositoryError> {
    Organization::find_by_id(organization_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            RepositoryError::not_found(format!("Organization '{}' not found", organization_id))
        })
}

/// Load the organization with a row lock held until the surrounding
/// transaction ends. Quota checks count children under this lock so two
/// concurrent creates cannot both pass a `count < max` check.
pub async fn lock_organization<C: ConnectionTrait>(
    conn: &C,
    organization_id: Uuid,
) -> Result<organization::Model, RepositoryError> {
    locked_organization(organization_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            RepositoryError::not_found(format!("Organization '{}' not found", organization_id))
        })
}

fn locked_organization(organization_id: Uuid) -> Select<Organization> {
    Organization::find_by_id(organization_id).lock_exclusive()
}

async fn assignable_package<C: ConnectionTrait>(
    conn: &C,
    package_id: Uuid,
) -> Result<billing_package::Model, RepositoryError> {
    let package = BillingPackage::find_by_id(package_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            RepositoryError::not_found(format!("Billing package '{}' not found", package_id))
        })?;

    if !package.is_active {
        return Err(RepositoryError::validation_error(format!(
            "Billing package '{}' is no longer offered",
            package.name
        )));
    }
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, QueryTrait};

    #[test]
    fn quota_checks_lock_the_organization_row() {
        let id = Uuid::new_v4();

        let sql = locked_organization(id)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(&format!(r#""id" = '{}'"#, id)));
        assert!(sql.ends_with("FOR UPDATE"));
    }

    #[test]
    fn sqlite_lock_is_left_to_the_writer_lock() {
        let sql = locked_organization(Uuid::new_v4())
            .build(DatabaseBackend::Sqlite)
            .to_string();

        assert!(!sql.contains("FOR UPDATE"));
    }
}
