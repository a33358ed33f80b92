//! User repository
//!
//! Users are organization scoped; creation checks that the organization exists
//! and that its `max_users` quota is not exhausted.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::organization::lock_organization;
use super::scoped::ScopedRepository;
use crate::error::RepositoryError;
use crate::models::user::{self, Entity as User};

pub type UserRepository = ScopedRepository<User>;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub is_admin: bool,
}

fn default_role() -> String {
    "member".to_string()
}

impl UserRepository {
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: NewUser,
    ) -> Result<user::Model, RepositoryError> {
        let email = input.email.trim().to_ascii_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(RepositoryError::validation_error("email is invalid"));
        }

        let txn = self.db.begin().await?;
        let org = lock_organization(&txn, organization_id).await?;

        let current = User::find()
            .filter(user::Column::OrganizationId.eq(organization_id))
            .count(&txn)
            .await?;
        if current >= org.max_users.max(0) as u64 {
            return Err(RepositoryError::QuotaExceeded {
                resource: "users",
                limit: org.max_users as i64,
            });
        }

        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(organization_id),
            email: Set(email),
            name: Set(input.name),
            role: Set(input.role),
            is_admin: Set(input.is_admin),
            created_at: Set(Utc::now().into()),
        };
        let user = user.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            organization_id = %organization_id,
            user_id = %user.id,
            "Created user"
        );
        Ok(user)
    }
}
