//! Approval status handling for integrations, phone numbers and RAG
//! configurations.
//!
//! Tenants can only read the status. Transitions are written by administrators
//! through [`set_approval_status`], which is deliberately not organization
//! scoped.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::scoped::ScopedRepository;
use crate::error::RepositoryError;
use crate::models::{ApprovalStatus, ApprovalTracked};

/// Overwrite the approval status of a row regardless of its organization.
/// Returns the number of rows changed.
pub async fn set_approval_status<E, C>(
    conn: &C,
    id: Uuid,
    status: ApprovalStatus,
) -> Result<u64, DbErr>
where
    E: ApprovalTracked,
    C: ConnectionTrait,
{
    let now: DateTimeWithTimeZone = Utc::now().into();
    let result = E::update_many()
        .col_expr(E::status_column(), Expr::value(status.as_str()))
        .col_expr(E::updated_at_column(), Expr::value(now))
        .filter(E::id_column().eq(id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

impl<E: ApprovalTracked> ScopedRepository<E> {
    /// Rows of one organization carrying `status`, in `(created_at, id)` order
    pub async fn list_by_status(
        &self,
        organization_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<Vec<E::Model>, RepositoryError> {
        let rows = E::find()
            .filter(E::organization_column().eq(organization_id))
            .filter(E::status_column().eq(status.as_str()))
            .order_by_asc(E::created_at_column())
            .order_by_asc(E::id_column())
            .all(self.db.as_ref())
            .await?;
        Ok(rows)
    }

    /// Administrative transition. Returns `false` when no row has that id.
    pub async fn set_approval_status(
        &self,
        id: Uuid,
        status: ApprovalStatus,
    ) -> Result<bool, RepositoryError> {
        let affected = set_approval_status::<E, _>(self.db.as_ref(), id, status).await?;
        if affected > 0 {
            tracing::info!(
                target: "audit",
                entity_id = %id,
                status = %status,
                "Approval status changed"
            );
        }
        Ok(affected > 0)
    }
}
