//! Organization-scoped data access
//!
//! Every read and write here filters on `id` *and* `organization_id` inside a
//! single statement. A row that is missing and a row that belongs to another
//! organization look the same to the caller: reads return `None`, mutations
//! succeed without touching anything.

use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::cursor::{Page, PageCursor};
use crate::error::RepositoryError;
use crate::models::OrganizationScoped;

/// `id = ? AND organization_id = ?`
pub fn ownership<E: OrganizationScoped>(id: Uuid, organization_id: Uuid) -> Condition {
    Condition::all()
        .add(E::id_column().eq(id))
        .add(E::organization_column().eq(organization_id))
}

pub async fn find_scoped<E, C>(
    conn: &C,
    id: Uuid,
    organization_id: Uuid,
) -> Result<Option<E::Model>, DbErr>
where
    E: OrganizationScoped,
    C: ConnectionTrait,
{
    E::find()
        .filter(ownership::<E>(id, organization_id))
        .one(conn)
        .await
}

pub async fn exists_scoped<E, C>(conn: &C, id: Uuid, organization_id: Uuid) -> Result<bool, DbErr>
where
    E: OrganizationScoped,
    C: ConnectionTrait,
{
    let found = E::find()
        .select_only()
        .column(E::id_column())
        .filter(ownership::<E>(id, organization_id))
        .into_tuple::<Uuid>()
        .one(conn)
        .await?;
    Ok(found.is_some())
}

/// All rows of one organization in `(created_at, id)` order
pub async fn list_scoped<E, C>(conn: &C, organization_id: Uuid) -> Result<Vec<E::Model>, DbErr>
where
    E: OrganizationScoped,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::organization_column().eq(organization_id))
        .order_by_asc(E::created_at_column())
        .order_by_asc(E::id_column())
        .all(conn)
        .await
}

/// One keyset page of an organization's rows, resuming after `cursor`.
///
/// `filter` narrows the listing further (e.g. to one agent). Fetches
/// `limit + 1` rows to learn whether a next page exists.
pub async fn page_scoped<E, C, F>(
    conn: &C,
    organization_id: Uuid,
    filter: Condition,
    cursor: Option<&str>,
    limit: u64,
    key: F,
) -> Result<Page<E::Model>, RepositoryError>
where
    E: OrganizationScoped,
    C: ConnectionTrait,
    F: Fn(&E::Model) -> PageCursor,
{
    let mut query = E::find()
        .filter(E::organization_column().eq(organization_id))
        .filter(filter);

    if let Some(raw) = cursor {
        let after = PageCursor::decode(raw)?;
        let created_at: DateTimeWithTimeZone = after.created_at.into();
        query = query.filter(
            Condition::any()
                .add(E::created_at_column().gt(created_at))
                .add(
                    Condition::all()
                        .add(E::created_at_column().eq(created_at))
                        .add(E::id_column().gt(after.id)),
                ),
        );
    }

    let rows = query
        .order_by_asc(E::created_at_column())
        .order_by_asc(E::id_column())
        .limit(limit + 1)
        .all(conn)
        .await?;

    Ok(Page::from_rows(rows, limit, key))
}

/// Guarded `DELETE`; returns the number of rows removed (0 or 1).
pub async fn delete_scoped<E, C>(conn: &C, id: Uuid, organization_id: Uuid) -> Result<u64, DbErr>
where
    E: OrganizationScoped,
    C: ConnectionTrait,
{
    let result = E::delete_many()
        .filter(ownership::<E>(id, organization_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Guarded `UPDATE`; returns the number of rows changed (0 or 1).
///
/// `changes` must set at least one column.
pub async fn update_scoped<E, A, C>(
    conn: &C,
    id: Uuid,
    organization_id: Uuid,
    changes: A,
) -> Result<u64, DbErr>
where
    E: OrganizationScoped,
    A: ActiveModelTrait<Entity = E>,
    C: ConnectionTrait,
{
    let result = E::update_many()
        .set(changes)
        .filter(ownership::<E>(id, organization_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Unscoped owner lookup. Only used to decide whether a missed mutation is
/// worth an audit event; its result never reaches the caller.
pub async fn owner_of<E, C>(conn: &C, id: Uuid) -> Result<Option<Uuid>, DbErr>
where
    E: OrganizationScoped,
    C: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(E::organization_column())
        .filter(E::id_column().eq(id))
        .into_tuple::<Uuid>()
        .one(conn)
        .await
}

/// Emit an `audit` event when a scoped mutation missed a row that exists
/// under a different organization. Probe failures are logged and swallowed.
pub async fn audit_missed_mutation<E, C>(
    conn: &C,
    operation: &'static str,
    id: Uuid,
    organization_id: Uuid,
) where
    E: OrganizationScoped,
    C: ConnectionTrait,
{
    let table = E::default().table_name().to_string();
    match owner_of::<E, C>(conn, id).await {
        Ok(Some(owner)) if owner != organization_id => {
            tracing::warn!(
                target: "audit",
                table = %table,
                operation,
                entity_id = %id,
                caller_organization_id = %organization_id,
                owner_organization_id = %owner,
                "Cross-tenant mutation ignored"
            );
        }
        Ok(_) => {
            tracing::debug!(
                table = %table,
                operation,
                entity_id = %id,
                organization_id = %organization_id,
                "Scoped mutation matched no row"
            );
        }
        Err(err) => {
            tracing::warn!(
                target: "audit",
                table = %table,
                operation,
                entity_id = %id,
                error = %err,
                "Audit probe failed"
            );
        }
    }
}

/// Generic repository over any organization-scoped table.
#[derive(Debug)]
pub struct ScopedRepository<E> {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    /// Probe and log cross-tenant misses
    pub audit_cross_tenant: bool,
    entity: PhantomData<E>,
}

impl<E> Clone for ScopedRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            audit_cross_tenant: self.audit_cross_tenant,
            entity: PhantomData,
        }
    }
}

impl<E: OrganizationScoped> ScopedRepository<E> {
    pub fn new(db: Arc<DatabaseConnection>, audit_cross_tenant: bool) -> Self {
        Self {
            db,
            audit_cross_tenant,
            entity: PhantomData,
        }
    }

    pub async fn find(
        &self,
        id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<E::Model>, RepositoryError> {
        Ok(find_scoped::<E, _>(self.db.as_ref(), id, organization_id).await?)
    }

    pub async fn exists(&self, id: Uuid, organization_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(exists_scoped::<E, _>(self.db.as_ref(), id, organization_id).await?)
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<E::Model>, RepositoryError> {
        Ok(list_scoped::<E, _>(self.db.as_ref(), organization_id).await?)
    }

    /// Apply `changes` if the row belongs to `organization_id`, then return
    /// the stored row. `None` covers both missing and foreign rows.
    pub async fn update<A>(
        &self,
        id: Uuid,
        organization_id: Uuid,
        changes: A,
    ) -> Result<Option<E::Model>, RepositoryError>
    where
        A: ActiveModelTrait<Entity = E>,
    {
        let affected = update_scoped::<E, A, _>(self.db.as_ref(), id, organization_id, changes).await?;
        if affected == 0 {
            self.audit_miss("update", id, organization_id).await;
            return Ok(None);
        }
        self.find(id, organization_id).await
    }

    /// Delete the row if it belongs to `organization_id`.
    ///
    /// Missing and foreign rows are a silent no-op, so repeating the call is
    /// always safe.
    pub async fn delete(&self, id: Uuid, organization_id: Uuid) -> Result<(), RepositoryError> {
        let affected = delete_scoped::<E, _>(self.db.as_ref(), id, organization_id).await?;
        if affected == 0 {
            self.audit_miss("delete", id, organization_id).await;
        } else {
            tracing::debug!(
                table = E::default().table_name(),
                entity_id = %id,
                organization_id = %organization_id,
                "Deleted scoped row"
            );
        }
        Ok(())
    }

    pub(crate) async fn audit_miss(&self, operation: &'static str, id: Uuid, organization_id: Uuid) {
        if self.audit_cross_tenant {
            audit_missed_mutation::<E, _>(self.db.as_ref(), operation, id, organization_id).await;
        }
    }
}
