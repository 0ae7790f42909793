/// Company lifecycle hooks
///
/// [`CascadeEngine`](crate::cascade::CascadeEngine) calls every registered
/// observer at each company mutation, in registration order, with the
/// connection of the open transaction. A hook that returns an error aborts the
/// mutation: the engine drops the transaction and nothing is committed.
///
/// # Hooks
///
/// ```text
/// create_company        ──> created(company)
/// update_company        ──> updated(previous, updated)
/// delete_company        ──> deleted(company)        (soft delete)
/// restore_company       ──> restored(company)
/// force_delete_company  ──> force_deleted(company)
/// delete_user           ──> force_deleted(company)  (once per owned company)
/// ```
///
/// Every hook defaults to a no-op.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use corpdesk_shared::cascade::{CascadeResult, CompanyObserver};
/// use corpdesk_shared::models::company::Company;
/// use sqlx::PgConnection;
///
/// struct AuditLog;
///
/// #[async_trait]
/// impl CompanyObserver for AuditLog {
///     fn name(&self) -> &str {
///         "audit_log"
///     }
///
///     async fn deleted(&self, _conn: &mut PgConnection, company: &Company) -> CascadeResult<()> {
///         tracing::info!(company_id = company.id, "Company moved to trash");
///         Ok(())
///     }
/// }
/// ```

use crate::cascade::{rules, CascadeResult};
use crate::models::company::Company;
use async_trait::async_trait;
use sqlx::PgConnection;

/// Company lifecycle observer
#[async_trait]
pub trait CompanyObserver: Send + Sync {
    /// Observer name, used in logs and errors
    fn name(&self) -> &str;

    /// After a company is inserted
    async fn created(&self, _conn: &mut PgConnection, _company: &Company) -> CascadeResult<()> {
        Ok(())
    }

    /// After a company row is updated
    ///
    /// `previous` is the row as locked before the update.
    async fn updated(
        &self,
        _conn: &mut PgConnection,
        _previous: &Company,
        _updated: &Company,
    ) -> CascadeResult<()> {
        Ok(())
    }

    /// After a company is soft-deleted
    async fn deleted(&self, _conn: &mut PgConnection, _company: &Company) -> CascadeResult<()> {
        Ok(())
    }

    /// After a soft-deleted company is restored
    async fn restored(&self, _conn: &mut PgConnection, _company: &Company) -> CascadeResult<()> {
        Ok(())
    }

    /// After a company row is permanently removed
    async fn force_deleted(
        &self,
        _conn: &mut PgConnection,
        _company: &Company,
    ) -> CascadeResult<()> {
        Ok(())
    }
}

/// Keeps every add's status equal to its company's status
///
/// Registered by default on every [`CascadeEngine`](crate::cascade::CascadeEngine).
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusPropagation;

#[async_trait]
impl CompanyObserver for StatusPropagation {
    fn name(&self) -> &str {
        "status_propagation"
    }

    async fn updated(
        &self,
        conn: &mut PgConnection,
        previous: &Company,
        updated: &Company,
    ) -> CascadeResult<()> {
        rules::on_company_updated(conn, previous, updated).await?;
        Ok(())
    }
}
