/// Propagation and deletion rules
///
/// Each rule runs on a connection that the caller has already placed inside a
/// transaction, so a failure anywhere leaves no partial writes behind once the
/// caller drops the transaction.

use crate::cascade::{AddDeletePolicy, CascadeError, CascadeResult};
use crate::models::{
    add::Add,
    company::{Company, Status},
    user::User,
};
use sqlx::PgConnection;
use tracing::{debug, info};

/// Returns the new status if the update changed it
pub fn status_change(previous: &Company, updated: &Company) -> Option<Status> {
    if previous.id == updated.id && previous.status != updated.status {
        Some(updated.status)
    } else {
        None
    }
}

/// Writes the company's status onto every one of its adds
///
/// Returns the number of adds written.
pub async fn propagate_status(conn: &mut PgConnection, company: &Company) -> CascadeResult<u64> {
    let written = Add::update_status_by_company(&mut *conn, company.id, company.status).await?;

    info!(
        company_id = company.id,
        status = %company.status,
        adds = written,
        "Propagated company status to adds"
    );

    Ok(written)
}

/// Rule applied after a company update
///
/// Propagates the status to the company's adds if and only if it changed.
/// No statement is issued when the status is unchanged. Returns the number of
/// adds written.
pub async fn on_company_updated(
    conn: &mut PgConnection,
    previous: &Company,
    updated: &Company,
) -> CascadeResult<u64> {
    match status_change(previous, updated) {
        Some(_) => propagate_status(conn, updated).await,
        None => {
            debug!(company_id = updated.id, "Company status unchanged, adds untouched");
            Ok(0)
        }
    }
}

/// Clears the adds of companies that are about to be permanently deleted
///
/// With [`AddDeletePolicy::Delete`] the adds are deleted and the count is
/// returned. With [`AddDeletePolicy::Restrict`] nothing is written and the
/// first company that still has adds is reported as
/// [`CascadeError::Restricted`].
pub async fn release_adds(
    conn: &mut PgConnection,
    company_ids: &[i64],
    policy: AddDeletePolicy,
) -> CascadeResult<u64> {
    if company_ids.is_empty() {
        return Ok(0);
    }

    match policy {
        AddDeletePolicy::Delete => {
            let deleted = Add::delete_by_companies(&mut *conn, company_ids).await?;
            debug!(companies = company_ids.len(), adds = deleted, "Deleted adds of companies");
            Ok(deleted)
        }
        AddDeletePolicy::Restrict => {
            let counts = Add::counts_by_company(&mut *conn, company_ids).await?;
            match counts.first() {
                Some(&(company_id, adds)) => Err(CascadeError::Restricted { company_id, adds }),
                None => Ok(0),
            }
        }
    }
}

/// Result of removing a user's companies
#[derive(Debug, Clone)]
pub struct UserCascade {
    /// Companies that were permanently deleted
    pub companies: Vec<Company>,

    /// Adds deleted along with them
    pub adds_deleted: u64,
}

/// Rule applied when a user is deleted
///
/// Removes every company the user owns, soft-deleted ones included, after
/// handling their adds per `policy`. The user row itself is left for the
/// caller to delete once this returns. Afterwards no company references the
/// user.
pub async fn on_user_deleted(
    conn: &mut PgConnection,
    user: &User,
    policy: AddDeletePolicy,
) -> CascadeResult<UserCascade> {
    let company_ids = Company::ids_by_user(&mut *conn, user.id).await?;

    let adds_deleted = release_adds(&mut *conn, &company_ids, policy).await?;
    let companies = Company::force_delete_by_user(&mut *conn, user.id).await?;

    info!(
        user_id = user.id,
        companies = companies.len(),
        adds = adds_deleted,
        "Removed companies of deleted user"
    );

    Ok(UserCascade {
        companies,
        adds_deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn company(id: i64, status: Status) -> Company {
        Company {
            id,
            user_id: 1,
            name: format!("Company {}", id),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_status_change_detected() {
        let previous = company(1, Status::Active);
        let updated = company(1, Status::Suspended);
        assert_eq!(status_change(&previous, &updated), Some(Status::Suspended));
    }

    #[test]
    fn test_status_unchanged() {
        let previous = company(1, Status::Inactive);
        let mut updated = company(1, Status::Inactive);
        updated.name = "Renamed".to_string();
        assert_eq!(status_change(&previous, &updated), None);
    }

    #[test]
    fn test_status_change_requires_same_company() {
        let previous = company(1, Status::Active);
        let other = company(2, Status::Inactive);
        assert_eq!(status_change(&previous, &other), None);
    }
}
