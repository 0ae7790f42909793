/// Transactional orchestration of company and user mutations
///
/// Every operation follows the same shape:
///
/// ```text
/// BEGIN
///   lock / write the primary row
///   apply rules (adds policy, company removal)
///   call observer hooks with the same connection
/// COMMIT            (any error: the transaction is dropped and rolled back)
/// ```

use crate::cascade::{
    observer::{CompanyObserver, StatusPropagation},
    rules, CascadeConfig, CascadeError, CascadeResult,
};
use crate::models::{
    company::{Company, CreateCompany, UpdateCompany},
    user::User,
};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use std::sync::Arc;
use tracing::{debug, info};

/// Summary of a user deletion
#[derive(Debug, Clone, Serialize)]
pub struct UserDeletion {
    /// The deleted user, as it was before deletion
    pub user: User,

    /// Number of companies removed with the user
    pub companies_deleted: usize,

    /// Number of adds removed with those companies
    pub adds_deleted: u64,
}

/// Entry point for mutations that carry cascade rules
///
/// Cheap to clone; observers are shared.
#[derive(Clone)]
pub struct CascadeEngine {
    pool: PgPool,
    config: CascadeConfig,
    observers: Vec<Arc<dyn CompanyObserver>>,
}

impl std::fmt::Debug for CascadeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeEngine")
            .field("config", &self.config)
            .field(
                "observers",
                &self.observers.iter().map(|o| o.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl CascadeEngine {
    /// Creates an engine with the built-in [`StatusPropagation`] observer
    pub fn new(pool: PgPool, config: CascadeConfig) -> Self {
        Self {
            pool,
            config,
            observers: vec![Arc::new(StatusPropagation)],
        }
    }

    /// Creates an engine with no observers at all
    pub fn without_observers(pool: PgPool, config: CascadeConfig) -> Self {
        Self {
            pool,
            config,
            observers: Vec::new(),
        }
    }

    /// Registers an additional observer, called after the existing ones
    pub fn with_observer(mut self, observer: Arc<dyn CompanyObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Names of registered observers, in call order
    pub fn observer_names(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    async fn ensure_owner(conn: &mut PgConnection, user_id: i64) -> CascadeResult<()> {
        match User::find_by_id(&mut *conn, user_id).await? {
            Some(_) => Ok(()),
            None => Err(CascadeError::OwnerNotFound(user_id)),
        }
    }

    /// Creates a company and fires `created`
    ///
    /// # Errors
    ///
    /// [`CascadeError::OwnerNotFound`] if `data.user_id` doesn't exist.
    pub async fn create_company(&self, data: CreateCompany) -> CascadeResult<Company> {
        let mut tx = self.pool.begin().await?;

        Self::ensure_owner(&mut tx, data.user_id).await?;
        let company = Company::create(&mut *tx, data).await?;

        for observer in &self.observers {
            observer.created(&mut tx, &company).await?;
        }

        tx.commit().await?;

        info!(company_id = company.id, user_id = company.user_id, "Company created");
        Ok(company)
    }

    /// Updates a live company and fires `updated(previous, updated)`
    ///
    /// The row is locked before it is read, so `previous` is exactly what the
    /// update replaced. A status change reaches the adds through
    /// [`StatusPropagation`] before the commit.
    ///
    /// # Returns
    ///
    /// The updated company, or None if it doesn't exist or is soft-deleted
    pub async fn update_company(
        &self,
        id: i64,
        data: UpdateCompany,
    ) -> CascadeResult<Option<Company>> {
        let mut tx = self.pool.begin().await?;

        let Some(previous) = Company::find_for_update(&mut *tx, id, false).await? else {
            return Ok(None);
        };

        if let Some(user_id) = data.user_id {
            Self::ensure_owner(&mut tx, user_id).await?;
        }

        let Some(updated) = Company::update(&mut *tx, id, data).await? else {
            return Ok(None);
        };

        for observer in &self.observers {
            observer.updated(&mut tx, &previous, &updated).await?;
        }

        tx.commit().await?;

        debug!(
            company_id = id,
            from = %previous.status,
            to = %updated.status,
            "Company updated"
        );
        Ok(Some(updated))
    }

    /// Soft-deletes a company and fires `deleted`
    ///
    /// Adds are left untouched; they come back with the company on restore.
    pub async fn delete_company(&self, id: i64) -> CascadeResult<Option<Company>> {
        let mut tx = self.pool.begin().await?;

        let Some(company) = Company::soft_delete(&mut *tx, id).await? else {
            return Ok(None);
        };

        for observer in &self.observers {
            observer.deleted(&mut tx, &company).await?;
        }

        tx.commit().await?;

        info!(company_id = id, "Company soft-deleted");
        Ok(Some(company))
    }

    /// Restores a soft-deleted company and fires `restored`
    pub async fn restore_company(&self, id: i64) -> CascadeResult<Option<Company>> {
        let mut tx = self.pool.begin().await?;

        let Some(company) = Company::restore(&mut *tx, id).await? else {
            return Ok(None);
        };

        for observer in &self.observers {
            observer.restored(&mut tx, &company).await?;
        }

        tx.commit().await?;

        info!(company_id = id, "Company restored");
        Ok(Some(company))
    }

    /// Permanently deletes a company, trashed or not, and fires `force_deleted`
    ///
    /// The company's adds are handled per the configured add policy first.
    ///
    /// # Errors
    ///
    /// [`CascadeError::Restricted`] under the restrict policy when the company
    /// still has adds; nothing is deleted in that case.
    pub async fn force_delete_company(&self, id: i64) -> CascadeResult<Option<Company>> {
        let mut tx = self.pool.begin().await?;

        if Company::find_for_update(&mut *tx, id, true).await?.is_none() {
            return Ok(None);
        }

        let adds_deleted = rules::release_adds(&mut tx, &[id], self.config.add_policy).await?;

        let Some(company) = Company::force_delete(&mut *tx, id).await? else {
            return Ok(None);
        };

        for observer in &self.observers {
            observer.force_deleted(&mut tx, &company).await?;
        }

        tx.commit().await?;

        info!(company_id = id, adds = adds_deleted, "Company permanently deleted");
        Ok(Some(company))
    }

    /// Deletes a user together with every company they own
    ///
    /// Runs as one transaction: handle adds, delete companies (firing
    /// `force_deleted` for each), delete the user, commit. Any failure rolls
    /// everything back.
    ///
    /// # Returns
    ///
    /// A summary of what was removed, or None if the user doesn't exist
    pub async fn delete_user(&self, user_id: i64) -> CascadeResult<Option<UserDeletion>> {
        let mut tx = self.pool.begin().await?;

        let Some(user) = User::find_by_id_for_update(&mut *tx, user_id).await? else {
            return Ok(None);
        };

        let cascade = rules::on_user_deleted(&mut tx, &user, self.config.add_policy).await?;

        for company in &cascade.companies {
            for observer in &self.observers {
                observer.force_deleted(&mut tx, company).await?;
            }
        }

        User::delete(&mut *tx, user.id).await?;

        tx.commit().await?;

        info!(
            user_id,
            companies = cascade.companies.len(),
            adds = cascade.adds_deleted,
            "User deleted"
        );

        Ok(Some(UserDeletion {
            user,
            companies_deleted: cascade.companies.len(),
            adds_deleted: cascade.adds_deleted,
        }))
    }
}
