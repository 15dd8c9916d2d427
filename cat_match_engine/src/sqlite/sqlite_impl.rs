//! `SqliteDatabase` is a concrete implementation of a match lifecycle engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! Every mutating method is a single transaction. Transactions that touch match requests open by taking the write
//! lock on the participant cats (see [`cats::lock_cats`]) and only then read and check the records they are about to
//! change. Two approvals involving the same cat are therefore serialised, and the second one sees the first one's
//! writes when it re-checks its preconditions.
use std::fmt::Debug;

use log::*;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::db::{cats, db_url, matches, new_pool, users};
use crate::{
    db_types::{
        Cat,
        CatId,
        CatUpdate,
        MatchId,
        MatchRequest,
        MatchRequestDetail,
        MatchStatus,
        NewCat,
        NewMatchRequest,
        NewUser,
        User,
        UserId,
    },
    match_rules::{
        check_cat_edit,
        check_cat_owner,
        check_creation,
        check_decision,
        check_withdrawal,
        pending_to_invalidate,
        validate_new_cat,
        validate_new_request,
    },
    traits::{ApprovalResult, CatManagement, MatchError, MatchManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `CMS_DATABASE_URL`
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), MatchError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MatchError::DatabaseError(format!("Migration failed. {e}")))?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    /// Closes the connection pool. Outstanding connections are waited for.
    pub async fn close(&mut self) {
        self.pool.close().await;
    }

    /// Opens a transaction whose first act is to take the write lock on the given cats.
    async fn begin_locked(&self, ids: &[&CatId]) -> Result<Transaction<'static, Sqlite>, MatchError> {
        let mut tx = self.pool.begin().await?;
        cats::lock_cats(ids, &mut tx).await?;
        Ok(tx)
    }

    /// Reads the request outside any transaction, so that we know which cats to lock.
    async fn fetch_existing_request(&self, id: &MatchId) -> Result<MatchRequest, MatchError> {
        let mut conn = self.pool.acquire().await?;
        matches::fetch_match_request(id, &mut conn).await?.ok_or_else(|| MatchError::MatchRequestNotFound(id.clone()))
    }

    /// Re-reads the request and both of its cats from inside a locked transaction.
    async fn locked_snapshot(
        id: &MatchId,
        tx: &mut Transaction<'static, Sqlite>,
    ) -> Result<(MatchRequest, Option<Cat>, Option<Cat>), MatchError> {
        let request = matches::fetch_match_request(id, tx)
            .await?
            .ok_or_else(|| MatchError::MatchRequestNotFound(id.clone()))?;
        let issuer = cats::fetch_cat(&request.issuer_cat_id, tx).await?;
        let target = cats::fetch_cat(&request.match_cat_id, tx).await?;
        Ok((request, issuer, target))
    }

    /// Deletes every pending request involving one of `matched`, except `keep`.
    async fn invalidate_pending(
        keep: Option<&MatchId>,
        matched: &[&CatId],
        tx: &mut Transaction<'static, Sqlite>,
    ) -> Result<Vec<MatchId>, MatchError> {
        let mut related = Vec::new();
        for cat in matched {
            related.extend(matches::match_requests_for_cat(cat, tx).await?);
        }
        let doomed = pending_to_invalidate(keep, matched, &related);
        let mut invalidated = Vec::with_capacity(doomed.len());
        for id in doomed {
            // We hold the lock on every cat involved, so a pending request cannot disappear under us
            if matches::delete_pending_match(id, tx).await? != 1 {
                return Err(MatchError::DatabaseError(format!("Pending match request {id} vanished mid-transaction")));
            }
            trace!("🗃️ Pending match request {id} invalidated");
            invalidated.push(id.clone());
        }
        Ok(invalidated)
    }
}

impl CatManagement for SqliteDatabase {
    async fn fetch_cat(&self, id: &CatId) -> Result<Option<Cat>, MatchError> {
        let mut conn = self.pool.acquire().await?;
        let cat = cats::fetch_cat(id, &mut conn).await?;
        Ok(cat)
    }

    async fn fetch_cats_for_owner(&self, owner: &UserId) -> Result<Vec<Cat>, MatchError> {
        let mut conn = self.pool.acquire().await?;
        let cats = cats::fetch_cats_for_owner(owner, &mut conn).await?;
        Ok(cats)
    }

    async fn insert_cat(&self, owner: &UserId, cat: NewCat) -> Result<Cat, MatchError> {
        validate_new_cat(&cat)?;
        // Other connections only see the new row once it is committed
        let mut tx = self.pool.begin().await?;
        if users::fetch_user(owner, &mut tx).await?.is_none() {
            return Err(MatchError::UserNotFound(owner.clone()));
        }
        let cat = cats::insert_cat(owner, cat, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Cat {} registered for user {owner}", cat.id);
        Ok(cat)
    }

    async fn update_cat(&self, owner: &UserId, id: &CatId, update: CatUpdate) -> Result<Cat, MatchError> {
        validate_new_cat(&update.clone().into())?;
        let mut tx = self.begin_locked(&[id]).await?;
        let existing = cats::fetch_cat(id, &mut tx).await?;
        check_cat_edit(owner, id, existing.as_ref(), &update)?;
        let cat = cats::update_cat(id, update, &mut tx).await?.ok_or_else(|| MatchError::CatNotFound(id.clone()))?;
        tx.commit().await?;
        debug!("🗃️ Cat {id} updated");
        Ok(cat)
    }

    async fn soft_delete_cat(&self, owner: &UserId, id: &CatId) -> Result<Cat, MatchError> {
        let mut tx = self.begin_locked(&[id]).await?;
        let existing = cats::fetch_cat(id, &mut tx).await?;
        check_cat_owner(owner, id, existing.as_ref())?;
        let cat = cats::soft_delete_cat(id, &mut tx).await?.ok_or_else(|| MatchError::CatNotFound(id.clone()))?;
        let withdrawn = Self::invalidate_pending(None, &[id], &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Cat {id} deleted. {} pending match requests were withdrawn with it", withdrawn.len());
        Ok(cat)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, MatchError> {
        let mut tx = self.pool.begin().await?;
        let user = users::insert_user(user, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User profile {} stored", user.id);
        Ok(user)
    }

    async fn fetch_user(&self, id: &UserId) -> Result<Option<User>, MatchError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(id, &mut conn).await?;
        Ok(user)
    }
}

impl MatchManagement for SqliteDatabase {
    async fn fetch_match_request(&self, id: &MatchId) -> Result<Option<MatchRequest>, MatchError> {
        let mut conn = self.pool.acquire().await?;
        let request = matches::fetch_match_request(id, &mut conn).await?;
        Ok(request)
    }

    async fn find_match_by_pair(&self, a: &CatId, b: &CatId) -> Result<Option<MatchRequest>, MatchError> {
        let mut conn = self.pool.acquire().await?;
        let request = matches::find_match_by_pair(a, b, &mut conn).await?;
        Ok(request)
    }

    async fn fetch_match_requests_for_cat(&self, cat: &CatId) -> Result<Vec<MatchRequest>, MatchError> {
        let mut conn = self.pool.acquire().await?;
        let requests = matches::match_requests_for_cat(cat, &mut conn).await?;
        Ok(requests)
    }

    async fn fetch_match_details_for_owner(&self, owner: &UserId) -> Result<Vec<MatchRequestDetail>, MatchError> {
        let mut conn = self.pool.acquire().await?;
        let details = matches::match_details_for_owner(owner, &mut conn).await?;
        trace!("🗃️ Fetched {} match requests for user {owner}", details.len());
        Ok(details)
    }

    async fn create_match_request(
        &self,
        caller: &UserId,
        request: NewMatchRequest,
    ) -> Result<MatchRequest, MatchError> {
        validate_new_request(&request)?;
        let mut tx = self.begin_locked(&[&request.issuer_cat_id, &request.match_cat_id]).await?;
        let issuer = cats::fetch_cat(&request.issuer_cat_id, &mut tx).await?;
        let target = cats::fetch_cat(&request.match_cat_id, &mut tx).await?;
        let existing = matches::find_match_by_pair(&request.issuer_cat_id, &request.match_cat_id, &mut tx).await?;
        check_creation(caller, &request, issuer.as_ref(), target.as_ref(), existing.as_ref())?;
        let created = matches::insert_match_request(request, &mut tx).await.map_err(|e| match MatchError::from(e) {
            MatchError::DuplicateRecord(_) => MatchError::DuplicateRequest,
            e => e,
        })?;
        tx.commit().await?;
        debug!("🗃️ Match request {} created: {} -> {}", created.id, created.issuer_cat_id, created.match_cat_id);
        Ok(created)
    }

    async fn approve_match_request(&self, caller: &UserId, id: &MatchId) -> Result<ApprovalResult, MatchError> {
        let known = self.fetch_existing_request(id).await?;
        let pair = [&known.issuer_cat_id, &known.match_cat_id];
        let mut tx = self.begin_locked(&pair).await?;
        let (request, issuer, target) = Self::locked_snapshot(id, &mut tx).await?;
        check_decision(caller, &request, issuer.as_ref(), target.as_ref())?;
        let approved = matches::update_match_status(id, MatchStatus::Approved, &mut tx)
            .await?
            .ok_or_else(|| MatchError::MatchRequestNotFound(id.clone()))?;
        for cat in pair {
            if !cats::set_cat_matched(cat, &mut tx).await? {
                return Err(MatchError::CatNotFound(cat.clone()));
            }
        }
        let invalidated = Self::invalidate_pending(Some(id), &pair, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Match request {id} approved. Cats {} and {} are matched. {} competing requests were invalidated",
            approved.issuer_cat_id,
            approved.match_cat_id,
            invalidated.len()
        );
        Ok(ApprovalResult { approved, invalidated })
    }

    async fn reject_match_request(&self, caller: &UserId, id: &MatchId) -> Result<MatchRequest, MatchError> {
        let known = self.fetch_existing_request(id).await?;
        let mut tx = self.begin_locked(&[&known.issuer_cat_id, &known.match_cat_id]).await?;
        let (request, issuer, target) = Self::locked_snapshot(id, &mut tx).await?;
        check_decision(caller, &request, issuer.as_ref(), target.as_ref())?;
        let rejected = matches::update_match_status(id, MatchStatus::Rejected, &mut tx)
            .await?
            .ok_or_else(|| MatchError::MatchRequestNotFound(id.clone()))?;
        tx.commit().await?;
        debug!("🗃️ Match request {id} rejected");
        Ok(rejected)
    }

    async fn withdraw_match_request(&self, caller: &UserId, id: &MatchId) -> Result<MatchRequest, MatchError> {
        let known = self.fetch_existing_request(id).await?;
        let mut tx = self.begin_locked(&[&known.issuer_cat_id, &known.match_cat_id]).await?;
        let (request, issuer, _) = Self::locked_snapshot(id, &mut tx).await?;
        check_withdrawal(caller, &request, issuer.as_ref())?;
        if matches::delete_pending_match(id, &mut tx).await? == 0 {
            return Err(MatchError::MatchRequestNotFound(id.clone()));
        }
        tx.commit().await?;
        debug!("🗃️ Match request {id} withdrawn");
        Ok(request)
    }
}
