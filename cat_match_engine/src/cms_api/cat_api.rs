use std::{fmt::Debug, time::Duration};

use chrono::Utc;
use log::*;

use crate::{
    cms_api::{bounded, identity::Identity, DEFAULT_STORE_TIMEOUT},
    db_types::{Cat, CatId, CatUpdate, NewCat},
    match_rules::validate_new_cat,
    traits::{CatManagement, MatchError},
};

/// Lets owners register, edit, list and delete their cats.
pub struct CatApi<B> {
    db: B,
    store_timeout: Duration,
}

impl<B> Debug for CatApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatApi")
    }
}

impl<B> CatApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, store_timeout: DEFAULT_STORE_TIMEOUT }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CatApi<B>
where B: CatManagement
{
    pub async fn register_cat(&self, identity: &Identity, cat: NewCat) -> Result<Cat, MatchError> {
        identity.check_not_expired(Utc::now())?;
        validate_new_cat(&cat)?;
        let cat = bounded(self.store_timeout, self.db.insert_cat(&identity.user_id, cat)).await?;
        info!("🔄️🐈️ {} registered cat {} ({})", identity.user_id, cat.id, cat.name);
        Ok(cat)
    }

    pub async fn my_cats(&self, identity: &Identity) -> Result<Vec<Cat>, MatchError> {
        identity.check_not_expired(Utc::now())?;
        bounded(self.store_timeout, self.db.fetch_cats_for_owner(&identity.user_id)).await
    }

    pub async fn update_cat(&self, identity: &Identity, id: &CatId, update: CatUpdate) -> Result<Cat, MatchError> {
        identity.check_not_expired(Utc::now())?;
        validate_new_cat(&update.clone().into())?;
        let cat = bounded(self.store_timeout, self.db.update_cat(&identity.user_id, id, update)).await?;
        debug!("🔄️🐈️ Cat {id} updated by its owner");
        Ok(cat)
    }

    /// Soft-deletes the cat. Its pending match requests go with it.
    pub async fn delete_cat(&self, identity: &Identity, id: &CatId) -> Result<Cat, MatchError> {
        identity.check_not_expired(Utc::now())?;
        let cat = bounded(self.store_timeout, self.db.soft_delete_cat(&identity.user_id, id)).await?;
        info!("🔄️🐈️ Cat {id} deleted by its owner");
        Ok(cat)
    }
}
