use std::{fmt::Debug, time::Duration};

use chrono::Utc;
use log::*;

use crate::{
    cms_api::{bounded, identity::Identity, DEFAULT_STORE_TIMEOUT},
    db_types::{MatchId, MatchRequest, MatchRequestDetail, NewMatchRequest},
    events::{EventProducers, MatchApprovedEvent, MatchRequestedEvent},
    match_rules::validate_new_request,
    traits::{ApprovalResult, MatchError, MatchManagement},
};

/// `MatchFlowApi` is the primary API for the match request lifecycle.
///
/// The backend does the heavy lifting: each transition is a single atomic unit in the store. This layer checks the
/// caller's identity, rejects malformed input early, bounds each store call in time, and tells any registered hooks
/// about the outcome once it has been committed.
pub struct MatchFlowApi<B> {
    db: B,
    producers: EventProducers,
    store_timeout: Duration,
}

impl<B> Debug for MatchFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MatchFlowApi")
    }
}

impl<B> MatchFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers, store_timeout: DEFAULT_STORE_TIMEOUT }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> MatchFlowApi<B>
where B: MatchManagement
{
    /// Proposes a match between one of the caller's cats and somebody else's cat.
    ///
    /// Success depends only on the request being stored. The `MatchRequested` hook is told afterwards, and whatever
    /// happens to that notification has no bearing on the result.
    pub async fn create_match_request(
        &self,
        identity: &Identity,
        request: NewMatchRequest,
    ) -> Result<MatchRequest, MatchError> {
        identity.check_not_expired(Utc::now())?;
        validate_new_request(&request)?;
        trace!("🔄️💌️ User {} proposes {} -> {}", identity.user_id, request.issuer_cat_id, request.match_cat_id);
        let created = bounded(self.store_timeout, self.db.create_match_request(&identity.user_id, request)).await?;
        info!("🔄️💌️ Match request {} created by user {}", created.id, identity.user_id);
        self.producers.publish_match_requested(MatchRequestedEvent::new(created.clone()));
        Ok(created)
    }

    /// Every match request that involves one of the caller's cats, whichever side it is on. Newest first.
    pub async fn my_match_requests(&self, identity: &Identity) -> Result<Vec<MatchRequestDetail>, MatchError> {
        identity.check_not_expired(Utc::now())?;
        let requests = bounded(self.store_timeout, self.db.fetch_match_details_for_owner(&identity.user_id)).await?;
        debug!("🔄️📜️ {} match requests found for user {}", requests.len(), identity.user_id);
        Ok(requests)
    }

    /// Accepts a match request on behalf of the target cat's owner. Both cats become matched, and every other pending
    /// request involving either of them is deleted.
    pub async fn approve_match_request(&self, identity: &Identity, id: &MatchId) -> Result<ApprovalResult, MatchError> {
        identity.check_not_expired(Utc::now())?;
        check_match_id(id)?;
        let result = bounded(self.store_timeout, self.db.approve_match_request(&identity.user_id, id)).await?;
        info!(
            "🔄️💞️ Match request {id} approved by user {}. {} competing requests invalidated",
            identity.user_id,
            result.invalidated.len()
        );
        self.producers.publish_match_approved(MatchApprovedEvent::new(result.approved.clone(), result.invalidated.clone()));
        Ok(result)
    }

    /// Turns a match request down on behalf of the target cat's owner. No other request is affected.
    pub async fn reject_match_request(&self, identity: &Identity, id: &MatchId) -> Result<MatchRequest, MatchError> {
        identity.check_not_expired(Utc::now())?;
        check_match_id(id)?;
        let rejected = bounded(self.store_timeout, self.db.reject_match_request(&identity.user_id, id)).await?;
        info!("🔄️💔️ Match request {id} rejected by user {}", identity.user_id);
        Ok(rejected)
    }

    /// Withdraws a pending match request on behalf of the issuer cat's owner. Returns the removed request.
    pub async fn withdraw_match_request(&self, identity: &Identity, id: &MatchId) -> Result<MatchRequest, MatchError> {
        identity.check_not_expired(Utc::now())?;
        check_match_id(id)?;
        let withdrawn = bounded(self.store_timeout, self.db.withdraw_match_request(&identity.user_id, id)).await?;
        info!("🔄️🗑️ Match request {id} withdrawn by user {}", identity.user_id);
        Ok(withdrawn)
    }
}

fn check_match_id(id: &MatchId) -> Result<(), MatchError> {
    if id.is_valid() {
        Ok(())
    } else {
        Err(MatchError::InvalidPayload(format!("'{id}' is not a valid match request id")))
    }
}
