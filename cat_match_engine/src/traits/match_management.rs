use crate::{
    db_types::{CatId, MatchId, MatchRequest, MatchRequestDetail, NewMatchRequest, UserId},
    traits::{ApprovalResult, MatchError},
};

/// Storage and atomic state transitions for match requests.
#[allow(async_fn_in_trait)]
pub trait MatchManagement {
    async fn fetch_match_request(&self, id: &MatchId) -> Result<Option<MatchRequest>, MatchError>;

    /// Looks for any request linking the two cats, in either direction and with any status.
    async fn find_match_by_pair(&self, a: &CatId, b: &CatId) -> Result<Option<MatchRequest>, MatchError>;

    /// Every request that references `cat`, as issuer or as target.
    async fn fetch_match_requests_for_cat(&self, cat: &CatId) -> Result<Vec<MatchRequest>, MatchError>;

    /// Every request touching any cat owned by `owner`, joined with the issuer's profile and both cats, newest first.
    async fn fetch_match_details_for_owner(&self, owner: &UserId) -> Result<Vec<MatchRequestDetail>, MatchError>;

    /// In a single atomic unit, checks every creation precondition against the current state of both cats and stores
    /// a new `pending` request.
    async fn create_match_request(
        &self,
        caller: &UserId,
        request: NewMatchRequest,
    ) -> Result<MatchRequest, MatchError>;

    /// In a single atomic unit:
    /// * re-validates the decision preconditions with both cats locked,
    /// * marks the request `approved`,
    /// * flags both cats as matched,
    /// * deletes every other pending request that involves either cat.
    ///
    /// If any step fails, nothing is applied.
    async fn approve_match_request(&self, caller: &UserId, id: &MatchId) -> Result<ApprovalResult, MatchError>;

    /// Marks a pending request as `rejected`. Other requests are unaffected.
    async fn reject_match_request(&self, caller: &UserId, id: &MatchId) -> Result<MatchRequest, MatchError>;

    /// Permanently removes a pending request on behalf of the issuer's owner. Returns the removed record.
    async fn withdraw_match_request(&self, caller: &UserId, id: &MatchId) -> Result<MatchRequest, MatchError>;
}
