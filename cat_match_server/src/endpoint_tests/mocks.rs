use cat_match_engine::{
    db_types::{
        Cat,
        CatId,
        CatUpdate,
        MatchId,
        MatchRequest,
        MatchRequestDetail,
        NewCat,
        NewMatchRequest,
        NewUser,
        User,
        UserId,
    },
    ApprovalResult,
    CatManagement,
    MatchError,
    MatchManagement,
};
use mockall::mock;

mock! {
    pub MatchManager {}
    impl MatchManagement for MatchManager {
        async fn fetch_match_request(&self, id: &MatchId) -> Result<Option<MatchRequest>, MatchError>;
        async fn find_match_by_pair(&self, a: &CatId, b: &CatId) -> Result<Option<MatchRequest>, MatchError>;
        async fn fetch_match_requests_for_cat(&self, cat: &CatId) -> Result<Vec<MatchRequest>, MatchError>;
        async fn fetch_match_details_for_owner(&self, owner: &UserId) -> Result<Vec<MatchRequestDetail>, MatchError>;
        async fn create_match_request(&self, caller: &UserId, request: NewMatchRequest) -> Result<MatchRequest, MatchError>;
        async fn approve_match_request(&self, caller: &UserId, id: &MatchId) -> Result<ApprovalResult, MatchError>;
        async fn reject_match_request(&self, caller: &UserId, id: &MatchId) -> Result<MatchRequest, MatchError>;
        async fn withdraw_match_request(&self, caller: &UserId, id: &MatchId) -> Result<MatchRequest, MatchError>;
    }
}

mock! {
    pub CatManager {}
    impl CatManagement for CatManager {
        async fn fetch_cat(&self, id: &CatId) -> Result<Option<Cat>, MatchError>;
        async fn fetch_cats_for_owner(&self, owner: &UserId) -> Result<Vec<Cat>, MatchError>;
        async fn insert_cat(&self, owner: &UserId, cat: NewCat) -> Result<Cat, MatchError>;
        async fn update_cat(&self, owner: &UserId, id: &CatId, update: CatUpdate) -> Result<Cat, MatchError>;
        async fn soft_delete_cat(&self, owner: &UserId, id: &CatId) -> Result<Cat, MatchError>;
        async fn insert_user(&self, user: NewUser) -> Result<User, MatchError>;
        async fn fetch_user(&self, id: &UserId) -> Result<Option<User>, MatchError>;
    }
}
