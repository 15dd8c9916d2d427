use crate::{
    db_types::{Cat, CatId, CatUpdate, NewCat, NewUser, User, UserId},
    traits::MatchError,
};

/// Storage for cats and the profiles of the users that own them.
///
/// Soft-deleted cats are invisible to every method on this trait.
#[allow(async_fn_in_trait)]
pub trait CatManagement {
    /// Fetches the cat with the given id, unless it does not exist or has been soft-deleted.
    async fn fetch_cat(&self, id: &CatId) -> Result<Option<Cat>, MatchError>;

    /// Fetches all the (live) cats belonging to `owner`, newest first.
    async fn fetch_cats_for_owner(&self, owner: &UserId) -> Result<Vec<Cat>, MatchError>;

    /// Registers a new cat for `owner`. The owner's profile must already exist.
    async fn insert_cat(&self, owner: &UserId, cat: NewCat) -> Result<Cat, MatchError>;

    /// Replaces the attributes of a cat. Only the owner may do this, and a matched cat cannot change its sex.
    async fn update_cat(&self, owner: &UserId, id: &CatId, update: CatUpdate) -> Result<Cat, MatchError>;

    /// Soft-deletes a cat. Any pending match requests involving the cat are withdrawn in the same transaction.
    async fn soft_delete_cat(&self, owner: &UserId, id: &CatId) -> Result<Cat, MatchError>;

    /// Stores a user profile. Profiles are normally provisioned by the identity service.
    async fn insert_user(&self, user: NewUser) -> Result<User, MatchError>;

    async fn fetch_user(&self, id: &UserId) -> Result<Option<User>, MatchError>;
}
