//! Match lifecycle rules
//!
//! Every state transition of a match request is guarded by a set of preconditions. They live here, as pure functions
//! over already-fetched records, so that every backend applies exactly the same rules in exactly the same order.
//!
//! Backends are expected to call these *inside* their atomic unit, after the participant cats have been locked, so
//! that the records being checked are the records that will be written.
//!
//! Each check short-circuits on the first failing condition.
use std::collections::HashSet;

use url::Url;

use crate::{
    db_types::{
        Cat,
        CatId,
        CatUpdate,
        MatchId,
        MatchRequest,
        NewCat,
        NewMatchRequest,
        UserId,
        CAT_DESCRIPTION_MAX_LEN,
        CAT_MAX_AGE_IN_MONTHS,
        CAT_NAME_MAX_LEN,
        MESSAGE_MAX_LEN,
        MESSAGE_MIN_LEN,
    },
    traits::MatchError,
};

//--------------------------------------     Match requests      -------------------------------------------------------

/// Checks that a creation payload is well-formed. This does not touch the store.
pub fn validate_new_request(request: &NewMatchRequest) -> Result<(), MatchError> {
    if !request.issuer_cat_id.is_valid() {
        return Err(MatchError::InvalidPayload(format!("userCatId '{}' is not a valid id", request.issuer_cat_id)));
    }
    if !request.match_cat_id.is_valid() {
        return Err(MatchError::InvalidPayload(format!("matchCatId '{}' is not a valid id", request.match_cat_id)));
    }
    if request.issuer_cat_id == request.match_cat_id {
        return Err(MatchError::InvalidPayload("A cat cannot be matched with itself".to_string()));
    }
    let len = request.message.trim().chars().count();
    if !(MESSAGE_MIN_LEN..=MESSAGE_MAX_LEN).contains(&len) {
        return Err(MatchError::InvalidPayload(format!(
            "message must be between {MESSAGE_MIN_LEN} and {MESSAGE_MAX_LEN} characters long"
        )));
    }
    Ok(())
}

/// The creation preconditions, in order:
/// 1. the issuer cat exists and belongs to the caller,
/// 2. the target cat exists,
/// 3. no request links the pair yet, in either direction,
/// 4. the cats have different sexes,
/// 5. neither cat is matched,
/// 6. the cats have different owners.
pub fn check_creation(
    caller: &UserId,
    request: &NewMatchRequest,
    issuer: Option<&Cat>,
    target: Option<&Cat>,
    existing: Option<&MatchRequest>,
) -> Result<(), MatchError> {
    let issuer = issuer.ok_or_else(|| MatchError::CatNotFound(request.issuer_cat_id.clone()))?;
    if !issuer.is_owned_by(caller) {
        return Err(MatchError::NotCatOwner(issuer.id.clone()));
    }
    let target = target.ok_or_else(|| MatchError::CatNotFound(request.match_cat_id.clone()))?;
    if existing.is_some() {
        return Err(MatchError::DuplicateRequest);
    }
    if issuer.sex == target.sex {
        return Err(MatchError::SameSex);
    }
    check_unmatched(issuer, target)?;
    if issuer.owner_id == target.owner_id {
        return Err(MatchError::SameOwner);
    }
    Ok(())
}

/// Preconditions shared by approval and rejection. Only the owner of the *target* cat may decide, the request must
/// still be pending, and neither cat may have been matched in the meantime.
pub fn check_decision(
    caller: &UserId,
    request: &MatchRequest,
    issuer: Option<&Cat>,
    target: Option<&Cat>,
) -> Result<(), MatchError> {
    let target = target.ok_or_else(|| MatchError::CatNotFound(request.match_cat_id.clone()))?;
    if !target.is_owned_by(caller) {
        return Err(MatchError::NotCatOwner(target.id.clone()));
    }
    check_pending(request)?;
    let issuer = issuer.ok_or_else(|| MatchError::CatNotFound(request.issuer_cat_id.clone()))?;
    check_unmatched(issuer, target)
}

/// Only the owner of the *issuer* cat may withdraw a request, and only while it is pending.
pub fn check_withdrawal(caller: &UserId, request: &MatchRequest, issuer: Option<&Cat>) -> Result<(), MatchError> {
    let issuer = issuer.ok_or_else(|| MatchError::CatNotFound(request.issuer_cat_id.clone()))?;
    if !issuer.is_owned_by(caller) {
        return Err(MatchError::NotCatOwner(issuer.id.clone()));
    }
    check_pending(request)
}

/// Selects the requests that must be deleted once the cats in `matched` have been matched: every still-pending request
/// that involves one of them, other than `keep`. Each id appears once, in the order first seen.
pub fn pending_to_invalidate<'a>(
    keep: Option<&MatchId>,
    matched: &[&CatId],
    requests: &'a [MatchRequest],
) -> Vec<&'a MatchId> {
    let mut seen = HashSet::new();
    requests
        .iter()
        .filter(|r| r.is_pending())
        .filter(|r| Some(&r.id) != keep)
        .filter(|r| matched.iter().any(|c| r.involves(c)))
        .map(|r| &r.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn check_pending(request: &MatchRequest) -> Result<(), MatchError> {
    if request.status.is_terminal() {
        return Err(MatchError::NotPending(request.id.clone(), request.status));
    }
    Ok(())
}

fn check_unmatched(a: &Cat, b: &Cat) -> Result<(), MatchError> {
    match (a.has_matched, b.has_matched) {
        (true, _) => Err(MatchError::AlreadyMatched(a.id.clone())),
        (_, true) => Err(MatchError::AlreadyMatched(b.id.clone())),
        _ => Ok(()),
    }
}

//--------------------------------------          Cats           -------------------------------------------------------

pub fn validate_new_cat(cat: &NewCat) -> Result<(), MatchError> {
    let name_len = cat.name.trim().chars().count();
    if !(1..=CAT_NAME_MAX_LEN).contains(&name_len) {
        return Err(MatchError::InvalidPayload(format!("name must be between 1 and {CAT_NAME_MAX_LEN} characters")));
    }
    let desc_len = cat.description.trim().chars().count();
    if !(1..=CAT_DESCRIPTION_MAX_LEN).contains(&desc_len) {
        return Err(MatchError::InvalidPayload(format!(
            "description must be between 1 and {CAT_DESCRIPTION_MAX_LEN} characters"
        )));
    }
    if !(1..=CAT_MAX_AGE_IN_MONTHS).contains(&cat.age_in_months) {
        return Err(MatchError::InvalidPayload(format!("ageInMonths must be between 1 and {CAT_MAX_AGE_IN_MONTHS}")));
    }
    if cat.image_urls.is_empty() {
        return Err(MatchError::InvalidPayload("at least one image url is required".to_string()));
    }
    if let Some(bad) = cat.image_urls.iter().find(|u| Url::parse(u).is_err()) {
        return Err(MatchError::InvalidPayload(format!("'{bad}' is not a valid url")));
    }
    Ok(())
}

/// The caller must own the cat they are editing or deleting.
pub fn check_cat_owner<'a>(caller: &UserId, id: &CatId, cat: Option<&'a Cat>) -> Result<&'a Cat, MatchError> {
    let cat = cat.ok_or_else(|| MatchError::CatNotFound(id.clone()))?;
    if !cat.is_owned_by(caller) {
        return Err(MatchError::NotCatOwner(id.clone()));
    }
    Ok(cat)
}

/// A matched cat keeps its sex, so that approved pairs always satisfy the different-sex rule.
pub fn check_cat_edit(caller: &UserId, id: &CatId, cat: Option<&Cat>, update: &CatUpdate) -> Result<(), MatchError> {
    let cat = check_cat_owner(caller, id, cat)?;
    if cat.has_matched && cat.sex != update.sex {
        return Err(MatchError::MatchedCatSexChange);
    }
    Ok(())
}
