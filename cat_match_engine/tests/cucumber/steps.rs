use cat_match_engine::{
    db_types::{MatchStatus, NewMatchRequest},
    CatManagement,
    MatchManagement,
};
use cucumber::{then, when};

use crate::{cucumber::CatMatchWorld, support::identity_for};

const MESSAGE: &str = "Our cats would get along famously";

#[when(expr = "{word} proposes {word} to {word}")]
async fn propose(world: &mut CatMatchWorld, owner: String, issuer: String, target: String) {
    let system = world.system();
    let identity = identity_for(system.user(&owner));
    let request = NewMatchRequest::new(system.cat(&issuer).id.clone(), system.cat(&target).id.clone(), MESSAGE);
    let result = system.api.create_match_request(&identity, request).await;
    if let Some(created) = system.record(result) {
        system.requests.insert((issuer, target), created);
    }
}

#[when(expr = "{word} approves the request from {word} to {word}")]
async fn approve(world: &mut CatMatchWorld, owner: String, issuer: String, target: String) {
    let system = world.system();
    let identity = identity_for(system.user(&owner));
    let id = system.request(&issuer, &target).id.clone();
    let result = system.api.approve_match_request(&identity, &id).await;
    system.record(result);
}

#[when(expr = "{word} rejects the request from {word} to {word}")]
async fn reject(world: &mut CatMatchWorld, owner: String, issuer: String, target: String) {
    let system = world.system();
    let identity = identity_for(system.user(&owner));
    let id = system.request(&issuer, &target).id.clone();
    let result = system.api.reject_match_request(&identity, &id).await;
    system.record(result);
}

#[when(expr = "{word} withdraws the request from {word} to {word}")]
async fn withdraw(world: &mut CatMatchWorld, owner: String, issuer: String, target: String) {
    let system = world.system();
    let identity = identity_for(system.user(&owner));
    let id = system.request(&issuer, &target).id.clone();
    let result = system.api.withdraw_match_request(&identity, &id).await;
    system.record(result);
}

#[then("the last call succeeded")]
async fn last_call_succeeded(world: &mut CatMatchWorld) {
    let system = world.system();
    assert!(system.last_error.is_none(), "Expected success, got {:?}", system.last_error);
}

#[then(expr = "the last call failed with a {word}")]
async fn last_call_failed(world: &mut CatMatchWorld, kind: String) {
    let system = world.system();
    let err = system.last_error.as_ref().expect("Expected the last call to fail");
    assert_eq!(err.kind().as_str(), kind, "Unexpected error: {err}");
}

#[then(expr = "the request from {word} to {word} is {word}")]
async fn request_status(world: &mut CatMatchWorld, issuer: String, target: String, status: String) {
    let system = world.system();
    let id = system.request(&issuer, &target).id.clone();
    let request = system.api.db().fetch_match_request(&id).await.unwrap().expect("Request no longer exists");
    let expected = MatchStatus::from(status);
    assert_eq!(request.status, expected);
}

#[then(expr = "the request from {word} to {word} no longer exists")]
async fn request_gone(world: &mut CatMatchWorld, issuer: String, target: String) {
    let system = world.system();
    let id = system.request(&issuer, &target).id.clone();
    let request = system.api.db().fetch_match_request(&id).await.unwrap();
    assert!(request.is_none(), "Request {id} still exists");
}

#[then(expr = "there is no request between {word} and {word}")]
async fn no_request_between(world: &mut CatMatchWorld, a: String, b: String) {
    let system = world.system();
    let (a, b) = (system.cat(&a).id.clone(), system.cat(&b).id.clone());
    let request = system.api.db().find_match_by_pair(&a, &b).await.unwrap();
    assert!(request.is_none(), "Found {request:?}");
}

#[then(expr = "{word} has no pending requests")]
async fn no_pending_requests(world: &mut CatMatchWorld, cat: String) {
    let system = world.system();
    let id = system.cat(&cat).id.clone();
    let requests = system.api.db().fetch_match_requests_for_cat(&id).await.unwrap();
    assert!(requests.iter().all(|r| !r.is_pending()), "{cat} still has pending requests");
}

#[then(expr = "{word} is matched")]
async fn cat_is_matched(world: &mut CatMatchWorld, cat: String) {
    assert!(has_matched(world, &cat).await, "{cat} should be matched");
}

#[then(expr = "{word} is not matched")]
async fn cat_is_not_matched(world: &mut CatMatchWorld, cat: String) {
    assert!(!has_matched(world, &cat).await, "{cat} should not be matched");
}

async fn has_matched(world: &mut CatMatchWorld, cat: &str) -> bool {
    let system = world.system();
    let id = system.cat(cat).id.clone();
    system.api.db().fetch_cat(&id).await.unwrap().expect("Cat does not exist").has_matched
}
