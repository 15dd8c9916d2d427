use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use cat_match_engine::{
    db_types::{CatId, IssuerProfile, MatchId, MatchRequestDetail, MatchStatus, CatSummary, Race, Sex},
    events::EventProducers,
    ApprovalResult,
    MatchError,
    MatchFlowApi,
};
use chrono::Duration;
use serde_json::{json, Value};

use super::helpers::{error_kind, issue_token, match_request, send_request, timestamp, valid_token, ALICE, BOB, LUNA, REQUEST_ID, TOM};
use crate::{
    endpoint_tests::mocks::MockMatchManager,
    routes::{ApproveMatchRoute, CreateMatchRoute, MyMatchesRoute, RejectMatchRoute, WithdrawMatchRoute},
};

fn new_request_body() -> Value {
    json!({ "userCatId": TOM, "matchCatId": LUNA, "message": "Tom would love to meet Luna" })
}

fn register(cfg: &mut ServiceConfig, manager: MockMatchManager) {
    let api = MatchFlowApi::new(manager, EventProducers::default());
    cfg.service(CreateMatchRoute::<MockMatchManager>::new())
        .service(MyMatchesRoute::<MockMatchManager>::new())
        .service(ApproveMatchRoute::<MockMatchManager>::new())
        .service(RejectMatchRoute::<MockMatchManager>::new())
        .service(WithdrawMatchRoute::<MockMatchManager>::new())
        .app_data(web::Data::new(api));
}

// Any call that reaches the backend fails the test
fn configure_untouched(cfg: &mut ServiceConfig) {
    register(cfg, MockMatchManager::new());
}

#[actix_web::test]
async fn create_match_without_token() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match").set_json(new_request_body());
    let (status, body) = send_request(req, None, configure_untouched).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_kind(&body), "authentication_error");
}

#[actix_web::test]
async fn create_match_with_tampered_token() {
    let _ = env_logger::try_init().ok();
    let mut token = valid_token(ALICE);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let req = TestRequest::post().uri("/cat/match").set_json(new_request_body());
    let (status, body) = send_request(req, Some(&token), configure_untouched).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_kind(&body), "authentication_error");
}

#[actix_web::test]
async fn create_match_with_expired_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(ALICE, Duration::minutes(-1));
    let req = TestRequest::post().uri("/cat/match").set_json(new_request_body());
    let (status, body) = send_request(req, Some(&token), configure_untouched).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_kind(&body), "authentication_error");
    assert!(body.contains("expired"));
}

#[actix_web::test]
async fn create_match_with_malformed_body() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match").set_json(json!({ "userCatId": TOM }));
    let (status, body) = send_request(req, Some(&valid_token(ALICE)), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&body), "validation_error");
}

#[actix_web::test]
async fn create_match_with_short_message() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "userCatId": TOM, "matchCatId": LUNA, "message": "hey" });
    let req = TestRequest::post().uri("/cat/match").set_json(body);
    let (status, body) = send_request(req, Some(&valid_token(ALICE)), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&body), "validation_error");
}

#[actix_web::test]
async fn create_match() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match").set_json(new_request_body());
    let (status, body) = send_request(req, Some(&valid_token(ALICE)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager
            .expect_create_match_request()
            .withf(|caller, req| caller.as_str() == ALICE && req.issuer_cat_id.as_str() == TOM)
            .times(1)
            .returning(|_, _| Ok(match_request(MatchStatus::Pending)));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["id"], REQUEST_ID);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["issuerCatId"], TOM);
}

#[actix_web::test]
async fn create_match_conflicts() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match").set_json(new_request_body());
    let (status, body) = send_request(req, Some(&valid_token(ALICE)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager.expect_create_match_request().returning(|_, _| Err(MatchError::SameSex));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_kind(&body), "conflict_error");
}

#[actix_web::test]
async fn create_match_when_store_is_busy() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match").set_json(new_request_body());
    let (status, body) = send_request(req, Some(&valid_token(ALICE)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager
            .expect_create_match_request()
            .returning(|_, _| Err(MatchError::StoreUnavailable("database is locked".into())));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error_kind(&body), "transient_error");
}

#[actix_web::test]
async fn list_my_matches() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/cat/match");
    let (status, body) = send_request(req, Some(&valid_token(BOB)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager
            .expect_fetch_match_details_for_owner()
            .withf(|owner| owner.as_str() == BOB)
            .returning(|_| Ok(vec![match_detail()]));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], REQUEST_ID);
    assert_eq!(data[0]["issuedBy"]["name"], "Alice");
    assert_eq!(data[0]["userCatDetail"]["name"], "Tom");
    assert_eq!(data[0]["matchCatDetail"]["race"], "Maine Coon");
}

#[actix_web::test]
async fn approve_match() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match/approve").set_json(json!({ "matchId": REQUEST_ID }));
    let (status, body) = send_request(req, Some(&valid_token(BOB)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager
            .expect_approve_match_request()
            .withf(|caller, id| caller.as_str() == BOB && id.as_str() == REQUEST_ID)
            .times(1)
            .returning(|_, _| {
                Ok(ApprovalResult {
                    approved: match_request(MatchStatus::Approved),
                    invalidated: vec![MatchId::random()],
                })
            });
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["message"], format!("Match request {REQUEST_ID} approved"));
}

#[actix_web::test]
async fn approve_someone_elses_match() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match/approve").set_json(json!({ "matchId": REQUEST_ID }));
    let (status, body) = send_request(req, Some(&valid_token(ALICE)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager.expect_approve_match_request().returning(|_, _| Err(MatchError::NotCatOwner(CatId::from(LUNA))));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_kind(&body), "authorization_error");
}

#[actix_web::test]
async fn approve_missing_match() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match/approve").set_json(json!({ "matchId": REQUEST_ID }));
    let (status, body) = send_request(req, Some(&valid_token(BOB)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager
            .expect_approve_match_request()
            .returning(|_, id| Err(MatchError::MatchRequestNotFound(id.clone())));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_kind(&body), "not_found_error");
}

#[actix_web::test]
async fn approve_with_malformed_id() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match/approve").set_json(json!({ "matchId": "42" }));
    let (status, body) = send_request(req, Some(&valid_token(BOB)), configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&body), "validation_error");
}

#[actix_web::test]
async fn reject_match() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match/reject").set_json(json!({ "matchId": REQUEST_ID }));
    let (status, body) = send_request(req, Some(&valid_token(BOB)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager.expect_reject_match_request().times(1).returning(|_, _| Ok(match_request(MatchStatus::Rejected)));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["message"], format!("Match request {REQUEST_ID} rejected"));
}

#[actix_web::test]
async fn reject_decided_match() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/cat/match/reject").set_json(json!({ "matchId": REQUEST_ID }));
    let (status, body) = send_request(req, Some(&valid_token(BOB)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager
            .expect_reject_match_request()
            .returning(|_, id| Err(MatchError::NotPending(id.clone(), MatchStatus::Approved)));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_kind(&body), "conflict_error");
}

#[actix_web::test]
async fn withdraw_match() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::delete().uri(&format!("/cat/match/{REQUEST_ID}"));
    let (status, body) = send_request(req, Some(&valid_token(ALICE)), |cfg| {
        let mut manager = MockMatchManager::new();
        manager
            .expect_withdraw_match_request()
            .withf(|caller, id| caller.as_str() == ALICE && id.as_str() == REQUEST_ID)
            .times(1)
            .returning(|_, _| Ok(match_request(MatchStatus::Pending)));
        register(cfg, manager);
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["data"]["id"], REQUEST_ID);
}

fn match_detail() -> MatchRequestDetail {
    let summary = |id: &str, name: &str, sex: Sex| CatSummary {
        id: CatId::from(id),
        name: name.to_string(),
        race: Race::MaineCoon,
        sex,
        description: format!("{name} is very fluffy"),
        age_in_months: 30,
        image_urls: vec![],
        has_matched: false,
        created_at: timestamp(),
    };
    MatchRequestDetail {
        id: MatchId::from(REQUEST_ID),
        issued_by: IssuerProfile { name: "Alice".to_string(), email: "alice@example.com".to_string(), created_at: timestamp() },
        match_cat_detail: summary(LUNA, "Luna", Sex::Female),
        user_cat_detail: summary(TOM, "Tom", Sex::Male),
        message: "Tom would love to meet Luna".to_string(),
        status: MatchStatus::Pending,
        created_at: timestamp(),
    }
}
