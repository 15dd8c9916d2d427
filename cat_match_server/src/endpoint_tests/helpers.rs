use actix_web::{
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use cat_match_engine::db_types::{Cat, CatId, MatchId, MatchRequest, MatchStatus, Race, Sex, UserId};
use chrono::{DateTime, Duration, TimeZone, Utc};
use log::debug;

use crate::{
    auth::TokenIssuer,
    config::AuthConfig,
    server::{json_config, path_config},
};

pub const ALICE: &str = "6f1c1f4e-5d2a-4b8e-9a57-1f6f0d2a9c11";
pub const BOB: &str = "0b7e6a8e-3c4d-4f21-8d6b-2e9a6c5b7f22";
pub const TOM: &str = "1d2e3f40-5a6b-4c7d-8e9f-a0b1c2d3e4f5";
pub const LUNA: &str = "9a8b7c6d-5e4f-4a3b-9c2d-1e0f9a8b7c6d";
pub const REQUEST_ID: &str = "3c2b1a09-8f7e-4d6c-9b5a-493827161504";

// A test secret for issuing tokens. DO NOT re-use it anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("endpoint-tests-only-secret-9f8e7d6c5b4a")
}

pub fn issue_token(user: &str, lifetime: Duration) -> String {
    TokenIssuer::new(&get_auth_config())
        .issue_token(&UserId::from(user), Some(lifetime))
        .expect("Failed to sign token")
}

pub fn valid_token(user: &str) -> String {
    issue_token(user, Duration::hours(1))
}

/// Runs `req` against an app holding the routes and mocks set up by `configure`. The token, if any, is sent as a
/// bearer token.
pub async fn send_request(
    req: TestRequest,
    token: Option<&str>,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let req = match token {
        Some(token) => req.insert_header((AUTHORIZATION, format!("Bearer {token}"))),
        None => req,
    };
    let app = App::new()
        .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
        .app_data(json_config())
        .app_data(path_config())
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}

pub fn error_kind(body: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(body).expect("Error body is not JSON");
    value["error"].as_str().expect("No error kind in body").to_string()
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 17, 9, 30, 0).unwrap()
}

pub fn match_request(status: MatchStatus) -> MatchRequest {
    MatchRequest {
        id: MatchId::from(REQUEST_ID),
        issuer_cat_id: CatId::from(TOM),
        match_cat_id: CatId::from(LUNA),
        message: "Tom would love to meet Luna".to_string(),
        status,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn cat(id: &str, owner: &str, name: &str, sex: Sex) -> Cat {
    Cat {
        id: CatId::from(id),
        owner_id: UserId::from(owner),
        name: name.to_string(),
        race: Race::MaineCoon,
        sex,
        age_in_months: 30,
        description: format!("{name} is very fluffy"),
        image_urls: vec![format!("https://images.example.com/{name}.jpg")],
        has_matched: false,
        created_at: timestamp(),
        updated_at: timestamp(),
        deleted_at: None,
    }
}
