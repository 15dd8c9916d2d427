//! Identity resolution for incoming requests
//!
//! Callers present an HS256 access token in the `Authorization: Bearer <token>` header. The [`JwtClaims`] extractor
//! verifies the signature and hands the claims to the handler. Expiry is *not* checked here: the claims are turned
//! into an [`Identity`] and the engine decides whether it is still good.
use std::{
    collections::HashSet,
    future::{ready, Ready},
};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use cat_match_engine::{db_types::UserId, Identity};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user the token was issued to
    pub sub: UserId,
    /// Expiry, in seconds since the Unix epoch
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(sub: UserId, expires_at: DateTime<Utc>) -> Self {
        Self { sub, exp: expires_at.timestamp() }
    }

    /// An out-of-range expiry is treated as already expired.
    pub fn identity(&self) -> Identity {
        let expires_at = DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);
        Identity::new(self.sub.clone(), expires_at)
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req.app_data::<web::Data<TokenIssuer>>().ok_or_else(|| {
        error!("💻️ No token issuer has been registered with the application. Cannot authenticate requests.");
        ServerError::ConfigurationError("No token issuer is available".to_string())
    })?;
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a bearer token".to_string()))?;
    let claims = issuer.verify_token(token.trim())?;
    trace!("💻️ Access token verified for {}", claims.sub);
    Ok(claims)
}

/// Signs and verifies access tokens with the shared secret from [`AuthConfig`].
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::from(["sub".to_string(), "exp".to_string()]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issues a token for `user`, valid for `duration` (8 hours if not given).
    pub fn issue_token(&self, user: &UserId, duration: Option<Duration>) -> Result<String, AuthError> {
        let duration = duration.unwrap_or_else(|| Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS));
        let claims = JwtClaims::new(user.clone(), Utc::now() + duration);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("💻️ Access token rejected. {e}");
            AuthError::ValidationError(e.to_string())
        })?;
        if !data.claims.sub.is_valid() {
            return Err(AuthError::PoorlyFormattedToken(format!("'{}' is not a valid user id", data.claims.sub)));
        }
        Ok(data.claims)
    }
}
