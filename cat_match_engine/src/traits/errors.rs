use std::fmt::Display;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::db_types::{CatId, MatchId, MatchStatus, UserId};

/// The broad class of a [`MatchError`]. Callers (e.g. the HTTP layer) map these onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Transient,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Authentication => "authentication_error",
            ErrorKind::Authorization => "authorization_error",
            ErrorKind::NotFound => "not_found_error",
            ErrorKind::Conflict => "conflict_error",
            ErrorKind::Transient => "transient_error",
            ErrorKind::Internal => "internal_error",
        }
    }

    /// Only transient failures are worth retrying without changing the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Invalid request. {0}")]
    InvalidPayload(String),
    #[error("The access token expired. Please log in again.")]
    IdentityExpired,
    #[error("Cat {0} does not belong to you.")]
    NotCatOwner(CatId),
    #[error("Cat {0} was not found.")]
    CatNotFound(CatId),
    #[error("Match request {0} was not found.")]
    MatchRequestNotFound(MatchId),
    #[error("User {0} was not found.")]
    UserNotFound(UserId),
    #[error(
        "A match request between these cats already exists. If the other owner proposed first, respond to their \
         request instead."
    )]
    DuplicateRequest,
    #[error("Match request {0} is already {1}.")]
    NotPending(MatchId, MatchStatus),
    #[error("Cat {0} has already been matched.")]
    AlreadyMatched(CatId),
    #[error("Both cats have the same sex. Please choose a cat of the opposite sex.")]
    SameSex,
    #[error("Both cats belong to the same owner.")]
    SameOwner,
    #[error("A matched cat cannot change its sex.")]
    MatchedCatSexChange,
    #[error("A record with this identity already exists. {0}")]
    DuplicateRecord(String),
    #[error("The store is busy or unreachable. Please retry. {0}")]
    StoreUnavailable(String),
    #[error("The store did not respond within {0} ms. Please retry.")]
    StoreTimeout(u64),
    #[error("An internal database error occurred. {0}")]
    DatabaseError(String),
}

impl MatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPayload(_) => ErrorKind::Validation,
            Self::IdentityExpired => ErrorKind::Authentication,
            Self::NotCatOwner(_) => ErrorKind::Authorization,
            Self::CatNotFound(_) | Self::MatchRequestNotFound(_) | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateRequest |
            Self::NotPending(..) |
            Self::AlreadyMatched(_) |
            Self::SameSex |
            Self::SameOwner |
            Self::MatchedCatSexChange |
            Self::DuplicateRecord(_) => ErrorKind::Conflict,
            Self::StoreUnavailable(_) | Self::StoreTimeout(_) => ErrorKind::Transient,
            Self::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

// SQLite primary result codes that indicate lock contention rather than a broken query.
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";

impl From<sqlx::Error> for MatchError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed => {
                MatchError::StoreUnavailable(e.to_string())
            },
            sqlx::Error::Database(db) if db.is_unique_violation() => MatchError::DuplicateRecord(db.message().into()),
            sqlx::Error::Database(db) => {
                // Extended codes carry the primary code in the low byte, e.g. SQLITE_BUSY_SNAPSHOT (517)
                let primary = db.code().and_then(|c| c.parse::<u32>().ok()).map(|c| (c & 0xff).to_string());
                match primary.as_deref() {
                    Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => MatchError::StoreUnavailable(e.to_string()),
                    _ => MatchError::DatabaseError(e.to_string()),
                }
            },
            _ => MatchError::DatabaseError(e.to_string()),
        }
    }
}
