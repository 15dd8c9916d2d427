use chrono::{DateTime, Utc};

use crate::{db_types::UserId, traits::MatchError};

/// Who is calling, and until when their credentials are good.
///
/// The identity provider resolves this from the request. The engine only trusts it until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self { user_id, expires_at }
    }

    pub fn check_not_expired(&self, now: DateTime<Utc>) -> Result<(), MatchError> {
        if now > self.expires_at {
            return Err(MatchError::IdentityExpired);
        }
        Ok(())
    }
}
