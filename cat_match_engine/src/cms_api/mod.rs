//! # Cat match engine public API
//!
//! The `cms_api` module exposes the programmatic API for the match lifecycle engine.
//!
//! * [`match_flow_api`] drives the match request lifecycle: creation, listing, approval, rejection and withdrawal.
//! * [`cat_api`] lets owners manage their cats.
//!
//! Every call takes the caller's [`Identity`] explicitly. Expired identities are turned away before any work is done,
//! and every call into the backend is bounded by a timeout. A timeout surfaces as a transient error that the caller
//! may retry.
//!
//! # API usage
//!
//! ```rust,ignore
//! use cat_match_engine::{events::EventProducers, MatchFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/cat_match.db", 25).await?;
//! let api = MatchFlowApi::new(db, EventProducers::default());
//! let requests = api.my_match_requests(&identity).await?;
//! ```
use std::{future::Future, time::Duration};

use log::warn;

use crate::traits::MatchError;

pub mod cat_api;
pub mod identity;
pub mod match_flow_api;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a backend call, giving up after `limit`. Dropping the call mid-flight rolls back any open transaction.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, MatchError>
where F: Future<Output = Result<T, MatchError>> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            let ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!("🔄️ A store call did not complete within {ms} ms and was abandoned");
            Err(MatchError::StoreTimeout(ms))
        },
    }
}
