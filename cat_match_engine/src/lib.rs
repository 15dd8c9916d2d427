//! Cat Match Engine
//!
//! The engine owns the lifecycle of match requests between cats: proposing a match, approving it (which retires every
//! competing request involving either cat), rejecting it, and withdrawing it. It is transport-agnostic; the HTTP
//! surface lives in `cat_match_server`.
//!
//! The library is divided into these sections:
//! 1. Data types ([`mod@db_types`]) and the pure lifecycle rules ([`mod@match_rules`]). The rules decide whether a
//!    transition is allowed given a snapshot of the records involved, and know nothing about storage.
//! 2. Storage contracts ([`mod@traits`]) and the SQLite backend that implements them ([`SqliteDatabase`]). Every
//!    mutating operation is a single atomic unit that re-checks its preconditions under lock.
//! 3. The public API ([`MatchFlowApi`] and [`CatApi`]). This is what callers should use. It checks the caller's
//!    identity, bounds every store call in time and publishes events once a transition has been committed.
//!
//! Events ([`mod@events`]) are delivered to hooks on a best-effort basis and never influence the outcome of the
//! operation that emitted them.
pub mod db_types;
pub mod events;
pub mod match_rules;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

mod cms_api;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use cms_api::{cat_api::CatApi, identity::Identity, match_flow_api::MatchFlowApi, DEFAULT_STORE_TIMEOUT};
pub use traits::{ApprovalResult, CatManagement, ErrorKind, MatchError, MatchManagement};
