//! # Entity store contracts
//!
//! This module defines the behaviour that storage backends must expose in order to back the match lifecycle engine.
//!
//! * [`CatManagement`] covers cat records and the user profiles that own them.
//! * [`MatchManagement`] covers match requests. The read methods are plain lookups. The mutating methods are *atomic
//!   units*: each one must re-read and re-validate its preconditions (using [`crate::match_rules`]) and apply all of
//!   its writes, or none of them.
//!
//! Backends report failures using the engine-wide [`MatchError`] taxonomy.
mod cat_management;
mod data_objects;
mod errors;
mod match_management;

pub use cat_management::CatManagement;
pub use data_objects::ApprovalResult;
pub use errors::{ErrorKind, MatchError};
pub use match_management::MatchManagement;
