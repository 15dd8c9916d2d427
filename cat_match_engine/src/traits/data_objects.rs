use serde::{Deserialize, Serialize};

use crate::db_types::{MatchId, MatchRequest};

/// The outcome of a successful approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResult {
    /// The request that was approved, in its final state
    pub approved: MatchRequest,
    /// The pending requests that were deleted because they involved one of the two newly matched cats
    pub invalidated: Vec<MatchId>,
}
