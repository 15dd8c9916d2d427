use serde::{Deserialize, Serialize};

use crate::db_types::{MatchId, MatchRequest};

/// Emitted once a new match request has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequestedEvent {
    pub request: MatchRequest,
}

impl MatchRequestedEvent {
    pub fn new(request: MatchRequest) -> Self {
        Self { request }
    }
}

/// Emitted once an approval, and the invalidation of competing requests that comes with it, has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchApprovedEvent {
    pub request: MatchRequest,
    pub invalidated: Vec<MatchId>,
}

impl MatchApprovedEvent {
    pub fn new(request: MatchRequest, invalidated: Vec<MatchId>) -> Self {
        Self { request, invalidated }
    }
}
