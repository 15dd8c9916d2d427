use std::fmt::Display;

use cat_match_engine::db_types::{CatId, MatchId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub message: String,
}

impl JsonResponse {
    pub fn new<S: Display>(message: S) -> Self {
        Self { message: message.to_string() }
    }
}

/// A confirmation message plus a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self { message: "success".to_string(), data }
    }
}

/// Body of the approve and reject calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchIdParam {
    pub match_id: MatchId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedRecord<T> {
    pub id: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredCat {
    pub id: CatId,
    pub created_at: DateTime<Utc>,
}
