use crate::models::domain::CompatibilityResult;
use serde::{Deserialize, Serialize};

/// Response for the find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<CompatibilityResult>,
    /// Pool size before ranking and truncation
    pub total_candidates: usize,
}

/// Response for the pair scoring endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePairResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub result: CompatibilityResult,
    /// Whether the score was served from the write-through cache
    pub cached: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Record exclusion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordExclusionResponse {
    pub success: bool,
    pub event_id: String,
}
