use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to rank candidate roommates for a user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    #[serde(alias = "exclude_user_ids", rename = "excludeUserIds")]
    pub exclude_user_ids: Vec<String>,
}

fn default_limit() -> u16 {
    20
}

/// Request to score a single pair of users
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScorePairRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
}

/// Request to record a connection or block between two users
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordExclusionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
    pub kind: String,
}
