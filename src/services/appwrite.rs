use crate::models::{PreferenceProfile, QuestionWeight, WeightSet};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Appwrite
#[derive(Debug, Error)]
pub enum AppwriteError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Appwrite API client
///
/// Handles all communication with the platform's document store:
/// - Fetching preference snapshots
/// - Fetching question weights
/// - Querying candidate pools
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: AppwriteCollections,
}

/// Collection IDs in Appwrite
#[derive(Debug, Clone)]
pub struct AppwriteCollections {
    pub roommate_preferences: String,
    pub question_weights: String,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: AppwriteCollections,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        }
    }

    /// Fetch a user's preference snapshot.
    ///
    /// A missing document is `NotFound`; the caller maps it to the
    /// prerequisite-not-met condition rather than a fault.
    pub async fn get_preferences(
        &self,
        user_id: &str,
    ) -> Result<PreferenceProfile, AppwriteError> {
        let query_json = format!(r#"["userId={}"]"#, user_id);
        let encoded_query = urlencoding::encode(&query_json);

        let url = format!(
            "{}/databases/{}/collections/{}/documents?query={}",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collections.roommate_preferences,
            encoded_query
        );

        tracing::debug!("Fetching preferences from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to fetch preferences: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let doc = documents.first().ok_or_else(|| {
            AppwriteError::NotFound(format!("Preferences not found for user {}", user_id))
        })?;

        let data = doc.get("data").unwrap_or(doc);

        serde_json::from_value(data.clone()).map_err(|e| {
            AppwriteError::InvalidResponse(format!("Failed to parse preferences: {}", e))
        })
    }

    /// Fetch a user's question weights. An absent or empty weight document
    /// set is an empty `WeightSet` (everything at the baseline weight), not
    /// an error; individual out-of-range entries are dropped with a warning.
    pub async fn get_weights(&self, user_id: &str) -> Result<WeightSet, AppwriteError> {
        let query_json = format!(r#"["userId={}"]"#, user_id);
        let encoded_query = urlencoding::encode(&query_json);

        let url = format!(
            "{}/databases/{}/collections/{}/documents?query={}",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collections.question_weights,
            encoded_query
        );

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to fetch weights: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let entries: Vec<QuestionWeight> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value::<QuestionWeight>(data.clone()).ok()
            })
            .filter(|entry| match entry.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        "Dropping invalid weight entry for {}: {}",
                        user_id,
                        e
                    );
                    false
                }
            })
            .collect();

        // Entries are pre-validated, from_entries cannot fail here
        WeightSet::from_entries(&entries)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))
    }

    /// Query a candidate pool for a requester, excluding self and the given
    /// user ids. Documents that fail to parse or carry structurally invalid
    /// preferences are dropped from the pool with a warning.
    pub async fn query_candidates(
        &self,
        user_id: &str,
        exclude_ids: &[String],
        limit: usize,
    ) -> Result<Vec<PreferenceProfile>, AppwriteError> {
        let url = format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collections.roommate_preferences
        );

        // Build Appwrite queries
        let mut queries = vec![
            format!("notEqual(\"userId\", \"{}\")", user_id), // Exclude self
            format!("limit({})", limit),
        ];

        for id in exclude_ids {
            queries.push(format!("notEqual(\"userId\", \"{}\")", id));
        }

        let queries_json = serde_json::to_string(&queries)
            .map_err(|e| AppwriteError::InvalidResponse(e.to_string()))?;
        let encoded_queries = urlencoding::encode(&queries_json);

        let full_url = format!("{}?query={}", url, encoded_queries);

        let response = self
            .client
            .get(&full_url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppwriteError::ApiError(format!(
                "Failed to query candidates: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| AppwriteError::InvalidResponse("Missing documents array".into()))?;

        let profiles: Vec<PreferenceProfile> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value::<PreferenceProfile>(data.clone()).ok()
            })
            .filter(|p| p.user_id != user_id && !exclude_ids.contains(&p.user_id))
            .filter(|p| match p.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        "Dropping candidate {} with invalid preferences: {}",
                        p.user_id,
                        e
                    );
                    false
                }
            })
            .collect();

        tracing::debug!("Queried {} candidates (total: {})", profiles.len(), total);

        Ok(profiles)
    }
}
