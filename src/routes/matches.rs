use crate::core::{score_compatibility, MatchError, Matcher};
use crate::models::{
    CompatibilityResult, ErrorResponse, ExclusionKind, FindMatchesRequest, HealthResponse,
    PreferenceProfile, RecordExclusionRequest, RecordExclusionResponse, ScorePairRequest,
    ScorePairResponse, WeightSet,
};
use crate::services::{AppwriteClient, AppwriteError, CacheKey, CacheManager, PostgresClient};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub appwrite: Arc<AppwriteClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub matcher: Matcher,
    pub max_limit: usize,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/compat", web::post().to(score_pair))
        .route("/matches/exclusion", web::post().to(record_exclusion))
        .route("/matches/exclusions", web::get().to(get_exclusions));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// The distinct "complete your questionnaire first" condition, as opposed
/// to an empty result or a server fault.
fn preferences_incomplete(user_id: &str) -> HttpResponse {
    HttpResponse::PreconditionFailed().json(ErrorResponse {
        error: "preferences_incomplete".to_string(),
        message: format!(
            "User {} has not completed the preference questionnaire",
            user_id
        ),
        status_code: 412,
    })
}

fn invalid_preferences(user_id: &str, detail: String) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(ErrorResponse {
        error: "invalid_preferences".to_string(),
        message: format!("Stored preferences for {} are invalid: {}", user_id, detail),
        status_code: 422,
    })
}

/// Fetch a user's snapshot, mapping a missing document to the
/// prerequisite condition and invalid stored data to a 422.
async fn fetch_validated_profile(
    state: &AppState,
    user_id: &str,
) -> Result<PreferenceProfile, HttpResponse> {
    let profile = match state.appwrite.get_preferences(user_id).await {
        Ok(profile) => profile,
        Err(AppwriteError::NotFound(_)) => {
            tracing::info!("No preference record for {}", user_id);
            return Err(preferences_incomplete(user_id));
        }
        Err(e) => {
            tracing::error!("Failed to fetch preferences for {}: {}", user_id, e);
            return Err(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch preferences".to_string(),
                message: e.to_string(),
                status_code: 500,
            }));
        }
    };

    if let Err(e) = profile.validate() {
        tracing::error!("Invalid stored preferences for {}: {}", user_id, e);
        return Err(invalid_preferences(user_id, e.to_string()));
    }

    Ok(profile)
}

/// Best-effort weight fetch: a failed read degrades to unweighted scoring
/// instead of failing the request.
async fn fetch_weights(state: &AppState, user_id: &str) -> Option<WeightSet> {
    match state.appwrite.get_weights(user_id).await {
        Ok(weights) if weights.is_empty() => None,
        Ok(weights) => Some(weights),
        Err(e) => {
            tracing::warn!(
                "Failed to fetch weights for {}, scoring unweighted: {}",
                user_id,
                e
            );
            None
        }
    }
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 20,
///   "excludeUserIds": ["string"]
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let user_id = &req.user_id;
    let limit = (req.limit as usize).min(state.max_limit);

    tracing::info!("Finding matches for user: {}, limit: {}", user_id, limit);

    // Connected/blocked pairs never resurface in the pool
    let mut exclude_ids = match state.postgres.get_exclusions(user_id).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(
                "Failed to fetch exclusions for {}, proceeding without filtering: {}",
                user_id,
                e
            );
            vec![]
        }
    };

    // Add client-provided exclude IDs (if any)
    exclude_ids.extend(req.exclude_user_ids.clone());

    tracing::debug!("Excluding {} users for {}", exclude_ids.len(), user_id);

    let requester = match fetch_validated_profile(&state, user_id).await {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    let weights = fetch_weights(&state, user_id).await;

    // Over-fetch so post-ranking truncation still fills the page
    let candidates = match state
        .appwrite
        .query_candidates(user_id, &exclude_ids, limit * 5)
        .await
    {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to query candidates for {}: {}", user_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to query candidates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::debug!("Found {} candidates for {}", candidates.len(), user_id);

    // Run the ranking pipeline
    let result = match state
        .matcher
        .rank_candidates(&requester, &candidates, limit, weights.as_ref())
    {
        Ok(result) => result,
        Err(MatchError::MissingPreferences(_)) => {
            return preferences_incomplete(user_id);
        }
    };

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        result.matches.len(),
        user_id,
        result.total_candidates
    );

    HttpResponse::Ok().json(crate::models::FindMatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
    })
}

/// Score a single pair endpoint
///
/// POST /api/v1/matches/compat
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string"
/// }
/// ```
///
/// Results are cached write-through under a key stamped with both
/// snapshots' versions, so a preference edit on either side makes the next
/// request recompute.
async fn score_pair(
    state: web::Data<AppState>,
    req: web::Json<ScorePairRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let requester = match fetch_validated_profile(&state, &req.user_id).await {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    if !requester.is_answered() {
        return preferences_incomplete(&req.user_id);
    }

    // The counterpart missing is a 404, not a prerequisite condition
    let target = match state.appwrite.get_preferences(&req.target_user_id).await {
        Ok(profile) => profile,
        Err(AppwriteError::NotFound(_)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "target_not_found".to_string(),
                message: format!("No preference record for user {}", req.target_user_id),
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!(
                "Failed to fetch preferences for {}: {}",
                req.target_user_id,
                e
            );
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch preferences".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    if let Err(e) = target.validate() {
        tracing::error!(
            "Invalid stored preferences for {}: {}",
            req.target_user_id,
            e
        );
        return invalid_preferences(&req.target_user_id, e.to_string());
    }

    let cache_key = CacheKey::compat(
        &req.user_id,
        &req.target_user_id,
        &requester.version_tag(),
        &target.version_tag(),
    );

    if let Ok(cached) = state.cache.get::<CompatibilityResult>(&cache_key).await {
        tracing::debug!("Cache hit for {} vs {}", req.user_id, req.target_user_id);
        return HttpResponse::Ok().json(ScorePairResponse {
            user_id: req.user_id.clone(),
            result: cached,
            cached: true,
        });
    }

    let weights = fetch_weights(&state, &req.user_id).await;
    let result = score_compatibility(&requester, &target, weights.as_ref());

    if let Err(e) = state.cache.set(&cache_key, &result).await {
        tracing::warn!("Failed to cache score: {}", e);
    }

    HttpResponse::Ok().json(ScorePairResponse {
        user_id: req.user_id.clone(),
        result,
        cached: false,
    })
}

/// Record exclusion endpoint
///
/// POST /api/v1/matches/exclusion
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "targetUserId": "string",
///   "kind": "connected|blocked"
/// }
/// ```
async fn record_exclusion(
    state: web::Data<AppState>,
    req: web::Json<RecordExclusionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let kind = match req.kind.to_lowercase().as_str() {
        "connected" => ExclusionKind::Connected,
        "blocked" => ExclusionKind::Blocked,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid exclusion kind".to_string(),
                message: "Kind must be one of: connected, blocked".to_string(),
                status_code: 400,
            });
        }
    };

    match state
        .postgres
        .record_exclusion(&req.user_id, &req.target_user_id, kind.into())
        .await
    {
        Ok(_) => {
            tracing::debug!(
                "Recorded exclusion: {} -> {} ({})",
                req.user_id,
                req.target_user_id,
                req.kind
            );

            // Cached scores for this requester are no longer useful
            let pattern = CacheKey::compat_pattern(&req.user_id);
            if let Err(e) = state.cache.invalidate_pattern(&pattern).await {
                tracing::warn!("Failed to invalidate cache: {}", e);
            }

            HttpResponse::Ok().json(RecordExclusionResponse {
                success: true,
                event_id: uuid::Uuid::new_v4().to_string(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to record exclusion: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to record exclusion".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Get excluded users for a user
///
/// GET /api/v1/matches/exclusions?userId={userId}
///
/// Returns the ids excluded from the user's candidate pool, for client-side
/// synchronization and debugging purposes.
async fn get_exclusions(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let user_id = match query.get("userId") {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing userId parameter".to_string(),
                message: "userId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    match state.postgres.get_exclusions(user_id).await {
        Ok(excluded) => HttpResponse::Ok().json(serde_json::json!({
            "userId": user_id,
            "excludedUsers": excluded,
            "count": excluded.len(),
        })),
        Err(e) => {
            tracing::error!("Failed to fetch exclusions for {}: {}", user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch exclusions".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_preferences_incomplete_is_412() {
        let response = preferences_incomplete("u1");
        assert_eq!(response.status(), actix_web::http::StatusCode::PRECONDITION_FAILED);
    }
}
