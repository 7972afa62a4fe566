use crate::core::scoring::score_compatibility;
use crate::models::{CompatibilityResult, PreferenceProfile, WeightSet};
use thiserror::Error;

/// Expected-but-exceptional conditions from the ranking pipeline. These are
/// caller decisions, not runtime faults: the scorer itself never fails over
/// validated input.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("user {0} has not completed the preference questionnaire")]
    MissingPreferences(String),
}

/// Result of ranking a candidate pool
#[derive(Debug)]
pub struct RankResult {
    pub matches: Vec<CompatibilityResult>,
    pub total_candidates: usize,
}

/// Ranking orchestrator.
///
/// # Pipeline
/// 1. Prerequisite check: the requester must have answered something
/// 2. Score every candidate against the requester
/// 3. Sort descending by overall score, ties by ascending candidate id
/// 4. Truncate to the requested limit
///
/// Sorting on the integer score with the id tie-break makes the ordering
/// fully deterministic, and the top-k of a limit-N call always equals the
/// limit-k call for k <= N.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher;

impl Matcher {
    pub fn new() -> Self {
        Self
    }

    /// Rank a candidate pool for a requester.
    ///
    /// # Arguments
    /// * `requester` - the requesting user's preference snapshot
    /// * `candidates` - pool snapshots (exclusions already applied upstream)
    /// * `limit` - maximum number of results to return
    /// * `weights` - the requester's question weights, if any
    ///
    /// Candidates sharing the requester's id are skipped defensively; the
    /// pool query excludes self already, but a stale pool must not produce a
    /// self-match.
    pub fn rank_candidates(
        &self,
        requester: &PreferenceProfile,
        candidates: &[PreferenceProfile],
        limit: usize,
        weights: Option<&WeightSet>,
    ) -> Result<RankResult, MatchError> {
        if !requester.is_answered() {
            return Err(MatchError::MissingPreferences(requester.user_id.clone()));
        }

        let total_candidates = candidates.len();

        let mut matches: Vec<CompatibilityResult> = candidates
            .iter()
            .filter(|candidate| candidate.user_id != requester.user_id)
            .map(|candidate| score_compatibility(requester, candidate, weights))
            .collect();

        matches.sort_by(|a, b| {
            b.overall_score
                .cmp(&a.overall_score)
                .then_with(|| a.counterpart_user_id.cmp(&b.counterpart_user_id))
        });

        matches.truncate(limit);

        Ok(RankResult {
            matches,
            total_candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HousingPreferences, LifestylePreferences};

    fn candidate(id: &str, budget_min: u32, budget_max: u32) -> PreferenceProfile {
        let mut profile = PreferenceProfile::new(id);
        profile.housing = Some(HousingPreferences {
            budget_min: Some(budget_min),
            budget_max: Some(budget_max),
            ..Default::default()
        });
        profile
    }

    fn requester() -> PreferenceProfile {
        candidate("requester", 800, 1200)
    }

    #[test]
    fn test_missing_prerequisite_is_distinct_from_empty() {
        let matcher = Matcher::new();
        let blank = PreferenceProfile::new("blank");

        let err = matcher
            .rank_candidates(&blank, &[candidate("c1", 800, 1200)], 10, None)
            .unwrap_err();
        assert!(matches!(err, MatchError::MissingPreferences(ref id) if id == "blank"));

        // An empty pool, by contrast, is a normal empty result
        let result = matcher
            .rank_candidates(&requester(), &[], 10, None)
            .unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.total_candidates, 0);
    }

    #[test]
    fn test_sorted_descending_with_id_tie_break() {
        let matcher = Matcher::new();
        let pool = vec![
            candidate("c_far", 1900, 2400),   // no overlap
            candidate("b_same", 800, 1200),   // identical: 100
            candidate("a_same", 800, 1200),   // identical: 100, smaller id
            candidate("m_close", 900, 1300),  // partial overlap
        ];

        let result = matcher.rank_candidates(&requester(), &pool, 10, None).unwrap();

        let ids: Vec<&str> = result
            .matches
            .iter()
            .map(|m| m.counterpart_user_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a_same", "b_same", "m_close", "c_far"]);
    }

    #[test]
    fn test_respects_limit() {
        let matcher = Matcher::new();
        let pool: Vec<PreferenceProfile> = (0..30)
            .map(|i| candidate(&format!("c{i:02}"), 800 + i * 10, 1200 + i * 10))
            .collect();

        let result = matcher.rank_candidates(&requester(), &pool, 5, None).unwrap();
        assert_eq!(result.matches.len(), 5);
        assert_eq!(result.total_candidates, 30);
    }

    #[test]
    fn test_prefix_consistency() {
        let matcher = Matcher::new();
        let pool: Vec<PreferenceProfile> = (0..20)
            .map(|i| candidate(&format!("c{i:02}"), 700 + i * 37, 1100 + i * 23))
            .collect();

        let full = matcher.rank_candidates(&requester(), &pool, 20, None).unwrap();
        for k in [1usize, 3, 7, 12, 20] {
            let prefix = matcher.rank_candidates(&requester(), &pool, k, None).unwrap();
            let expected: Vec<&str> = full.matches[..k]
                .iter()
                .map(|m| m.counterpart_user_id.as_str())
                .collect();
            let actual: Vec<&str> = prefix
                .matches
                .iter()
                .map(|m| m.counterpart_user_id.as_str())
                .collect();
            assert_eq!(actual, expected, "prefix mismatch at k={k}");
        }
    }

    #[test]
    fn test_requester_never_matches_self() {
        let matcher = Matcher::new();
        let me = requester();
        let pool = vec![me.clone(), candidate("other", 800, 1200)];

        let result = matcher.rank_candidates(&me, &pool, 10, None).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].counterpart_user_id, "other");
    }

    #[test]
    fn test_inputs_not_mutated() {
        let matcher = Matcher::new();
        let me = requester();
        let pool = vec![candidate("c1", 850, 1250)];
        let snapshot = serde_json::to_string(&pool).unwrap();

        matcher.rank_candidates(&me, &pool, 10, None).unwrap();
        assert_eq!(serde_json::to_string(&pool).unwrap(), snapshot);
    }

    #[test]
    fn test_unanswered_lifestyle_only_candidate_scores_zero_but_ranks() {
        let matcher = Matcher::new();
        let mut lifestyle_only = PreferenceProfile::new("lifestyle_only");
        lifestyle_only.lifestyle = Some(LifestylePreferences {
            cleanliness_level: Some(3),
            ..Default::default()
        });

        // Requester answered housing only: nothing in common, score 0, but
        // the candidate still appears (zero is a valid score, not an error)
        let result = matcher
            .rank_candidates(&requester(), &[lifestyle_only], 10, None)
            .unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].overall_score, 0);
    }
}
