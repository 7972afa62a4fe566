use crate::core::normalize::dimension_scores;
use crate::models::{CompatibilityResult, PreferenceProfile, WeightSet};
use std::collections::BTreeMap;

/// Compute the compatibility of two users from their preference snapshots.
///
/// Aggregation formula:
/// ```text
/// overall = round( Σ dimension_score × weight / Σ weight × 100 )
/// ```
/// where the sums run over dimensions both users answered. Weights come from
/// the requester's question weights (1-5); dimensions without an entry use
/// the baseline weight 3, so with no weight set at all this is exactly the
/// unweighted mean. Missing answers shrink the denominator instead of
/// dragging the score down.
///
/// Pure and symmetric: swapping the two snapshots changes only
/// `counterpart_user_id`, never the numbers.
pub fn score_compatibility(
    a: &PreferenceProfile,
    b: &PreferenceProfile,
    weights: Option<&WeightSet>,
) -> CompatibilityResult {
    let unit_scores = dimension_scores(a, b);

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut percentages = BTreeMap::new();

    for (&dimension, &score) in &unit_scores {
        let weight = weights
            .map(|w| w.weight_for(dimension))
            .unwrap_or(WeightSet::DEFAULT_WEIGHT) as f64;

        weighted_sum += score * weight;
        weight_total += weight;
        percentages.insert(dimension, score * 100.0);
    }

    let overall = if weight_total > 0.0 {
        (weighted_sum / weight_total * 100.0).round().clamp(0.0, 100.0) as u8
    } else {
        // No dimension answered by both sides
        0
    };

    CompatibilityResult {
        counterpart_user_id: b.user_id.clone(),
        overall_score: overall,
        dimension_scores: percentages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Dimension, HousingPreferences, LifestylePreferences, QuestionWeight,
    };

    fn budget_and_cleanliness(id: &str, min: u32, max: u32, cleanliness: u8) -> PreferenceProfile {
        let mut profile = PreferenceProfile::new(id);
        profile.housing = Some(HousingPreferences {
            budget_min: Some(min),
            budget_max: Some(max),
            ..Default::default()
        });
        profile.lifestyle = Some(LifestylePreferences {
            cleanliness_level: Some(cleanliness),
            ..Default::default()
        });
        profile
    }

    #[test]
    fn test_worked_example() {
        // Budgets [800,1200] vs [1000,1500]: 200/700 ≈ 28.6%.
        // Cleanliness 5 vs 3: 50%. Equal weights -> round(39.29) = 39.
        let a = budget_and_cleanliness("a", 800, 1200, 5);
        let b = budget_and_cleanliness("b", 1000, 1500, 3);

        let result = score_compatibility(&a, &b, None);

        assert_eq!(result.overall_score, 39);
        assert_eq!(result.dimension_scores.len(), 2);
        let budget = result.dimension_scores[&Dimension::Budget];
        assert!((budget - 100.0 * 200.0 / 700.0).abs() < 1e-6);
        assert_eq!(result.dimension_scores[&Dimension::Cleanliness], 50.0);
    }

    #[test]
    fn test_identity_scores_100() {
        let a = budget_and_cleanliness("a", 700, 1100, 4);
        let result = score_compatibility(&a, &a, None);
        assert_eq!(result.overall_score, 100);
    }

    #[test]
    fn test_symmetry() {
        let a = budget_and_cleanliness("a", 800, 1200, 5);
        let b = budget_and_cleanliness("b", 1000, 1500, 2);

        let ab = score_compatibility(&a, &b, None);
        let ba = score_compatibility(&b, &a, None);

        assert_eq!(ab.overall_score, ba.overall_score);
        assert_eq!(ab.dimension_scores, ba.dimension_scores);
        assert_eq!(ab.counterpart_user_id, "b");
        assert_eq!(ba.counterpart_user_id, "a");
    }

    #[test]
    fn test_default_weights_match_unweighted() {
        let a = budget_and_cleanliness("a", 800, 1200, 5);
        let b = budget_and_cleanliness("b", 1000, 1500, 3);

        let all_default = WeightSet::from_entries(&[
            QuestionWeight { question_id: Dimension::Budget, weight: 3 },
            QuestionWeight { question_id: Dimension::Cleanliness, weight: 3 },
        ])
        .unwrap();

        let weighted = score_compatibility(&a, &b, Some(&all_default));
        let unweighted = score_compatibility(&a, &b, None);

        assert_eq!(weighted.overall_score, unweighted.overall_score);
        assert_eq!(weighted.dimension_scores, unweighted.dimension_scores);
    }

    #[test]
    fn test_weights_shift_the_aggregate() {
        let a = budget_and_cleanliness("a", 800, 1200, 5);
        let b = budget_and_cleanliness("b", 1000, 1500, 3);

        // Budget (the weaker dimension here) marked critical
        let budget_critical = WeightSet::from_entries(&[QuestionWeight {
            question_id: Dimension::Budget,
            weight: 5,
        }])
        .unwrap();

        let weighted = score_compatibility(&a, &b, Some(&budget_critical));
        let unweighted = score_compatibility(&a, &b, None);

        assert!(weighted.overall_score < unweighted.overall_score);
        // Per-dimension percentages are weight-independent
        assert_eq!(weighted.dimension_scores, unweighted.dimension_scores);
    }

    #[test]
    fn test_missing_answers_do_not_penalize() {
        // b answered cleanliness, a did not: the dimension is skipped and
        // the aggregate rests on budget alone.
        let a = {
            let mut p = PreferenceProfile::new("a");
            p.housing = Some(HousingPreferences {
                budget_min: Some(900),
                budget_max: Some(1300),
                ..Default::default()
            });
            p
        };
        let b = budget_and_cleanliness("b", 900, 1300, 1);

        let result = score_compatibility(&a, &b, None);
        assert_eq!(result.overall_score, 100);
        assert_eq!(result.dimension_scores.len(), 1);
    }

    #[test]
    fn test_nothing_in_common_scores_zero() {
        let a = PreferenceProfile::new("a");
        let b = budget_and_cleanliness("b", 900, 1300, 3);

        let result = score_compatibility(&a, &b, None);
        assert_eq!(result.overall_score, 0);
        assert!(result.dimension_scores.is_empty());
    }

    #[test]
    fn test_overall_in_range_for_disjoint_everything() {
        let a = budget_and_cleanliness("a", 400, 500, 1);
        let b = budget_and_cleanliness("b", 1400, 1500, 5);

        let result = score_compatibility(&a, &b, None);
        assert_eq!(result.overall_score, 0);
    }
}
