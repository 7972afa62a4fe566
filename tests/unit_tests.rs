// Unit tests for Dorma Algo scoring properties

use chrono::{NaiveDate, NaiveTime};
use dorma_algo::core::score_compatibility;
use dorma_algo::models::{
    ChoresPreference, Dimension, GuestsFrequency, HousingPreferences, LeaseLength,
    LifestylePreferences, MaxDistance, NoiseTolerance, PetsStance, PreferenceProfile,
    QuestionWeight, SleepSchedule, SmokingPolicy, WeightSet,
};

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn full_profile(id: &str) -> PreferenceProfile {
    let mut profile = PreferenceProfile::new(id);
    profile.housing = Some(HousingPreferences {
        budget_min: Some(800),
        budget_max: Some(1200),
        move_in_date: NaiveDate::from_ymd_opt(2026, 9, 1),
        lease_lengths: Some(vec![LeaseLength::Semester, LeaseLength::AcademicYear]),
        max_distance: Some(MaxDistance::UnderThreeKm),
        quiet_hours_start: Some(time(22, 0)),
        quiet_hours_end: Some(time(7, 0)),
    });
    profile.lifestyle = Some(LifestylePreferences {
        cleanliness_level: Some(4),
        noise_tolerance: Some(NoiseTolerance::Moderate),
        sleep_schedule: Some(SleepSchedule::Early),
        pets_stance: Some(PetsStance::NoPets),
        comfortable_with_pets: Some(true),
        pet_allergies: Some(vec!["cats".to_string()]),
        smoking_policy: Some(vec![SmokingPolicy::NoSmoking]),
        chores_preference: Some(ChoresPreference::RotatingSchedule),
        guests_frequency: Some(GuestsFrequency::Sometimes),
        work_from_home_days: Some(3),
    });
    profile
}

fn contrasting_profile(id: &str) -> PreferenceProfile {
    let mut profile = PreferenceProfile::new(id);
    profile.housing = Some(HousingPreferences {
        budget_min: Some(1000),
        budget_max: Some(1500),
        move_in_date: NaiveDate::from_ymd_opt(2026, 10, 1),
        lease_lengths: Some(vec![LeaseLength::FullYear, LeaseLength::AcademicYear]),
        max_distance: Some(MaxDistance::UnderTenKm),
        quiet_hours_start: Some(time(23, 30)),
        quiet_hours_end: Some(time(6, 0)),
    });
    profile.lifestyle = Some(LifestylePreferences {
        cleanliness_level: Some(2),
        noise_tolerance: Some(NoiseTolerance::Loud),
        sleep_schedule: Some(SleepSchedule::Late),
        pets_stance: Some(PetsStance::HasPets),
        comfortable_with_pets: Some(true),
        pet_allergies: Some(vec![]),
        smoking_policy: Some(vec![SmokingPolicy::OutsideOnly, SmokingPolicy::VapingOnly]),
        chores_preference: Some(ChoresPreference::SplitAreas),
        guests_frequency: Some(GuestsFrequency::Often),
        work_from_home_days: Some(5),
    });
    profile
}

#[test]
fn test_symmetry_over_varied_pairs() {
    let pairs = [
        (full_profile("a"), contrasting_profile("b")),
        (full_profile("a"), full_profile("b")),
        (contrasting_profile("a"), contrasting_profile("b")),
    ];

    for (a, b) in &pairs {
        let ab = score_compatibility(a, b, None);
        let ba = score_compatibility(b, a, None);
        assert_eq!(ab.overall_score, ba.overall_score);
        assert_eq!(ab.dimension_scores, ba.dimension_scores);
    }
}

#[test]
fn test_identity_is_perfect() {
    let a = full_profile("a");
    let result = score_compatibility(&a, &a, None);
    assert_eq!(result.overall_score, 100);
    for (&dimension, &score) in &result.dimension_scores {
        assert!(
            (score - 100.0).abs() < 1e-9,
            "dimension {:?} not perfect against self: {}",
            dimension,
            score
        );
    }
}

#[test]
fn test_scores_stay_in_range() {
    let pairs = [
        (full_profile("a"), contrasting_profile("b")),
        (contrasting_profile("a"), full_profile("b")),
        (full_profile("a"), PreferenceProfile::new("empty")),
    ];

    for (a, b) in &pairs {
        let result = score_compatibility(a, b, None);
        assert!(result.overall_score <= 100);
        for &score in result.dimension_scores.values() {
            assert!((0.0..=100.0).contains(&score));
        }
    }
}

#[test]
fn test_all_default_weights_equal_unweighted() {
    let entries: Vec<QuestionWeight> = Dimension::ALL
        .iter()
        .map(|&question_id| QuestionWeight {
            question_id,
            weight: WeightSet::DEFAULT_WEIGHT,
        })
        .collect();
    let weights = WeightSet::from_entries(&entries).unwrap();

    let a = full_profile("a");
    let b = contrasting_profile("b");

    let weighted = score_compatibility(&a, &b, Some(&weights));
    let unweighted = score_compatibility(&a, &b, None);

    assert_eq!(weighted.overall_score, unweighted.overall_score);
    assert_eq!(weighted.dimension_scores, unweighted.dimension_scores);
}

#[test]
fn test_pet_override_forces_dimension_to_zero() {
    let mut owner = full_profile("owner");
    owner.lifestyle.as_mut().unwrap().pets_stance = Some(PetsStance::HasPets);

    let mut averse = full_profile("averse");
    averse.lifestyle.as_mut().unwrap().comfortable_with_pets = Some(false);

    let result = score_compatibility(&owner, &averse, None);
    assert_eq!(result.dimension_scores[&Dimension::Pets], 0.0);

    // Other dimensions are untouched by the override
    assert!(result.dimension_scores[&Dimension::Budget] > 0.0);

    // And it applies symmetrically
    let reverse = score_compatibility(&averse, &owner, None);
    assert_eq!(reverse.dimension_scores[&Dimension::Pets], 0.0);
}

#[test]
fn test_critical_weight_amplifies_a_bad_dimension() {
    let a = full_profile("a");
    let b = contrasting_profile("b");

    // Sleep schedules clash (early vs late); marking sleep critical should
    // pull the aggregate down versus baseline.
    let sleep_critical = WeightSet::from_entries(&[QuestionWeight {
        question_id: Dimension::SleepSchedule,
        weight: 5,
    }])
    .unwrap();

    let weighted = score_compatibility(&a, &b, Some(&sleep_critical));
    let baseline = score_compatibility(&a, &b, None);

    assert!(weighted.overall_score < baseline.overall_score);
}

#[test]
fn test_recomputation_is_reproducible() {
    let a = full_profile("a");
    let b = contrasting_profile("b");

    let first = score_compatibility(&a, &b, None);
    let second = score_compatibility(&a, &b, None);

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_quiet_hours_wrap_is_scored() {
    let a = full_profile("a"); // 22:00-07:00
    let b = contrasting_profile("b"); // 23:30-06:00

    let result = score_compatibility(&a, &b, None);
    let quiet = result.dimension_scores[&Dimension::QuietHours];
    // b's window sits inside a's: 390 shared minutes over a 540-minute union
    assert!((quiet - 100.0 * 390.0 / 540.0).abs() < 1e-6);
}
