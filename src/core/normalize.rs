use crate::models::{
    ChoresPreference, Dimension, GuestsFrequency, LifestylePreferences, MaxDistance,
    NoiseTolerance, PetsStance, PreferenceProfile, SleepSchedule, SmokingPolicy,
};
use chrono::{NaiveDate, NaiveTime, Timelike};
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Move-in dates this many days apart (or more) score zero.
const MOVE_IN_WINDOW_DAYS: f64 = 90.0;

/// Minutes in a day, for the circular quiet-hours domain.
const DAY_MINUTES: f64 = 1440.0;

/// Overlap of two closed numeric ranges: intersection length over union
/// length. 0 when disjoint, 1 when identical. Two equal degenerate points
/// have a zero-width union and score 1.
#[inline]
pub fn range_overlap(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
    let intersection = a_max.min(b_max) - a_min.max(b_min);
    if intersection < 0.0 {
        return 0.0;
    }

    let union = a_max.max(b_max) - a_min.min(b_min);
    if union <= 0.0 {
        // Both ranges collapsed to the same point
        return 1.0;
    }

    intersection / union
}

/// Linear distance score on a bounded scale: `1 - |a-b| / span`.
#[inline]
pub fn scaled_distance(a: f64, b: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 1.0;
    }
    (1.0 - (a - b).abs() / span).max(0.0)
}

/// Jaccard similarity of two sets, 1.0 when both are empty.
#[inline]
pub fn jaccard<T: Eq + Hash>(a: &[T], b: &[T]) -> f64 {
    let set_a: HashSet<&T> = a.iter().collect();
    let set_b: HashSet<&T> = b.iter().collect();

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 1.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

/// Overlap of two daily time intervals over their union, on the circular
/// minutes-of-day domain. An interval whose end precedes its start wraps
/// midnight (22:00-07:00). Two identical zero-length intervals score 1.
pub fn interval_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> f64 {
    let a = segments(a_start, a_end);
    let b = segments(b_start, b_end);

    let len_a: f64 = a.iter().map(|(s, e)| e - s).sum();
    let len_b: f64 = b.iter().map(|(s, e)| e - s).sum();

    let mut intersection = 0.0;
    for (sa, ea) in &a {
        for (sb, eb) in &b {
            intersection += (ea.min(*eb) - sa.max(*sb)).max(0.0);
        }
    }

    let union = len_a + len_b - intersection;
    if union <= 0.0 {
        // Both intervals are the same degenerate point
        return if minutes(a_start) == minutes(b_start) { 1.0 } else { 0.0 };
    }

    intersection / union
}

fn minutes(t: NaiveTime) -> f64 {
    (t.num_seconds_from_midnight() / 60) as f64
}

/// Split a possibly midnight-wrapping interval into linear segments.
fn segments(start: NaiveTime, end: NaiveTime) -> Vec<(f64, f64)> {
    let s = minutes(start);
    let e = minutes(end);
    if e >= s {
        vec![(s, e)]
    } else {
        vec![(s, DAY_MINUTES), (0.0, e)]
    }
}

/// Proximity of two move-in dates inside the alignment window.
#[inline]
pub fn move_in_proximity(a: NaiveDate, b: NaiveDate) -> f64 {
    let days_apart = (a - b).num_days().abs() as f64;
    (1.0 - days_apart / MOVE_IN_WINDOW_DAYS).max(0.0)
}

/// Affinity of two max-distance buckets. `AnyDistance` matches everything;
/// otherwise ordinal distance on the bucket scale.
#[inline]
pub fn distance_bucket_affinity(a: MaxDistance, b: MaxDistance) -> f64 {
    match (a.rank(), b.rank()) {
        (Some(ra), Some(rb)) => scaled_distance(ra as f64, rb as f64, 3.0),
        // AnyDistance sentinel on either side
        _ => 1.0,
    }
}

pub fn sleep_affinity(a: SleepSchedule, b: SleepSchedule) -> f64 {
    use SleepSchedule::*;
    match (a, b) {
        (Flexible, _) | (_, Flexible) => 1.0,
        (Early, Early) | (Late, Late) => 1.0,
        (Early, Late) | (Late, Early) => 0.25,
    }
}

pub fn noise_affinity(a: NoiseTolerance, b: NoiseTolerance) -> f64 {
    use NoiseTolerance::*;
    match (a, b) {
        (Quiet, Quiet) | (Moderate, Moderate) | (Loud, Loud) => 1.0,
        (Quiet, Moderate) | (Moderate, Quiet) => 0.5,
        (Moderate, Loud) | (Loud, Moderate) => 0.5,
        (Quiet, Loud) | (Loud, Quiet) => 0.0,
    }
}

pub fn chores_affinity(a: ChoresPreference, b: ChoresPreference) -> f64 {
    use ChoresPreference::*;
    match (a, b) {
        (NoPreference, _) | (_, NoPreference) => 1.0,
        (RotatingSchedule, RotatingSchedule) | (SplitAreas, SplitAreas) => 1.0,
        (RotatingSchedule, SplitAreas) | (SplitAreas, RotatingSchedule) => 0.5,
    }
}

pub fn guests_affinity(a: GuestsFrequency, b: GuestsFrequency) -> f64 {
    use GuestsFrequency::*;
    match (a, b) {
        (Rarely, Rarely) | (Sometimes, Sometimes) | (Often, Often) => 1.0,
        (Rarely, Sometimes) | (Sometimes, Rarely) => 0.5,
        (Sometimes, Often) | (Often, Sometimes) => 0.5,
        (Rarely, Often) | (Often, Rarely) => 0.0,
    }
}

/// Pets dimension with the hard incompatibility override: a pet owner paired
/// with someone who explicitly answered "not comfortable with pets" scores 0
/// no matter what. An unanswered comfort question never triggers the
/// override.
pub fn pets_score(
    a_stance: PetsStance,
    a_comfortable: Option<bool>,
    b_stance: PetsStance,
    b_comfortable: Option<bool>,
) -> f64 {
    let a_owns = a_stance == PetsStance::HasPets;
    let b_owns = b_stance == PetsStance::HasPets;

    if (a_owns && b_comfortable == Some(false)) || (b_owns && a_comfortable == Some(false)) {
        return 0.0;
    }

    if a_stance == b_stance {
        1.0
    } else {
        0.75
    }
}

/// Smoking policy: the `any` sentinel matches everything, otherwise set
/// overlap (both answered-empty sets count as agreement).
pub fn smoking_score(a: &[SmokingPolicy], b: &[SmokingPolicy]) -> f64 {
    if a.contains(&SmokingPolicy::Any) || b.contains(&SmokingPolicy::Any) {
        return 1.0;
    }
    jaccard(a, b)
}

/// Compare two preference snapshots dimension by dimension.
///
/// Returns a unit-interval similarity per dimension, keyed by `Dimension`.
/// A dimension appears only when both users answered it; missing answers
/// are skipped, never penalized. Every entry is symmetric in its inputs.
pub fn dimension_scores(a: &PreferenceProfile, b: &PreferenceProfile) -> BTreeMap<Dimension, f64> {
    let mut scores = BTreeMap::new();

    if let (Some(ha), Some(hb)) = (&a.housing, &b.housing) {
        if let (Some(a_min), Some(a_max), Some(b_min), Some(b_max)) =
            (ha.budget_min, ha.budget_max, hb.budget_min, hb.budget_max)
        {
            scores.insert(
                Dimension::Budget,
                range_overlap(a_min as f64, a_max as f64, b_min as f64, b_max as f64),
            );
        }

        if let (Some(da), Some(db)) = (ha.move_in_date, hb.move_in_date) {
            scores.insert(Dimension::MoveInDate, move_in_proximity(da, db));
        }

        if let (Some(la), Some(lb)) = (&ha.lease_lengths, &hb.lease_lengths) {
            scores.insert(Dimension::LeaseLength, jaccard(la, lb));
        }

        if let (Some(ma), Some(mb)) = (ha.max_distance, hb.max_distance) {
            scores.insert(Dimension::MaxDistance, distance_bucket_affinity(ma, mb));
        }

        if let (Some(sa), Some(ea), Some(sb), Some(eb)) = (
            ha.quiet_hours_start,
            ha.quiet_hours_end,
            hb.quiet_hours_start,
            hb.quiet_hours_end,
        ) {
            scores.insert(Dimension::QuietHours, interval_overlap(sa, ea, sb, eb));
        }
    }

    if let (Some(la), Some(lb)) = (&a.lifestyle, &b.lifestyle) {
        lifestyle_scores(la, lb, &mut scores);
    }

    scores
}

fn lifestyle_scores(
    a: &LifestylePreferences,
    b: &LifestylePreferences,
    scores: &mut BTreeMap<Dimension, f64>,
) {
    if let (Some(ca), Some(cb)) = (a.cleanliness_level, b.cleanliness_level) {
        scores.insert(
            Dimension::Cleanliness,
            scaled_distance(ca as f64, cb as f64, 4.0),
        );
    }

    if let (Some(na), Some(nb)) = (a.noise_tolerance, b.noise_tolerance) {
        scores.insert(Dimension::NoiseTolerance, noise_affinity(na, nb));
    }

    if let (Some(sa), Some(sb)) = (a.sleep_schedule, b.sleep_schedule) {
        scores.insert(Dimension::SleepSchedule, sleep_affinity(sa, sb));
    }

    if let (Some(pa), Some(pb)) = (a.pets_stance, b.pets_stance) {
        scores.insert(
            Dimension::Pets,
            pets_score(pa, a.comfortable_with_pets, pb, b.comfortable_with_pets),
        );
    }

    if let (Some(aa), Some(ab)) = (&a.pet_allergies, &b.pet_allergies) {
        scores.insert(Dimension::PetAllergies, jaccard(aa, ab));
    }

    if let (Some(sa), Some(sb)) = (&a.smoking_policy, &b.smoking_policy) {
        scores.insert(Dimension::Smoking, smoking_score(sa, sb));
    }

    if let (Some(ca), Some(cb)) = (a.chores_preference, b.chores_preference) {
        scores.insert(Dimension::Chores, chores_affinity(ca, cb));
    }

    if let (Some(ga), Some(gb)) = (a.guests_frequency, b.guests_frequency) {
        scores.insert(Dimension::Guests, guests_affinity(ga, gb));
    }

    if let (Some(wa), Some(wb)) = (a.work_from_home_days, b.work_from_home_days) {
        scores.insert(
            Dimension::WorkFromHome,
            scaled_distance(wa as f64, wb as f64, 7.0),
        );
    }
}
