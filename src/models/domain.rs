use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One scorable preference axis.
///
/// This is the closed set of question ids: weight entries reference these,
/// and `dimensionScores` in a result is keyed by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Budget,
    MoveInDate,
    LeaseLength,
    MaxDistance,
    QuietHours,
    Cleanliness,
    NoiseTolerance,
    SleepSchedule,
    Pets,
    PetAllergies,
    Smoking,
    Chores,
    Guests,
    WorkFromHome,
}

impl Dimension {
    pub const ALL: [Dimension; 14] = [
        Dimension::Budget,
        Dimension::MoveInDate,
        Dimension::LeaseLength,
        Dimension::MaxDistance,
        Dimension::QuietHours,
        Dimension::Cleanliness,
        Dimension::NoiseTolerance,
        Dimension::SleepSchedule,
        Dimension::Pets,
        Dimension::PetAllergies,
        Dimension::Smoking,
        Dimension::Chores,
        Dimension::Guests,
        Dimension::WorkFromHome,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseLength {
    Semester,
    AcademicYear,
    FullYear,
    MonthToMonth,
    Summer,
}

/// Preferred maximum distance from campus, as the questionnaire buckets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxDistance {
    UnderOneKm,
    UnderThreeKm,
    UnderFiveKm,
    UnderTenKm,
    AnyDistance,
}

impl MaxDistance {
    /// Ordinal position on the bucket scale; `AnyDistance` has no position
    /// (it is a sentinel, handled before ordinals are compared).
    pub fn rank(self) -> Option<u8> {
        match self {
            MaxDistance::UnderOneKm => Some(0),
            MaxDistance::UnderThreeKm => Some(1),
            MaxDistance::UnderFiveKm => Some(2),
            MaxDistance::UnderTenKm => Some(3),
            MaxDistance::AnyDistance => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseTolerance {
    Quiet,
    Moderate,
    Loud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepSchedule {
    Early,
    Late,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetsStance {
    HasPets,
    NoPets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokingPolicy {
    NoSmoking,
    OutsideOnly,
    VapingOnly,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoresPreference {
    RotatingSchedule,
    SplitAreas,
    NoPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestsFrequency {
    Rarely,
    Sometimes,
    Often,
}

/// Housing side of the questionnaire. Every field is optional: an absent
/// field means the question was never answered and the dimension is skipped
/// for this user, not defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HousingPreferences {
    #[serde(rename = "budgetMin", default)]
    pub budget_min: Option<u32>,
    #[serde(rename = "budgetMax", default)]
    pub budget_max: Option<u32>,
    #[serde(rename = "moveInDate", default)]
    pub move_in_date: Option<NaiveDate>,
    #[serde(rename = "leaseLengths", default)]
    pub lease_lengths: Option<Vec<LeaseLength>>,
    #[serde(rename = "maxDistance", default)]
    pub max_distance: Option<MaxDistance>,
    #[serde(rename = "quietHoursStart", default)]
    pub quiet_hours_start: Option<NaiveTime>,
    #[serde(rename = "quietHoursEnd", default)]
    pub quiet_hours_end: Option<NaiveTime>,
}

impl HousingPreferences {
    pub fn is_answered(&self) -> bool {
        self.budget_min.is_some()
            || self.budget_max.is_some()
            || self.move_in_date.is_some()
            || self.lease_lengths.is_some()
            || self.max_distance.is_some()
            || self.quiet_hours_start.is_some()
            || self.quiet_hours_end.is_some()
    }
}

/// Lifestyle side of the questionnaire. Same optionality rule as
/// `HousingPreferences`; `Some(vec![])` is an answered-empty set (e.g. no
/// pet allergies), distinct from an unanswered `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifestylePreferences {
    #[serde(rename = "cleanlinessLevel", default)]
    pub cleanliness_level: Option<u8>,
    #[serde(rename = "noiseTolerance", default)]
    pub noise_tolerance: Option<NoiseTolerance>,
    #[serde(rename = "sleepSchedule", default)]
    pub sleep_schedule: Option<SleepSchedule>,
    #[serde(rename = "petsStance", default)]
    pub pets_stance: Option<PetsStance>,
    #[serde(rename = "comfortableWithPets", default)]
    pub comfortable_with_pets: Option<bool>,
    #[serde(rename = "petAllergies", default)]
    pub pet_allergies: Option<Vec<String>>,
    #[serde(rename = "smokingPolicy", default)]
    pub smoking_policy: Option<Vec<SmokingPolicy>>,
    #[serde(rename = "choresPreference", default)]
    pub chores_preference: Option<ChoresPreference>,
    #[serde(rename = "guestsFrequency", default)]
    pub guests_frequency: Option<GuestsFrequency>,
    #[serde(rename = "workFromHomeDays", default)]
    pub work_from_home_days: Option<u8>,
}

impl LifestylePreferences {
    pub fn is_answered(&self) -> bool {
        self.cleanliness_level.is_some()
            || self.noise_tolerance.is_some()
            || self.sleep_schedule.is_some()
            || self.pets_stance.is_some()
            || self.comfortable_with_pets.is_some()
            || self.pet_allergies.is_some()
            || self.smoking_policy.is_some()
            || self.chores_preference.is_some()
            || self.guests_frequency.is_some()
            || self.work_from_home_days.is_some()
    }
}

/// Structurally invalid stored data, rejected at the fetch boundary.
/// The scorer never sees records that fail these checks.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("budget range is inverted: min {min} > max {max}")]
    InvalidBudgetRange { min: u32, max: u32 },

    #[error("budget range is half-open: both budgetMin and budgetMax are required")]
    HalfOpenBudgetRange,

    #[error("cleanliness level {0} is outside 1-5")]
    CleanlinessOutOfRange(u8),

    #[error("work-from-home days {0} is outside 0-7")]
    WorkFromHomeOutOfRange(u8),

    #[error("question weight {0} is outside 1-5")]
    WeightOutOfRange(u8),
}

/// One user's full preference snapshot as read from the preference store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub housing: Option<HousingPreferences>,
    #[serde(default)]
    pub lifestyle: Option<LifestylePreferences>,
    /// Store-side modification stamp (`$updatedAt` in Appwrite documents).
    /// Feeds the cache key so a preference edit invalidates cached scores.
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl PreferenceProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            housing: None,
            lifestyle: None,
            updated_at: None,
        }
    }

    /// Whether the user answered anything at all. A profile document can
    /// exist with no answers (the questionnaire was opened and abandoned);
    /// that still counts as the prerequisite not being met.
    pub fn is_answered(&self) -> bool {
        self.housing.as_ref().is_some_and(|h| h.is_answered())
            || self.lifestyle.as_ref().is_some_and(|l| l.is_answered())
    }

    /// Opaque version tag for cache keys, derived from the store's
    /// modification stamp.
    pub fn version_tag(&self) -> String {
        self.updated_at
            .map(|t| t.timestamp_millis().to_string())
            .unwrap_or_else(|| "0".to_string())
    }

    /// Boundary validation of structural invariants. Scoring assumes these
    /// hold and never re-checks them.
    pub fn validate(&self) -> Result<(), PreferenceError> {
        if let Some(housing) = &self.housing {
            match (housing.budget_min, housing.budget_max) {
                (Some(min), Some(max)) if min > max => {
                    return Err(PreferenceError::InvalidBudgetRange { min, max });
                }
                (Some(_), None) | (None, Some(_)) => {
                    return Err(PreferenceError::HalfOpenBudgetRange);
                }
                _ => {}
            }
        }
        if let Some(lifestyle) = &self.lifestyle {
            if let Some(level) = lifestyle.cleanliness_level {
                if !(1..=5).contains(&level) {
                    return Err(PreferenceError::CleanlinessOutOfRange(level));
                }
            }
            if let Some(days) = lifestyle.work_from_home_days {
                if days > 7 {
                    return Err(PreferenceError::WorkFromHomeOutOfRange(days));
                }
            }
        }
        Ok(())
    }
}

/// A user's importance weight for one question, 1 (nice to have) to
/// 5 (critical).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionWeight {
    #[serde(rename = "questionId")]
    pub question_id: Dimension,
    pub weight: u8,
}

impl QuestionWeight {
    pub fn validate(&self) -> Result<(), PreferenceError> {
        if (1..=5).contains(&self.weight) {
            Ok(())
        } else {
            Err(PreferenceError::WeightOutOfRange(self.weight))
        }
    }
}

/// Per-user importance weights keyed by dimension. Dimensions without an
/// entry score at the baseline weight, so an empty set reproduces the
/// unweighted mean exactly.
#[derive(Debug, Clone, Default)]
pub struct WeightSet {
    weights: BTreeMap<Dimension, u8>,
}

impl WeightSet {
    /// Baseline weight ("important") for dimensions the user did not rank.
    pub const DEFAULT_WEIGHT: u8 = 3;

    pub fn new() -> Self {
        Self::default()
    }

    /// Build from store entries, rejecting out-of-range weights. Later
    /// entries for the same question overwrite earlier ones.
    pub fn from_entries(entries: &[QuestionWeight]) -> Result<Self, PreferenceError> {
        let mut weights = BTreeMap::new();
        for entry in entries {
            entry.validate()?;
            weights.insert(entry.question_id, entry.weight);
        }
        Ok(Self { weights })
    }

    pub fn weight_for(&self, dimension: Dimension) -> u8 {
        self.weights
            .get(&dimension)
            .copied()
            .unwrap_or(Self::DEFAULT_WEIGHT)
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Computed compatibility between two users. Transient: recomputing from the
/// same snapshots reproduces it exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResult {
    #[serde(rename = "counterpartUserId")]
    pub counterpart_user_id: String,
    /// Aggregate percentage, rounded and clamped to 0-100.
    #[serde(rename = "overallScore")]
    pub overall_score: u8,
    /// Unrounded per-dimension percentages, for transparency. Only
    /// dimensions both users answered appear here.
    #[serde(rename = "dimensionScores")]
    pub dimension_scores: BTreeMap<Dimension, f64>,
}

/// Relationship kinds that exclude a pair from each other's candidate pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionKind {
    Connected,
    Blocked,
}
