// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ChoresPreference, CompatibilityResult, Dimension, ExclusionKind, GuestsFrequency,
    HousingPreferences, LeaseLength, LifestylePreferences, MaxDistance, NoiseTolerance,
    PetsStance, PreferenceError, PreferenceProfile, QuestionWeight, SleepSchedule,
    SmokingPolicy, WeightSet,
};
pub use requests::{FindMatchesRequest, RecordExclusionRequest, ScorePairRequest};
pub use responses::{
    ErrorResponse, FindMatchesResponse, HealthResponse, RecordExclusionResponse,
    ScorePairResponse,
};
