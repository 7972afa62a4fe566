//! Dorma Algo - Roommate matching service for the Dorma student housing platform
//!
//! This library provides the compatibility scoring engine used by the Dorma
//! app: per-dimension preference normalization, weighted aggregation into a
//! single percentage, and deterministic ranking of candidate pools.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{score_compatibility, MatchError, Matcher, RankResult};
pub use models::{
    CompatibilityResult, Dimension, FindMatchesRequest, FindMatchesResponse,
    HousingPreferences, LifestylePreferences, PreferenceProfile, QuestionWeight, WeightSet,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let profile = PreferenceProfile::new("u1");
        assert!(!profile.is_answered());
        assert_eq!(Dimension::ALL.len(), 14);
    }
}
