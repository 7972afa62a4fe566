// Core algorithm exports
pub mod matcher;
pub mod normalize;
pub mod scoring;

pub use matcher::{MatchError, Matcher, RankResult};
pub use normalize::dimension_scores;
pub use scoring::score_compatibility;
