//! Scoring and rating.
//!
//! - [`score_linting`]: issues and applicable rule count to a 0-100 score
//! - [`calculate_rating`]: score to letter rating
//! - [`calculate_average_score`]: weighted overall score across dimensions
//!
//! All functions are pure; configuration is passed in explicitly.

mod grades;
mod scorer;
mod weights;

pub use grades::{calculate_rating, clamp_score, Rating, RatingInfo};
pub use scorer::{score_linting, score_linting_with, SeverityWeights};
pub use weights::{calculate_average_score, DimensionWeights, WeightTable};
