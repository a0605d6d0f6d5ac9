//! blendrank - hybrid recommender blending
//!
//! Combines independent item scorers into one score per candidate item with:
//! - A fixed-weight linear blend of two scorers around a bias baseline
//! - A logistic blend over bias, popularity and component-score features
//! - An online SGD trainer that fits the logistic blend from labelled ratings

pub mod types;
pub mod error;
pub mod baseline;
pub mod recommenders;
pub mod features;
pub mod logistic;
pub mod linear_blend;
pub mod logistic_blend;
pub mod trainer;
pub mod dataset;
pub mod config;
pub mod server;

pub use types::*;
pub use error::{BlendError, BlendResult};
pub use baseline::{BiasModel, MeanBiasModel, RatingCounts, RatingSummary};
pub use recommenders::{BaselineItemScorer, ItemScorer, RecommenderList, ScoreEntry, TableItemScorer};
pub use features::{FeatureBuilder, FeatureVector};
pub use logistic::{sigmoid, LogisticModel};
pub use linear_blend::LinearBlendScorer;
pub use logistic_blend::LogisticBlendScorer;
pub use trainer::{LogisticModelTrainer, TrainerConfig, TrainingReport, TrainingSource};
pub use dataset::{ComponentScores, RatingDataset};
pub use config::ServiceConfig;
