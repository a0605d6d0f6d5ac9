//! JSON-backed rating data: the history used for baselines, the labelled
//! training examples, and precomputed component recommender scores

use crate::recommenders::{ItemScorer, RecommenderList, ScoreEntry, TableItemScorer};
use crate::trainer::TrainingSource;
use crate::types::Rating;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentScores {
    pub name: String,
    #[serde(default)]
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingDataset {
    /// Rating history: feeds the bias model and popularity counts
    #[serde(default)]
    pub ratings: Vec<Rating>,
    /// Labelled examples (+1 observed, -1 sampled negative) for the logistic trainer
    #[serde(default)]
    pub training: Vec<Rating>,
    #[serde(default)]
    pub components: Vec<ComponentScores>,
}

impl RatingDataset {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse rating dataset")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let dataset = Self::from_json(&content)
            .with_context(|| format!("Invalid dataset {}", path.display()))?;

        info!(
            "Loaded dataset {}: {} ratings, {} training examples, {} components",
            path.display(),
            dataset.ratings.len(),
            dataset.training.len(),
            dataset.components.len()
        );

        Ok(dataset)
    }

    /// One table scorer per component, in file order
    pub fn recommenders(&self) -> RecommenderList {
        let scorers: Vec<Arc<dyn ItemScorer>> = self
            .components
            .iter()
            .map(|c| {
                Arc::new(TableItemScorer::new(c.name.clone(), c.scores.iter().copied()))
                    as Arc<dyn ItemScorer>
            })
            .collect();
        RecommenderList::new(scorers)
    }
}

impl TrainingSource for RatingDataset {
    fn training_examples(&self) -> Vec<Rating> {
        self.training.clone()
    }
}
