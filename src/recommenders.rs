//! Component recommenders whose scores feed the blends

use crate::baseline::BiasModel;
use crate::types::{ItemId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for pluggable component scorers.
///
/// `None` means the scorer has no opinion about the pair, which is not the same as a score of zero.
pub trait ItemScorer: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, user: UserId, item: ItemId) -> Option<f64>;
}

/// Ordered, fixed-size set of component scorers
#[derive(Clone, Default)]
pub struct RecommenderList {
    scorers: Vec<Arc<dyn ItemScorer>>,
}

impl RecommenderList {
    pub fn new(scorers: Vec<Arc<dyn ItemScorer>>) -> Self {
        Self { scorers }
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Arc<dyn ItemScorer>> {
        self.scorers.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ItemScorer>> {
        self.scorers.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.scorers.iter().map(|s| s.name().to_string()).collect()
    }

    /// Look a scorer up by name
    pub fn find(&self, name: &str) -> Option<Arc<dyn ItemScorer>> {
        self.scorers.iter().find(|s| s.name() == name).cloned()
    }
}

impl std::fmt::Debug for RecommenderList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// One precomputed score row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub user: UserId,
    pub item: ItemId,
    pub score: f64,
}

/// Scorer backed by a precomputed (user, item) table
pub struct TableItemScorer {
    name: String,
    scores: HashMap<(UserId, ItemId), f64>,
}

impl TableItemScorer {
    pub fn new(name: impl Into<String>, entries: impl IntoIterator<Item = ScoreEntry>) -> Self {
        let scores = entries
            .into_iter()
            .map(|e| ((e.user, e.item), e.score))
            .collect();
        Self {
            name: name.into(),
            scores,
        }
    }

    /// Empty table: never has an opinion
    pub fn silent(name: impl Into<String>) -> Self {
        Self::new(name, std::iter::empty())
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl ItemScorer for TableItemScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, user: UserId, item: ItemId) -> Option<f64> {
        self.scores.get(&(user, item)).copied()
    }
}

/// Exposes a bias model as a component scorer; always has an opinion
pub struct BaselineItemScorer {
    bias_model: Arc<dyn BiasModel>,
}

impl BaselineItemScorer {
    pub fn new(bias_model: Arc<dyn BiasModel>) -> Self {
        Self { bias_model }
    }
}

impl ItemScorer for BaselineItemScorer {
    fn name(&self) -> &str {
        "baseline"
    }

    fn score(&self, user: UserId, item: ItemId) -> Option<f64> {
        Some(self.bias_model.bias(user, item))
    }
}
