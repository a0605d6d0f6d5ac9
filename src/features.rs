//! Feature construction shared by the logistic trainer and scorer

use crate::baseline::{BiasModel, RatingSummary};
use crate::recommenders::RecommenderList;
use crate::types::{ItemId, UserId};
use std::sync::Arc;

/// Number of fixed features ahead of the component deltas (bias, popularity)
pub const BASE_FEATURES: usize = 2;

/// `[bias, log10(popularity), delta_1, .., delta_N]`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: Vec<f64>,
    /// `false` where a component scorer had no opinion; such entries hold `0.0`
    pub available: Vec<bool>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds logistic-blend features for (user, item) pairs
#[derive(Clone)]
pub struct FeatureBuilder {
    bias_model: Arc<dyn BiasModel>,
    rating_summary: Arc<dyn RatingSummary>,
    recommenders: RecommenderList,
}

impl FeatureBuilder {
    pub fn new(
        bias_model: Arc<dyn BiasModel>,
        rating_summary: Arc<dyn RatingSummary>,
        recommenders: RecommenderList,
    ) -> Self {
        Self {
            bias_model,
            rating_summary,
            recommenders,
        }
    }

    /// Length of every vector this builder produces
    pub fn dimension(&self) -> usize {
        BASE_FEATURES + self.recommenders.len()
    }

    pub fn recommenders(&self) -> &RecommenderList {
        &self.recommenders
    }

    pub fn bias(&self, user: UserId, item: ItemId) -> f64 {
        self.bias_model.bias(user, item)
    }

    /// log10 of the item's rating count, with a count of 0 floored to 1
    pub fn popularity(&self, item: ItemId) -> f64 {
        let count = self.rating_summary.item_rating_count(item).max(1);
        (count as f64).log10()
    }

    pub fn build(&self, user: UserId, item: ItemId) -> FeatureVector {
        let bias = self.bias(user, item);
        let dim = self.dimension();

        let mut values = Vec::with_capacity(dim);
        let mut available = Vec::with_capacity(dim);
        values.push(bias);
        values.push(self.popularity(item));
        available.extend([true, true]);

        for scorer in self.recommenders.iter() {
            match scorer.score(user, item) {
                Some(score) => {
                    values.push(score - bias);
                    available.push(true);
                }
                None => {
                    values.push(0.0);
                    available.push(false);
                }
            }
        }

        FeatureVector { values, available }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{MeanBiasModel, RatingCounts};
    use crate::recommenders::{ScoreEntry, TableItemScorer};
    use std::collections::HashMap;

    fn builder() -> FeatureBuilder {
        let counts: HashMap<ItemId, u64> = [(1, 100), (2, 0)].into_iter().collect();
        FeatureBuilder::new(
            Arc::new(MeanBiasModel::constant(3.0)),
            Arc::new(RatingCounts::from_counts(counts)),
            RecommenderList::new(vec![
                Arc::new(TableItemScorer::new(
                    "a",
                    vec![ScoreEntry { user: 7, item: 1, score: 4.5 }],
                )),
                Arc::new(TableItemScorer::silent("b")),
            ]),
        )
    }

    #[test]
    fn test_feature_layout() {
        let features = builder().build(7, 1);
        assert_eq!(features.values, vec![3.0, 2.0, 1.5, 0.0]);
        assert_eq!(features.available, vec![true, true, true, false]);
    }

    #[test]
    fn test_zero_popularity_is_floored() {
        let b = builder();
        assert_eq!(b.popularity(2), 0.0);
        assert_eq!(b.popularity(999), 0.0);
        assert!(b.build(7, 2).values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_shape_independent_of_absence() {
        let b = builder();
        assert_eq!(b.dimension(), 4);
        assert_eq!(b.build(7, 1).len(), 4);
        assert_eq!(b.build(8, 3).len(), 4);
    }
}
