//! Inference-time scorer for a trained logistic blend

use crate::error::{BlendError, BlendResult};
use crate::features::FeatureBuilder;
use crate::logistic::LogisticModel;
use crate::types::{ItemId, ScoreMap, UserId};
use std::sync::Arc;
use tracing::debug;

/// Scores items with a fixed, trained `LogisticModel`. Read-only; share behind an `Arc`.
pub struct LogisticBlendScorer {
    model: Arc<LogisticModel>,
    features: FeatureBuilder,
}

impl LogisticBlendScorer {
    pub fn new(model: Arc<LogisticModel>, features: FeatureBuilder) -> BlendResult<Self> {
        if model.dimension() != features.dimension() {
            return Err(BlendError::FeatureShape {
                expected: features.dimension(),
                actual: model.dimension(),
            });
        }
        Ok(Self { model, features })
    }

    pub fn model(&self) -> &Arc<LogisticModel> {
        &self.model
    }

    pub fn score_one(&self, user: UserId, item: ItemId) -> f64 {
        let fv = self.features.build(user, item);
        self.model.predict(&fv.values)
    }

    pub fn score(&self, user: UserId, items: &[ItemId]) -> ScoreMap {
        debug!("Logistic blend: user={}, {} items", user, items.len());

        items
            .iter()
            .map(|&item| (item, self.score_one(user, item)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::{MeanBiasModel, RatingCounts};
    use crate::logistic::sigmoid;
    use crate::recommenders::{RecommenderList, ScoreEntry, TableItemScorer};

    fn builder() -> FeatureBuilder {
        FeatureBuilder::new(
            Arc::new(MeanBiasModel::constant(1.0)),
            Arc::new(RatingCounts::from_ratings(&[])),
            RecommenderList::new(vec![Arc::new(TableItemScorer::new(
                "a",
                vec![ScoreEntry { user: 1, item: 5, score: 3.0 }],
            ))]),
        )
    }

    #[test]
    fn test_rejects_mismatched_model() {
        let res = LogisticBlendScorer::new(Arc::new(LogisticModel::zeros(2)), builder());
        assert!(matches!(
            res,
            Err(BlendError::FeatureShape { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_scores_through_delta_features() {
        let model = LogisticModel::new(0.1, vec![0.5, 2.0, -1.0]);
        let scorer = LogisticBlendScorer::new(Arc::new(model), builder()).unwrap();

        // bias 1.0, popularity log10(1) = 0, delta 3.0 - 1.0
        let expected = sigmoid(0.1 + 0.5 * 1.0 - 1.0 * 2.0);
        assert!((scorer.score_one(1, 5) - expected).abs() < 1e-15);

        // absent component contributes nothing
        let expected_absent = sigmoid(0.1 + 0.5);
        let scores = scorer.score(1, &[5, 6]);
        assert_eq!(scores.len(), 2);
        assert!((scores[&6] - expected_absent).abs() < 1e-15);
    }
}
