//! Fixed-weight interpolation of two component scorers around the baseline

use crate::baseline::BiasModel;
use crate::error::{invalid_config, BlendResult};
use crate::recommenders::ItemScorer;
use crate::types::{ItemId, ScoreMap, UserId};
use std::sync::Arc;
use tracing::debug;

/// Blends the excess-over-baseline of a left and right scorer.
///
/// `weight = 0` reproduces the left scorer, `weight = 1` the right one. A scorer
/// with no opinion on an item stands in with the baseline for that item.
pub struct LinearBlendScorer {
    bias_model: Arc<dyn BiasModel>,
    left: Arc<dyn ItemScorer>,
    right: Arc<dyn ItemScorer>,
    weight: f64,
}

impl LinearBlendScorer {
    pub fn new(
        bias_model: Arc<dyn BiasModel>,
        left: Arc<dyn ItemScorer>,
        right: Arc<dyn ItemScorer>,
        weight: f64,
    ) -> BlendResult<Self> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(invalid_config(format!(
                "blend weight {} out of range [0, 1]",
                weight
            )));
        }

        Ok(Self {
            bias_model,
            left,
            right,
            weight,
        })
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn score_one(&self, user: UserId, item: ItemId) -> f64 {
        let bias = self.bias_model.bias(user, item);
        let left = self.left.score(user, item).unwrap_or(bias);
        let right = self.right.score(user, item).unwrap_or(bias);

        bias + (1.0 - self.weight) * (left - bias) + self.weight * (right - bias)
    }

    /// Score every requested item
    pub fn score(&self, user: UserId, items: &[ItemId]) -> ScoreMap {
        debug!(
            "Linear blend ({} / {}, w={}): user={}, {} items",
            self.left.name(),
            self.right.name(),
            self.weight,
            user,
            items.len()
        );

        items
            .iter()
            .map(|&item| (item, self.score_one(user, item)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::MeanBiasModel;
    use crate::error::BlendError;
    use crate::recommenders::{ScoreEntry, TableItemScorer};

    fn table(name: &str, rows: &[(ItemId, f64)]) -> Arc<dyn ItemScorer> {
        Arc::new(TableItemScorer::new(
            name,
            rows.iter().map(|&(item, score)| ScoreEntry { user: 1, item, score }),
        ))
    }

    fn baseline() -> Arc<dyn BiasModel> {
        Arc::new(MeanBiasModel::constant(3.0))
    }

    #[test]
    fn test_rejects_out_of_range_weight() {
        for w in [-0.01, 1.01, f64::NAN] {
            let res = LinearBlendScorer::new(baseline(), table("l", &[]), table("r", &[]), w);
            assert!(matches!(res, Err(BlendError::InvalidConfig(_))), "weight {}", w);
        }
    }

    #[test]
    fn test_both_absent_yields_baseline() {
        let scorer =
            LinearBlendScorer::new(baseline(), table("l", &[]), table("r", &[]), 0.5).unwrap();
        let scores = scorer.score(1, &[42]);
        assert_eq!(scores[&42], 3.0);
    }

    #[test]
    fn test_boundary_weights() {
        let left = table("l", &[(1, 4.0), (2, 2.5)]);
        let right = table("r", &[(1, 1.0)]);

        let all_left =
            LinearBlendScorer::new(baseline(), left.clone(), right.clone(), 0.0).unwrap();
        let all_right = LinearBlendScorer::new(baseline(), left, right, 1.0).unwrap();

        assert_eq!(all_left.score_one(1, 1), 4.0);
        assert_eq!(all_left.score_one(1, 2), 2.5);
        assert_eq!(all_right.score_one(1, 1), 1.0);
        // right has no opinion on item 2: falls back to baseline
        assert_eq!(all_right.score_one(1, 2), 3.0);
    }

    #[test]
    fn test_interpolates_excess() {
        let scorer = LinearBlendScorer::new(
            baseline(),
            table("l", &[(1, 5.0)]),
            table("r", &[(1, 2.0)]),
            0.25,
        )
        .unwrap();
        // 3 + 0.75 * 2 + 0.25 * -1
        assert!((scorer.score_one(1, 1) - 4.25).abs() < 1e-12);
    }

    #[test]
    fn test_result_is_total() {
        let scorer =
            LinearBlendScorer::new(baseline(), table("l", &[(1, 5.0)]), table("r", &[]), 0.3)
                .unwrap();
        let items = [1, 2, 3, 4];
        let scores = scorer.score(1, &items);
        assert_eq!(scores.len(), items.len());
        assert!(items.iter().all(|i| scores.contains_key(i)));
    }
}
