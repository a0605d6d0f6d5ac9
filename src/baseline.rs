//! Baseline collaborators: the additive bias model and per-item rating counts

use crate::types::{ItemId, Rating, UserId};
use std::collections::HashMap;
use tracing::debug;

/// Baseline predictor decomposed into global, per-user and per-item terms.
///
/// Implementations must answer for any id; unknown ids should return `0.0`.
pub trait BiasModel: Send + Sync {
    fn intercept(&self) -> f64;
    fn user_bias(&self, user: UserId) -> f64;
    fn item_bias(&self, item: ItemId) -> f64;

    /// `intercept + user_bias(user) + item_bias(item)`
    fn bias(&self, user: UserId, item: ItemId) -> f64 {
        self.intercept() + self.user_bias(user) + self.item_bias(item)
    }
}

/// Popularity source for the logistic blend
pub trait RatingSummary: Send + Sync {
    fn item_rating_count(&self, item: ItemId) -> u64;
}

/// In-memory bias model with damped-mean fitting
#[derive(Debug, Clone, Default)]
pub struct MeanBiasModel {
    intercept: f64,
    user_biases: HashMap<UserId, f64>,
    item_biases: HashMap<ItemId, f64>,
}

impl MeanBiasModel {
    pub fn new(
        intercept: f64,
        user_biases: HashMap<UserId, f64>,
        item_biases: HashMap<ItemId, f64>,
    ) -> Self {
        Self {
            intercept,
            user_biases,
            item_biases,
        }
    }

    /// Constant baseline with no per-user or per-item terms
    pub fn constant(intercept: f64) -> Self {
        Self::new(intercept, HashMap::new(), HashMap::new())
    }

    /// Fit global mean, then item biases, then user biases on the item-adjusted residuals.
    /// `damping` pulls sparse users/items toward zero; negative or NaN damping counts as 0.
    pub fn fit(ratings: &[Rating], damping: f64) -> Self {
        let intercept = global_mean(ratings);
        let item_biases = damped_means(
            ratings.iter().map(|r| (r.item, r.value - intercept)),
            damping,
        );
        let user_biases = damped_means(
            ratings.iter().map(|r| {
                let item_bias = item_biases.get(&r.item).copied().unwrap_or(0.0);
                (r.user, r.value - intercept - item_bias)
            }),
            damping,
        );

        debug!(
            "Fitted bias model: intercept={:.4}, {} users, {} items",
            intercept,
            user_biases.len(),
            item_biases.len()
        );

        Self::new(intercept, user_biases, item_biases)
    }

    /// Global mean plus user offsets; item biases are all zero
    pub fn fit_user_only(ratings: &[Rating], damping: f64) -> Self {
        let intercept = global_mean(ratings);
        let user_biases = damped_means(
            ratings.iter().map(|r| (r.user, r.value - intercept)),
            damping,
        );

        debug!(
            "Fitted user bias model: intercept={:.4}, {} users",
            intercept,
            user_biases.len()
        );

        Self::new(intercept, user_biases, HashMap::new())
    }
}

impl BiasModel for MeanBiasModel {
    fn intercept(&self) -> f64 {
        self.intercept
    }

    fn user_bias(&self, user: UserId) -> f64 {
        self.user_biases.get(&user).copied().unwrap_or(0.0)
    }

    fn item_bias(&self, item: ItemId) -> f64 {
        self.item_biases.get(&item).copied().unwrap_or(0.0)
    }
}

fn global_mean(ratings: &[Rating]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| r.value).sum::<f64>() / ratings.len() as f64
}

fn damped_means(residuals: impl Iterator<Item = (i64, f64)>, damping: f64) -> HashMap<i64, f64> {
    let damping = damping.max(0.0);
    let mut acc: HashMap<i64, (f64, u64)> = HashMap::new();
    for (key, residual) in residuals {
        let entry = acc.entry(key).or_insert((0.0, 0));
        entry.0 += residual;
        entry.1 += 1;
    }

    acc.into_iter()
        .map(|(key, (sum, count))| (key, sum / (count as f64 + damping)))
        .collect()
}

/// Number of ratings each item has received
#[derive(Debug, Clone, Default)]
pub struct RatingCounts {
    counts: HashMap<ItemId, u64>,
}

impl RatingCounts {
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let mut counts = HashMap::new();
        for r in ratings {
            *counts.entry(r.item).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn from_counts(counts: HashMap<ItemId, u64>) -> Self {
        Self { counts }
    }

    pub fn item_count(&self) -> usize {
        self.counts.len()
    }
}

impl RatingSummary for RatingCounts {
    fn item_rating_count(&self, item: ItemId) -> u64 {
        self.counts.get(&item).copied().unwrap_or(0)
    }
}
