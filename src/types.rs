//! Core type definitions shared by the blend scorers and the trainer

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub type UserId = i64;
pub type ItemId = i64;

/// One historical rating event; `value` is the training label (+1 / -1 for implicit feedback)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user: UserId,
    pub item: ItemId,
    pub value: f64,
}

impl Rating {
    pub fn new(user: UserId, item: ItemId, value: f64) -> Self {
        Self { user, item, value }
    }
}

/// Result of scoring a candidate set: every requested item maps to a score
pub type ScoreMap = HashMap<ItemId, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: ItemId,
    pub score: f64,
}

/// Rank a score map descending by score.
///
/// Ties go to the lower item id; non-finite scores (NaN, ±inf) sort after every finite one.
pub fn top_n(scores: &ScoreMap, n: usize) -> Vec<ScoredItem> {
    let mut ranked: Vec<ScoredItem> = scores
        .iter()
        .map(|(&item, &score)| ScoredItem { item, score })
        .collect();

    ranked.sort_by(|a, b| match (!a.score.is_finite(), !b.score.is_finite()) {
        (true, true) => a.item.cmp(&b.item),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b
            .score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.item.cmp(&b.item)),
    });

    ranked.truncate(n);
    ranked
}
