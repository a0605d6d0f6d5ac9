//! Service configuration read from `BLENDRANK_*` environment variables

use crate::error::{invalid_config, BlendResult};
use crate::trainer::{TrainerConfig, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE, DEFAULT_SEED};
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_DATASET: &str = "data/blendrank.json";
pub const DEFAULT_BLEND_WEIGHT: f64 = 0.5;
pub const DEFAULT_DAMPING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub dataset_path: String,
    pub blend_weight: f64,
    /// Component names for the linear blend; default to the dataset's first two
    pub left: Option<String>,
    pub right: Option<String>,
    pub trainer: TrainerConfig,
    pub damping: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            dataset_path: DEFAULT_DATASET.to_string(),
            blend_weight: DEFAULT_BLEND_WEIGHT,
            left: None,
            right: None,
            trainer: TrainerConfig::default(),
            damping: DEFAULT_DAMPING,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> BlendResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse from an arbitrary key lookup. Unset keys take defaults; set but
    /// malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> BlendResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "BLENDRANK_PORT", DEFAULT_PORT)?;
        let dataset_path =
            lookup("BLENDRANK_DATASET").unwrap_or_else(|| DEFAULT_DATASET.to_string());

        let blend_weight = parse_or(&lookup, "BLENDRANK_BLEND_WEIGHT", DEFAULT_BLEND_WEIGHT)?;
        if !(0.0..=1.0).contains(&blend_weight) {
            return Err(invalid_config(format!(
                "BLENDRANK_BLEND_WEIGHT={} out of range [0, 1]",
                blend_weight
            )));
        }

        let learning_rate =
            parse_or(&lookup, "BLENDRANK_LEARNING_RATE", DEFAULT_LEARNING_RATE)?;
        let epochs: i64 = parse_or(&lookup, "BLENDRANK_EPOCHS", DEFAULT_EPOCHS as i64)?;
        let seed = parse_or(&lookup, "BLENDRANK_SEED", DEFAULT_SEED)?;
        let trainer = TrainerConfig::validated(learning_rate, epochs, seed)?;

        let damping: f64 = parse_or(&lookup, "BLENDRANK_DAMPING", DEFAULT_DAMPING)?;
        if !damping.is_finite() || damping < 0.0 {
            return Err(invalid_config(format!(
                "BLENDRANK_DAMPING={} must be finite and non-negative",
                damping
            )));
        }

        Ok(Self {
            port,
            dataset_path,
            blend_weight,
            left: lookup("BLENDRANK_LEFT"),
            right: lookup("BLENDRANK_RIGHT"),
            trainer,
            damping,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> BlendResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid_config(format!("{}={:?} is not a valid value", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlendError;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.trainer.epochs, 100);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("BLENDRANK_PORT", "9000"),
            ("BLENDRANK_BLEND_WEIGHT", "0.2"),
            ("BLENDRANK_EPOCHS", "0"),
            ("BLENDRANK_SEED", "11"),
            ("BLENDRANK_LEFT", "item-item"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.blend_weight, 0.2);
        assert_eq!(config.trainer.epochs, 0);
        assert_eq!(config.trainer.seed, 11);
        assert_eq!(config.left.as_deref(), Some("item-item"));
        assert_eq!(config.right, None);
    }

    #[test]
    fn test_rejects_bad_values() {
        for pairs in [
            [("BLENDRANK_EPOCHS", "-3")],
            [("BLENDRANK_BLEND_WEIGHT", "1.5")],
            [("BLENDRANK_LEARNING_RATE", "fast")],
            [("BLENDRANK_DAMPING", "-1")],
        ] {
            let res = ServiceConfig::from_lookup(lookup_from(&pairs));
            assert!(matches!(res, Err(BlendError::InvalidConfig(_))), "{:?}", pairs);
        }
    }
}
