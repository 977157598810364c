//! libpredict-core
//!
//! Adaptive context model, vocabulary, tokenization and evaluation shared
//! by the libpredict predictive-text crate.
//!
//! The model is an order-bounded PPM (prediction by partial matching)
//! engine: training feeds symbols through an incremental update that
//! grows a suffix-linked context trie, and prediction blends counts
//! across context orders through an escape mechanism into one normalized
//! distribution with a reserved out-of-vocabulary slot. Every operation
//! is bounded by the maximum order and the vocabulary size, so training
//! and prediction interleave freely on a stream.
//!
//! Public API:
//! - `PpmModel` - the adaptive model (train / observe / distribution)
//! - `ContextTree` / `ContextCursor` - trie storage and caller-held positions
//! - `Vocabulary` - symbol <-> id mapping with a reserved OOV id
//! - `Prediction` / `top_k` - ranked next-symbol selection
//! - `evaluate` / `EvalReport` - perplexity and entropy over held-out text
//! - `Config` - configuration and feature flags

use serde::{Deserialize, Serialize};

pub mod tree;
pub use tree::{ContextCursor, ContextTree};

pub mod model;
pub use model::{OovPolicy, PpmModel};

pub mod vocab;
pub use vocab::Vocabulary;

pub mod candidate;
pub use candidate::{top_k, Prediction};

pub mod tokenize;
pub use tokenize::{tokens, Granularity};

pub mod eval;
pub use eval::{evaluate, EvalReport};

/// Configuration for model construction and the prediction surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Longest context (in symbols) the model conditions on.
    pub max_order: usize,

    /// How the residual escape mass at order 0 is spent: shared among all
    /// never-seen ids plus OOV, or handed to the OOV slot alone.
    pub oov_policy: OovPolicy,

    /// Default number of predictions returned to callers.
    pub prediction_limit: usize,

    /// Maximum number of entries in the prefix -> predictions cache.
    pub max_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_order: 5,
            oov_policy: OovPolicy::default(),
            prediction_limit: 5,
            max_cache_size: 1000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers.
pub mod utils {
    use unicode_normalization::UnicodeNormalization;

    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        s.nfc().collect::<String>().trim().to_string()
    }

    /// NFC-normalize without trimming. Prediction prefixes may end in
    /// meaningful whitespace, so they must not be trimmed.
    pub fn nfc(s: &str) -> String {
        s.nfc().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_toml_round_trip() {
        let config = Config {
            max_order: 8,
            oov_policy: OovPolicy::OovOnly,
            prediction_limit: 3,
            max_cache_size: 64,
        };
        let text = config.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.max_order, 8);
        assert_eq!(parsed.oov_policy, OovPolicy::OovOnly);
        assert_eq!(parsed.prediction_limit, 3);
        assert_eq!(parsed.max_cache_size, 64);
    }

    #[test]
    fn normalize_trims_and_nfc_keeps_whitespace() {
        assert_eq!(utils::normalize("  hi there \n"), "hi there");
        assert_eq!(utils::nfc("he "), "he ");
    }
}
