// libpredict/src/engine.rs
//
// Predictive-text engine: ties the vocabulary, tokenizer and PPM model
// together and caches rendered predictions per prefix.

use std::cell::RefCell;

use anyhow::{ensure, Result};
use libpredict_core::{
    evaluate, tokens, top_k, utils, Config, EvalReport, Granularity, PpmModel, Vocabulary,
};
use tracing::{debug, info};

/// Marker rendered for the reserved out-of-vocabulary prediction slot.
pub const OOV_MARKER: &str = "<OOV>";

/// High-level predictive-text engine.
///
/// Owns the vocabulary and the adaptive model; callers feed it raw text
/// and get back rendered `(symbol, probability)` pairs. Prediction
/// results are cached per prefix until the next mutating call.
pub struct Engine {
    vocab: Vocabulary,
    model: PpmModel,
    granularity: Granularity,
    limit: usize,
    cache: RefCell<lru::LruCache<String, Vec<(String, f64)>>>,
    cache_hits: RefCell<usize>,
    cache_misses: RefCell<usize>,
}

impl Engine {
    /// Build a vocabulary from `text` and train a fresh model on it.
    ///
    /// The whole corpus is NFC-normalized, every distinct token is
    /// registered, then the token stream is trained in order through one
    /// cursor, the same pass a live input stream would take.
    pub fn train_from_text(config: &Config, text: &str, granularity: Granularity) -> Result<Self> {
        let text = utils::normalize(text);
        let stream = tokens(&text, granularity);
        let mut vocab = Vocabulary::new();
        for token in &stream {
            vocab.add(token);
        }
        ensure!(
            !vocab.is_empty(),
            "training text produced an empty vocabulary"
        );

        let mut model = PpmModel::with_policy(config.max_order, vocab.len(), config.oov_policy)?;
        let mut cursor = model.create_cursor();
        for token in &stream {
            model.train(&mut cursor, vocab.id_or_oov(token))?;
        }
        info!(
            symbols = vocab.len(),
            nodes = model.node_count(),
            max_order = model.max_order(),
            "trained model"
        );

        let capacity = std::num::NonZeroUsize::new(config.max_cache_size)
            .unwrap_or(std::num::NonZeroUsize::new(1000).unwrap());
        Ok(Self {
            vocab,
            model,
            granularity,
            limit: config.prediction_limit,
            cache: RefCell::new(lru::LruCache::new(capacity)),
            cache_hits: RefCell::new(0),
            cache_misses: RefCell::new(0),
        })
    }

    /// Ranked continuations of a prefix, rendered as symbol strings.
    ///
    /// The prefix positions a read-only cursor (tokens missing from the
    /// trained vocabulary degrade to OOV); the reserved slot renders as
    /// [`OOV_MARKER`].
    pub fn predict(&self, prefix: &str) -> Result<Vec<(String, f64)>> {
        let prefix = utils::nfc(prefix);
        if let Some(cached) = self.cache.borrow_mut().get(&prefix) {
            *self.cache_hits.borrow_mut() += 1;
            return Ok(cached.clone());
        }
        *self.cache_misses.borrow_mut() += 1;

        let mut cursor = self.model.create_cursor();
        for token in tokens(&prefix, self.granularity) {
            self.model.observe(&mut cursor, self.vocab.id_or_oov(&token))?;
        }
        debug!(prefix = %prefix, order = cursor.order(), "positioned prediction cursor");

        let probs = self.model.distribution(&cursor)?;
        let rendered: Vec<(String, f64)> = top_k(&probs, self.limit)
            .into_iter()
            .map(|p| {
                let text = self
                    .vocab
                    .symbol_of(p.id)
                    .map(str::to_string)
                    .unwrap_or_else(|| OOV_MARKER.to_string());
                (text, p.prob)
            })
            .collect();

        self.cache.borrow_mut().put(prefix, rendered.clone());
        Ok(rendered)
    }

    /// Feed more text into the model (online learning).
    ///
    /// Tokens outside the trained vocabulary train the OOV slot. Clears
    /// the prediction cache so updated counts are reflected immediately.
    pub fn learn(&mut self, text: &str) -> Result<()> {
        let text = utils::nfc(text);
        let mut cursor = self.model.create_cursor();
        for token in tokens(&text, self.granularity) {
            self.model.train(&mut cursor, self.vocab.id_or_oov(&token))?;
        }
        self.clear_cache();
        Ok(())
    }

    /// Score held-out text; `adapt` keeps training while scoring.
    pub fn evaluate(&mut self, text: &str, adapt: bool) -> Result<EvalReport> {
        let report = evaluate(&mut self.model, &self.vocab, text, self.granularity, adapt)?;
        if adapt {
            self.clear_cache();
        }
        Ok(report)
    }

    /// Number of registered symbols (the OOV slot excluded).
    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }

    /// Number of context nodes in the trained trie.
    pub fn node_count(&self) -> usize {
        self.model.node_count()
    }

    /// Number of predictions `predict` returns.
    pub fn prediction_limit(&self) -> usize {
        self.limit
    }

    /// Cache statistics as a `(hits, misses)` tuple.
    pub fn cache_stats(&self) -> (usize, usize) {
        (*self.cache_hits.borrow(), *self.cache_misses.borrow())
    }

    /// Drop every cached prediction and reset the statistics.
    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
        *self.cache_hits.borrow_mut() = 0;
        *self.cache_misses.borrow_mut() = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_engine(corpus: &str, max_order: usize) -> Engine {
        let config = Config {
            max_order,
            ..Config::default()
        };
        Engine::train_from_text(&config, corpus, Granularity::Char).unwrap()
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let config = Config::default();
        assert!(Engine::train_from_text(&config, "   ", Granularity::Char).is_err());
    }

    #[test]
    fn predictions_are_cached_per_prefix() {
        let engine = char_engine("hello hello hello", 3);
        let first = engine.predict("he").unwrap();
        let second = engine.predict("he").unwrap();
        assert_eq!(first, second);
        let (hits, misses) = engine.cache_stats();
        assert_eq!((hits, misses), (1, 1));
    }

    #[test]
    fn learning_invalidates_the_cache() {
        let mut engine = char_engine("ababab", 2);
        engine.predict("a").unwrap();
        engine.learn("aaaaaa").unwrap();
        let (hits, misses) = engine.cache_stats();
        assert_eq!((hits, misses), (0, 0));
        // Fresh counts are visible after the clear.
        let predictions = engine.predict("a").unwrap();
        assert_eq!(predictions[0].0, "a");
    }
}
