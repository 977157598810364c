//! Adaptive PPM model: incremental training plus escape-based estimation.
//!
//! Training records each incoming symbol at every context order along the
//! cursor's suffix chain, growing the trie where a context is seen for
//! the first time. Prediction blends the counts of the current order with
//! recursively escaped mass from shorter orders into one normalized
//! distribution over the vocabulary plus a reserved OOV slot.

use crate::candidate::{top_k, Prediction};
use crate::tree::{ContextCursor, ContextTree};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Policy for the residual escape mass left over at order 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OovPolicy {
    /// Share the residual uniformly among every id that received no
    /// probability at any order, the OOV slot included.
    #[default]
    UniformUnseen,
    /// Give the residual to the OOV slot alone; ids never observed
    /// anywhere keep probability 0.
    OovOnly,
}

/// An adaptive context model over dense symbol ids `0..vocab_size`, with
/// `vocab_size` itself reserved for out-of-vocabulary symbols.
///
/// The model only ever grows: every `train` call permanently updates the
/// counts it walks past. `observe` moves a cursor without training, so
/// held-out text can be scored without contaminating the counts.
///
/// There is no internal synchronization: training needs `&mut self`,
/// while `observe`, `distribution` and `predict_top_k` borrow shared and
/// may run concurrently with each other. Cursors belong to the tree that
/// created them and are not meant to be shared between callers.
#[derive(Debug)]
pub struct PpmModel {
    tree: ContextTree,
    vocab_size: usize,
    policy: OovPolicy,
}

impl PpmModel {
    /// Create an untrained model.
    ///
    /// # Errors
    /// Rejects a non-positive vocabulary size.
    pub fn new(max_order: usize, vocab_size: usize) -> Result<Self> {
        ensure!(
            vocab_size > 0,
            "vocabulary size must be positive, got {}",
            vocab_size
        );
        debug!(max_order, vocab_size, "created ppm model");
        Ok(Self {
            tree: ContextTree::new(max_order),
            vocab_size,
            policy: OovPolicy::default(),
        })
    }

    /// Create an untrained model with an explicit unseen-symbol policy.
    pub fn with_policy(max_order: usize, vocab_size: usize, policy: OovPolicy) -> Result<Self> {
        let mut model = Self::new(max_order, vocab_size)?;
        model.policy = policy;
        Ok(model)
    }

    pub fn max_order(&self) -> usize {
        self.tree.max_order()
    }

    /// Number of registered symbol ids (the OOV slot excluded).
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// The reserved out-of-vocabulary id, one past the last registered id.
    pub fn oov_id(&self) -> u32 {
        self.vocab_size as u32
    }

    pub fn policy(&self) -> OovPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: OovPolicy) {
        self.policy = policy;
    }

    /// Number of context nodes currently in the trie.
    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    /// A cursor at the empty context.
    pub fn create_cursor(&self) -> ContextCursor {
        self.tree.create_cursor()
    }

    fn check_symbol(&self, symbol: u32) -> Result<()> {
        ensure!(
            (symbol as usize) <= self.vocab_size,
            "symbol id {} outside vocabulary of {} symbols plus OOV",
            symbol,
            self.vocab_size
        );
        Ok(())
    }

    /// Record `symbol` as the continuation of the cursor's context at
    /// every order down to the root, then advance the cursor.
    pub fn train(&mut self, cursor: &mut ContextCursor, symbol: u32) -> Result<()> {
        self.check_symbol(symbol)?;
        self.tree.check_cursor(cursor)?;
        self.tree.train_symbol(cursor, symbol);
        Ok(())
    }

    /// Advance the cursor exactly as `train` would, without mutating any
    /// counts. Used to position a cursor on a prefix before prediction,
    /// or to score held-out text without training on it.
    pub fn observe(&self, cursor: &mut ContextCursor, symbol: u32) -> Result<()> {
        self.check_symbol(symbol)?;
        self.tree.check_cursor(cursor)?;
        self.tree.observe_symbol(cursor, symbol);
        Ok(())
    }

    /// Full probability distribution over `vocab_size + 1` slots for the
    /// cursor's context; the final slot is OOV.
    ///
    /// Escape blending runs highest order first: at each node along the
    /// suffix chain an escape mass of `distinct / (total + distinct)` is
    /// reserved and the rest distributed over the node's children in
    /// proportion to their counts. Symbols that already received mass at
    /// a longer context are excluded from both the counts and the payout
    /// of every shorter one. Whatever escapes past the root is spent
    /// according to the configured [`OovPolicy`]; the final slot of that
    /// payout takes the exact remainder, so the vector always sums to 1.
    pub fn distribution(&self, cursor: &ContextCursor) -> Result<Vec<f64>> {
        self.tree.check_cursor(cursor)?;
        let slots = self.vocab_size + 1;
        let mut probs = vec![0.0f64; slots];
        let mut assigned = vec![false; slots];
        let mut mass = 1.0f64;
        let mut node = cursor.node_index();
        loop {
            let mut total = 0u64;
            let mut distinct = 0usize;
            for (symbol, count) in self.tree.child_counts(node) {
                if !assigned[symbol as usize] {
                    total += u64::from(count);
                    distinct += 1;
                }
            }
            if distinct > 0 {
                let denom = total as f64 + distinct as f64;
                for (symbol, count) in self.tree.child_counts(node) {
                    if !assigned[symbol as usize] {
                        probs[symbol as usize] += mass * f64::from(count) / denom;
                    }
                }
                // Exclusion kicks in from the next (shorter) order on.
                for (symbol, _) in self.tree.child_counts(node) {
                    assigned[symbol as usize] = true;
                }
                mass *= distinct as f64 / denom;
            }
            if self.tree.is_root(node) {
                break;
            }
            node = self.tree.suffix_of(node);
        }

        match self.policy {
            OovPolicy::OovOnly => probs[self.vocab_size] += mass,
            OovPolicy::UniformUnseen => {
                let unseen: Vec<usize> = (0..slots).filter(|&slot| !assigned[slot]).collect();
                match unseen.split_last() {
                    // Every id already carries mass somewhere; the OOV
                    // slot absorbs the remainder.
                    None => probs[self.vocab_size] += mass,
                    Some((&last, rest)) => {
                        let share = mass / unseen.len() as f64;
                        for &slot in rest {
                            probs[slot] += share;
                            mass -= share;
                        }
                        probs[last] += mass;
                    }
                }
            }
        }
        Ok(probs)
    }

    /// Convenience wrapper: the `k` most probable continuations of the
    /// cursor's context, ties broken by ascending id.
    pub fn predict_top_k(&self, cursor: &ContextCursor, k: usize) -> Result<Vec<Prediction>> {
        Ok(top_k(&self.distribution(cursor)?, k))
    }

    /// Verify the trie invariants; see [`ContextTree::check_invariants`].
    pub fn check_invariants(&self) -> Result<()> {
        self.tree.check_invariants()
    }
}
