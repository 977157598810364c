//! Property tests for the PPM model through the public API.
//!
//! Runs the normalization, invariant and ranking properties under both
//! unseen-symbol policies, since the policy only redirects the residual
//! escape mass and must never break any of them.

use libpredict_core::{evaluate, top_k, Granularity, OovPolicy, PpmModel, Vocabulary};

const POLICIES: [OovPolicy; 2] = [OovPolicy::UniformUnseen, OovPolicy::OovOnly];

fn train_stream(model: &mut PpmModel, stream: &[u32]) {
    let mut cursor = model.create_cursor();
    for &symbol in stream {
        model.train(&mut cursor, symbol).expect("train failed");
        model.check_invariants().expect("invariant violated");
    }
}

#[test]
fn distributions_stay_normalized_under_both_policies() {
    let stream = [0u32, 1, 2, 1, 0, 3, 3, 1, 2, 0, 4, 1];
    for policy in POLICIES {
        let mut model = PpmModel::with_policy(3, 4, policy).expect("construction failed");
        train_stream(&mut model, &stream);

        // Walk a few different contexts and check every distribution.
        let mut cursor = model.create_cursor();
        for &symbol in &[0u32, 1, 2, 4] {
            let probs = model.distribution(&cursor).expect("distribution failed");
            assert_eq!(probs.len(), 5);
            let sum: f64 = probs.iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-9,
                "sum {} under {:?} at order {}",
                sum,
                policy,
                cursor.order()
            );
            assert!(probs.iter().all(|p| p.is_finite() && *p >= 0.0));
            model.observe(&mut cursor, symbol).expect("observe failed");
        }
    }
}

#[test]
fn top_k_is_consistent_with_the_distribution() {
    for policy in POLICIES {
        let mut model = PpmModel::with_policy(2, 3, policy).expect("construction failed");
        train_stream(&mut model, &[0, 1, 2, 0, 1, 0]);

        let cursor = model.create_cursor();
        let probs = model.distribution(&cursor).expect("distribution failed");
        let ranked = top_k(&probs, probs.len());
        assert_eq!(ranked.len(), probs.len());
        for pair in ranked.windows(2) {
            assert!(pair[0].prob >= pair[1].prob);
            if pair[0].prob == pair[1].prob {
                assert!(pair[0].id < pair[1].id);
            }
        }
        // Ranked entries carry the exact probabilities they index.
        for prediction in &ranked {
            assert_eq!(prediction.prob, probs[prediction.id as usize]);
        }
    }
}

#[test]
fn vocabulary_and_evaluation_agree_on_ids() {
    let mut vocab = Vocabulary::new();
    for word in ["the", "cat", "sat"] {
        vocab.add(word);
    }
    for policy in POLICIES {
        let mut model =
            PpmModel::with_policy(2, vocab.len(), policy).expect("construction failed");
        let mut cursor = model.create_cursor();
        for word in ["the", "cat", "sat", "the", "cat"] {
            model
                .train(&mut cursor, vocab.id_or_oov(word))
                .expect("train failed");
        }
        let report = evaluate(&mut model, &vocab, "the cat sat", Granularity::Word, false)
            .expect("evaluation failed");
        assert_eq!(report.symbols, 3);
        assert!(report.perplexity.is_finite());
    }
}
