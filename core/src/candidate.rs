//! Ranked next-symbol predictions.

/// One prediction: a symbol id (possibly the reserved OOV id) and its
/// probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub id: u32,
    pub prob: f64,
}

/// Select the `k` most probable entries of a distribution.
///
/// Ordered by non-increasing probability; equal probabilities are broken
/// by ascending id so results are reproducible. Returns at most
/// `min(k, probs.len())` entries.
pub fn top_k(probs: &[f64], k: usize) -> Vec<Prediction> {
    let mut ranked: Vec<Prediction> = probs
        .iter()
        .enumerate()
        .map(|(id, &prob)| Prediction {
            id: id as u32,
            prob,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.prob
            .partial_cmp(&a.prob)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked.truncate(k);
    ranked
}
