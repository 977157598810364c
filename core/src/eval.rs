// core/src/eval.rs
//
// Perplexity and entropy over held-out text: a pure reduction over the
// distributions the model returns, one line at a time.

use crate::model::PpmModel;
use crate::tokenize::{tokens, Granularity};
use crate::vocab::Vocabulary;
use anyhow::Result;
use tracing::debug;

/// Summary of one evaluation run.
#[derive(Debug, Clone, Copy)]
pub struct EvalReport {
    /// Symbols that received a positive probability.
    pub symbols: usize,
    /// Sum of log10 probabilities over those symbols.
    pub total_log10_prob: f64,
    /// Cross-entropy in bits per symbol.
    pub entropy_bits: f64,
    /// `10^(-total_log10_prob / symbols)`; infinite when nothing was
    /// scored.
    pub perplexity: f64,
}

/// Score held-out text line by line.
///
/// Every non-empty line starts from a fresh root cursor. For each symbol
/// the model's distribution is taken first, then the cursor is advanced:
/// read-only via `observe` by default, or through `train` when `adapt`
/// is set (test-time adaptation: the model keeps learning from the text
/// it scores).
pub fn evaluate(
    model: &mut PpmModel,
    vocab: &Vocabulary,
    text: &str,
    granularity: Granularity,
    adapt: bool,
) -> Result<EvalReport> {
    let mut total_log10_prob = 0.0f64;
    let mut symbols = 0usize;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut cursor = model.create_cursor();
        for token in tokens(line, granularity) {
            let id = vocab.id_or_oov(&token);
            let probs = model.distribution(&cursor)?;
            let prob = probs[id as usize];
            if prob > 0.0 {
                total_log10_prob += prob.log10();
                symbols += 1;
            }
            if adapt {
                model.train(&mut cursor, id)?;
            } else {
                model.observe(&mut cursor, id)?;
            }
        }
    }

    let report = if symbols > 0 {
        let average = total_log10_prob / symbols as f64;
        EvalReport {
            symbols,
            total_log10_prob,
            entropy_bits: -average / 2.0f64.log10(),
            perplexity: 10.0f64.powf(-average),
        }
    } else {
        EvalReport {
            symbols: 0,
            total_log10_prob: 0.0,
            entropy_bits: 0.0,
            perplexity: f64::INFINITY,
        }
    };
    debug!(
        symbols = report.symbols,
        perplexity = report.perplexity,
        entropy_bits = report.entropy_bits,
        adapt,
        "evaluation finished"
    );
    Ok(report)
}
