use anyhow::Result;
use clap::{Parser, Subcommand};
use libpredict::{Config, Engine, Granularity};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "libpredict", about = "Adaptive predictive-text driver")]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train on a corpus and report perplexity/entropy of held-out text.
    Eval {
        /// Longest context the model conditions on.
        #[arg(long)]
        order: Option<usize>,
        /// Training corpus.
        train: PathBuf,
        /// Held-out text to score.
        test: PathBuf,
        /// Split on whitespace instead of characters.
        #[arg(long)]
        words: bool,
        /// Keep training while scoring (test-time adaptation).
        #[arg(long)]
        adapt: bool,
    },
    /// Train on a corpus and print the top continuations of a prefix.
    Predict {
        #[arg(long)]
        order: Option<usize>,
        /// Training corpus.
        train: PathBuf,
        /// Prefix to extend.
        #[arg(long)]
        prefix: String,
        /// Number of predictions to print.
        #[arg(short = 'k', long)]
        count: Option<usize>,
        #[arg(long)]
        words: bool,
    },
    /// Read prefixes from stdin and print ranked continuations.
    Interactive {
        #[arg(long)]
        order: Option<usize>,
        /// Training corpus.
        train: PathBuf,
        #[arg(short = 'k', long)]
        count: Option<usize>,
        #[arg(long)]
        words: bool,
        /// Feed each typed line back into the model.
        #[arg(long)]
        learn: bool,
    },
}

fn granularity_for(words: bool) -> Granularity {
    if words {
        Granularity::Word
    } else {
        Granularity::Char
    }
}

fn build_engine(
    config: &mut Config,
    order: Option<usize>,
    count: Option<usize>,
    train: &PathBuf,
    words: bool,
) -> Result<Engine> {
    if let Some(order) = order {
        config.max_order = order;
    }
    if let Some(count) = count {
        config.prediction_limit = count;
    }
    let corpus = std::fs::read_to_string(train)?;
    let start = Instant::now();
    let engine = Engine::train_from_text(config, &corpus, granularity_for(words))?;
    println!(
        "trained on '{}': {} symbols, {} nodes, order {} ({:.2?})",
        train.display(),
        engine.vocab_len(),
        engine.node_count(),
        config.max_order,
        start.elapsed()
    );
    Ok(engine)
}

fn print_predictions(predictions: &[(String, f64)]) {
    for (text, prob) in predictions {
        println!("  {:<10} {:.6}", format!("{:?}", text), prob);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::load_toml(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Eval {
            order,
            train,
            test,
            words,
            adapt,
        } => {
            let mut engine = build_engine(&mut config, order, None, &train, words)?;
            let held_out = std::fs::read_to_string(&test)?;
            let start = Instant::now();
            let report = engine.evaluate(&held_out, adapt)?;
            println!(
                "Results: numSymbols = {}, ppl = {}, entropy = {} bits/{}",
                report.symbols,
                report.perplexity,
                report.entropy_bits,
                if words { "word" } else { "char" }
            );
            println!("scored '{}' in {:.2?}", test.display(), start.elapsed());
        }
        Command::Predict {
            order,
            train,
            prefix,
            count,
            words,
        } => {
            let engine = build_engine(&mut config, order, count, &train, words)?;
            let predictions = engine.predict(&prefix)?;
            println!(
                "Top {} predictions for {:?}:",
                predictions.len(),
                prefix
            );
            print_predictions(&predictions);
        }
        Command::Interactive {
            order,
            train,
            count,
            words,
            learn,
        } => {
            let mut engine = build_engine(&mut config, order, count, &train, words)?;
            println!("type a prefix per line (empty line or ctrl-d quits):");
            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush()?;
                let mut line = String::new();
                if stdin.lock().read_line(&mut line)? == 0 {
                    break;
                }
                let line = line.trim_end_matches(['\n', '\r']);
                if line.is_empty() {
                    break;
                }
                let predictions = engine.predict(line)?;
                print_predictions(&predictions);
                if learn {
                    engine.learn(line)?;
                }
            }
        }
    }
    Ok(())
}
