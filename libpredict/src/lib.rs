//! libpredict
//!
//! Predictive text entry on top of the adaptive PPM engine in
//! `libpredict-core`: train on a corpus, then ask for ranked
//! continuations of a prefix, score held-out text, or keep learning from
//! whatever the user types.

pub mod engine;
pub use engine::{Engine, OOV_MARKER};

pub use libpredict_core::{Config, EvalReport, Granularity, OovPolicy};
