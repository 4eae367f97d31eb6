//! Monte Carlo significance testing of keyword sets against a reference set.

pub mod evaluate;
pub mod stats;
pub mod trials;

pub use evaluate::{evaluate, prepare_reference, EvaluationInputs};
pub use stats::{mean, normal_test, p_value, sample_std_dev, NormalityTest};
pub use trials::{overlap, run_trials, trial_rng, BackgroundCorpus};
