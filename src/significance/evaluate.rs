//! One significance evaluation of a method result against the reference set

use crate::errors::Result;
use crate::ontology::bigram_closure;
use crate::significance::stats::{mean, normal_test, p_value};
use crate::significance::trials::{overlap, run_trials, BackgroundCorpus};
use crate::types::ScoreRecord;
use rand::Rng;
use rustc_hash::FxHashSet;
use std::borrow::Cow;
use tracing::{debug, info};

/// Read-only inputs shared by every evaluation of a run
#[derive(Debug, Clone, Default)]
pub struct EvaluationInputs {
    /// Pool random samples are drawn from
    pub corpus: BackgroundCorpus,
    /// Reference terms the method result is compared against
    pub reference: FxHashSet<String>,
}

impl EvaluationInputs {
    pub fn new(corpus: BackgroundCorpus, reference: FxHashSet<String>) -> Self {
        Self { corpus, reference }
    }
}

/// Whether `term` is a two-word phrase
fn is_bigram(term: &str) -> bool {
    term.split_whitespace().count() == 2
}

/// Reference set matching the shape of the method result.
///
/// When the method emits two-word phrases (judged by its first entry, or
/// the first corpus entry for an empty result) the reference is replaced by
/// the two-word orderings of its terms.
pub fn prepare_reference<'r>(
    corpus: &BackgroundCorpus,
    method_result: &[String],
    reference: &'r FxHashSet<String>,
) -> Cow<'r, FxHashSet<String>> {
    let probe = method_result
        .first()
        .map(String::as_str)
        .or_else(|| corpus.first());

    match probe {
        Some(term) if is_bigram(term) => {
            let closure = bigram_closure(reference);
            debug!(
                reference = reference.len(),
                expanded = closure.len(),
                "reference expanded to two-word orderings"
            );
            Cow::Owned(closure)
        }
        _ => Cow::Borrowed(reference),
    }
}

/// Score `method_result` against `reference` with `trial_count` random
/// samples of the same size drawn from `corpus`.
pub fn evaluate<R: Rng + ?Sized>(
    corpus: &BackgroundCorpus,
    method_result: &[String],
    reference: &FxHashSet<String>,
    trial_count: usize,
    label: f64,
    rng: &mut R,
) -> Result<ScoreRecord> {
    let reference = prepare_reference(corpus, method_result, reference);
    let observed_overlap = overlap(method_result, &reference);

    let trial_results = run_trials(corpus, &reference, method_result.len(), trial_count, rng)?;
    let p = p_value(observed_overlap, &trial_results)?;

    if let Some(normality) = normal_test(&trial_results)? {
        debug!(
            label,
            k2 = normality.statistic,
            p = normality.p_value,
            "trial distribution normality"
        );
    }

    let record = ScoreRecord {
        threshold: label,
        p_value: p,
        observed_overlap,
        candidate_size: method_result.len(),
        random_mean: mean(&trial_results),
        random_max: trial_results.iter().copied().max().unwrap_or(0),
    };

    info!(
        threshold = record.threshold,
        p_value = record.p_value,
        observed = record.observed_overlap,
        size = record.candidate_size,
        random_mean = record.random_mean,
        random_max = record.random_max,
        "candidate evaluated"
    );

    Ok(record)
}
