//! Monte Carlo overlap trials
//!
//! A trial draws a random set of distinct terms from the background corpus
//! and counts how many of them occur in the reference set. Terms are drawn
//! from the corpus list with replacement until enough distinct ones are
//! collected, so a term listed several times is proportionally more likely.

use crate::errors::{Result, ValidationError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;

/// The pool random samples are drawn from
#[derive(Debug, Clone, Default)]
pub struct BackgroundCorpus {
    entries: Vec<String>,
    distinct: usize,
}

impl BackgroundCorpus {
    /// Create a corpus from its entries (repeats allowed)
    pub fn new(entries: Vec<String>) -> Self {
        let distinct = entries
            .iter()
            .map(String::as_str)
            .collect::<FxHashSet<_>>()
            .len();
        Self { entries, distinct }
    }

    /// All entries in input order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// First entry, if any
    pub fn first(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    /// Number of entries, repeats included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the corpus is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct entries
    pub fn distinct_len(&self) -> usize {
        self.distinct
    }

    /// Fail unless `sample_size` distinct entries can be drawn
    pub fn check_sample_size(&self, sample_size: usize) -> Result<()> {
        if self.distinct < sample_size {
            return Err(ValidationError::insufficient_corpus(
                self.distinct,
                sample_size,
            ));
        }
        Ok(())
    }

    /// Draw `sample_size` distinct entries.
    ///
    /// Callers must have checked the size with [`check_sample_size`](Self::check_sample_size).
    pub fn draw<R: Rng + ?Sized>(&self, sample_size: usize, rng: &mut R) -> FxHashSet<&str> {
        let mut sample =
            FxHashSet::with_capacity_and_hasher(sample_size, Default::default());
        while sample.len() < sample_size {
            let idx = rng.gen_range(0..self.entries.len());
            sample.insert(self.entries[idx].as_str());
        }
        sample
    }
}

/// Number of distinct `elements` that occur in `reference`
pub fn overlap<S: AsRef<str>>(
    elements: impl IntoIterator<Item = S>,
    reference: &FxHashSet<String>,
) -> usize {
    let mut seen = FxHashSet::default();
    for element in elements {
        let element = element.as_ref();
        if reference.contains(element) && !seen.contains(element) {
            seen.insert(element.to_string());
        }
    }
    seen.len()
}

/// Run `trial_count` independent trials and return each trial's overlap.
///
/// Fails before drawing anything when the corpus has fewer than
/// `sample_size` distinct entries.
pub fn run_trials<R: Rng + ?Sized>(
    corpus: &BackgroundCorpus,
    reference: &FxHashSet<String>,
    sample_size: usize,
    trial_count: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    corpus.check_sample_size(sample_size)?;

    let results = (0..trial_count)
        .map(|_| {
            corpus
                .draw(sample_size, rng)
                .into_iter()
                .filter(|term| reference.contains(*term))
                .count()
        })
        .collect();

    Ok(results)
}

/// RNG for one evaluation: seeded when a seed is given, else from OS entropy
pub fn trial_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(items: &[&str]) -> BackgroundCorpus {
        BackgroundCorpus::new(items.iter().map(|s| s.to_string()).collect())
    }

    fn set(items: &[&str]) -> FxHashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_distinct_len_ignores_repeats() {
        let c = corpus(&["a", "b", "a", "c", "b"]);
        assert_eq!(c.len(), 5);
        assert_eq!(c.distinct_len(), 3);
        assert_eq!(c.first(), Some("a"));
    }

    #[test]
    fn test_draw_is_distinct() {
        let c = corpus(&["a", "b", "a", "c", "b", "d"]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let sample = c.draw(4, &mut rng);
            assert_eq!(sample.len(), 4);
        }
    }

    #[test]
    fn test_insufficient_corpus() {
        let c = corpus(&["a", "a", "b"]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = run_trials(&c, &set(&["a"]), 3, 10, &mut rng).unwrap_err();
        assert_eq!(err, ValidationError::insufficient_corpus(2, 3));
    }

    #[test]
    fn test_full_sample_always_hits_everything() {
        let c = corpus(&["a", "b", "c"]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let results = run_trials(&c, &set(&["a", "c", "z"]), 3, 20, &mut rng).unwrap();
        assert_eq!(results.len(), 20);
        assert!(results.iter().all(|&r| r == 2));
    }

    #[test]
    fn test_trial_mean_converges_to_hypergeometric_mean() {
        let c = corpus(&["a", "b", "c", "d"]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let results = run_trials(&c, &set(&["a", "b"]), 2, 20_000, &mut rng).unwrap();
        let mean = results.iter().sum::<usize>() as f64 / results.len() as f64;
        assert!((mean - 1.0).abs() < 0.05, "mean {}", mean);
        assert!(results.iter().all(|&r| r <= 2));
    }

    #[test]
    fn test_overlap_counts_distinct() {
        let reference = set(&["a", "b"]);
        assert_eq!(overlap(["a", "a", "b", "q"], &reference), 2);
        assert_eq!(overlap(Vec::<String>::new(), &reference), 0);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let c = corpus(&["a", "b", "c", "d", "e", "f"]);
        let reference = set(&["a", "c", "e"]);
        let first = run_trials(&c, &reference, 3, 100, &mut trial_rng(Some(9))).unwrap();
        let second = run_trials(&c, &reference, 3, 100, &mut trial_rng(Some(9))).unwrap();
        assert_eq!(first, second);
    }
}
