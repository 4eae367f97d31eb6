//! Lazy candidate keyword sets for the two sweep policies

use crate::sweep::frequency::TermStatistics;
use crate::types::{Candidate, SweepPolicy};

/// Threshold scan: each step keeps terms whose frequency and weirdness
/// z-scores both exceed the step's threshold
#[derive(Debug, Clone)]
pub struct ThresholdScan<'a> {
    stats: &'a TermStatistics,
    start: f64,
    end: f64,
    step: f64,
    next: usize,
}

impl<'a> ThresholdScan<'a> {
    pub fn new(stats: &'a TermStatistics, start: f64, end: f64, step: f64) -> Self {
        Self {
            stats,
            start,
            end,
            step,
            next: 0,
        }
    }
}

impl Iterator for ThresholdScan<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        if self.step <= 0.0 {
            return None;
        }
        let threshold = self.start + self.next as f64 * self.step;
        if threshold >= self.end {
            return None;
        }
        self.next += 1;

        let keywords = self
            .stats
            .scores
            .iter()
            .filter(|s| matches!(s.z_scores(), Some((fz, wz)) if fz > threshold && wz > threshold))
            .map(|s| s.term.clone())
            .collect();

        Some(Candidate::new(keywords, threshold))
    }
}

/// Cumulative top-N: step `n` yields the `n` terms with the highest
/// weirdness z-score
#[derive(Debug, Clone)]
pub struct TopN<'a> {
    ranked: Vec<&'a str>,
    next: usize,
    max: usize,
}

impl<'a> TopN<'a> {
    /// Rank scoreable terms by weirdness z-score, highest first.
    ///
    /// Ties keep table order. Sizes beyond the number of ranked terms are
    /// never yielded.
    pub fn new(stats: &'a TermStatistics, min: usize, max: usize) -> Self {
        let mut scored: Vec<(&'a str, f64)> = stats
            .scores
            .iter()
            .filter_map(|s| s.weirdness_z.map(|z| (s.term.as_str(), z)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        Self {
            ranked: scored.into_iter().map(|(term, _)| term).collect(),
            next: min,
            max,
        }
    }

    /// Terms in rank order
    pub fn ranked(&self) -> &[&'a str] {
        &self.ranked
    }
}

impl Iterator for TopN<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        let n = self.next;
        if n > self.max || n > self.ranked.len() {
            return None;
        }
        self.next += 1;

        let keywords = self.ranked[..n].iter().map(|t| t.to_string()).collect();
        Some(Candidate::new(keywords, n as f64))
    }
}

/// Candidate sequence for a sweep policy
pub fn candidates<'a>(
    stats: &'a TermStatistics,
    policy: &SweepPolicy,
) -> Box<dyn Iterator<Item = Candidate> + Send + 'a> {
    match *policy {
        SweepPolicy::ThresholdScan { start, end, step } => {
            Box::new(ThresholdScan::new(stats, start, end, step))
        }
        SweepPolicy::TopN { min, max } => Box::new(TopN::new(stats, min, max)),
    }
}
