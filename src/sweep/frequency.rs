//! Term frequency tables and the per-term statistics the sweep selects on
//!
//! A table starts with a header line whose fifth whitespace field is the
//! corpus token count. Every following row ends with the term's count; the
//! fields before it, joined by single spaces, are the term.

use crate::errors::{Result, ValidationError};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Whitespace field of the header line holding the token count
const HEADER_TOKEN_FIELD: usize = 4;

// ============================================================================
// Frequency Table
// ============================================================================

/// Term counts of one corpus, in file order
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    token_count: u64,
    entries: Vec<(String, u64)>,
    index: FxHashMap<String, usize>,
}

impl FrequencyTable {
    /// Create an empty table for a corpus of `token_count` tokens
    pub fn new(token_count: u64) -> Self {
        Self {
            token_count,
            ..Default::default()
        }
    }

    /// Parse a table with its header line.
    ///
    /// Blank rows are skipped. A repeated term keeps its position and takes
    /// the later count.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| ValidationError::format(1, "missing header line"))?;
        let token_count = parse_token_count(header)?;

        let mut table = Self::new(token_count);
        for (idx, line) in lines.enumerate() {
            let line_no = idx + 2;
            let fields: Vec<&str> = line.split_whitespace().collect();
            let Some((count, term)) = fields.split_last() else {
                continue;
            };
            if term.is_empty() {
                return Err(ValidationError::format(
                    line_no,
                    "expected a term followed by a count",
                ));
            }
            let count: u64 = count.parse().map_err(|_| {
                ValidationError::format(line_no, format!("invalid count '{}'", count))
            })?;
            table.insert(&term.join(" "), count);
        }

        Ok(table)
    }

    /// Set the count of a term
    pub fn insert(&mut self, term: &str, count: u64) {
        match self.index.get(term) {
            Some(&pos) => self.entries[pos].1 = count,
            None => {
                self.index.insert(term.to_string(), self.entries.len());
                self.entries.push((term.to_string(), count));
            }
        }
    }

    /// Keep only terms counted strictly more than `min_count` times
    pub fn retain_above(&mut self, min_count: u64) {
        self.entries.retain(|(_, count)| *count > min_count);
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, (term, _))| (term.clone(), pos))
            .collect();
    }

    /// Tokens in the corpus the table was counted over
    pub fn token_count(&self) -> u64 {
        self.token_count
    }

    /// Count of a term, if listed
    pub fn get(&self, term: &str) -> Option<u64> {
        self.index.get(term).map(|&pos| self.entries[pos].1)
    }

    /// Terms and counts in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(term, count)| (term.as_str(), *count))
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table lists no terms
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_token_count(header: &str) -> Result<u64> {
    let field = header
        .split_whitespace()
        .nth(HEADER_TOKEN_FIELD)
        .ok_or_else(|| ValidationError::format(1, "header has no token count field"))?;
    let token_count: u64 = field
        .parse()
        .map_err(|_| ValidationError::format(1, format!("invalid token count '{}'", field)))?;
    if token_count == 0 {
        return Err(ValidationError::format(1, "token count must be > 0"));
    }
    Ok(token_count)
}

// ============================================================================
// Term Statistics
// ============================================================================

/// Selection statistics for one domain-specific term
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermScore {
    pub term: String,
    /// Count in the domain-specific table
    pub frequency: u64,
    /// Specific-to-general frequency ratio, `None` when not computed
    pub weirdness: Option<f64>,
    pub frequency_z: Option<f64>,
    pub weirdness_z: Option<f64>,
}

impl TermScore {
    /// Both z-scores, when both could be computed
    pub fn z_scores(&self) -> Option<(f64, f64)> {
        Some((self.frequency_z?, self.weirdness_z?))
    }
}

/// Statistics computed once per sweep over the retained domain terms
#[derive(Debug, Clone, Default, Serialize)]
pub struct TermStatistics {
    pub scores: Vec<TermScore>,
    pub frequency_mean: f64,
    pub frequency_std_dev: f64,
    pub weirdness_mean: f64,
    pub weirdness_std_dev: f64,
}

impl TermStatistics {
    /// Score every term of `specific` against `general`.
    ///
    /// Weirdness is computed for terms listed in both tables; with
    /// `include_unshared` a term missing from `general` counts as 0 there.
    pub fn compute(specific: &FrequencyTable, general: &FrequencyTable, include_unshared: bool) -> Self {
        let spec_tokens = specific.token_count() as f64;
        let gen_tokens = general.token_count() as f64;

        let mut scores: Vec<TermScore> = specific
            .iter()
            .map(|(term, frequency)| {
                let general_freq = match general.get(term) {
                    Some(count) => Some(count),
                    None if include_unshared => Some(0),
                    None => None,
                };
                let weirdness = general_freq.map(|g| {
                    frequency as f64 * gen_tokens / ((g as f64 + 1.0) * spec_tokens)
                });
                TermScore {
                    term: term.to_string(),
                    frequency,
                    weirdness,
                    frequency_z: None,
                    weirdness_z: None,
                }
            })
            .collect();

        let frequencies: Vec<f64> = scores.iter().map(|s| s.frequency as f64).collect();
        let weirdness: Vec<f64> = scores.iter().filter_map(|s| s.weirdness).collect();
        let (frequency_mean, frequency_std_dev) = mean_std_dev(&frequencies);
        let (weirdness_mean, weirdness_std_dev) = mean_std_dev(&weirdness);

        for score in &mut scores {
            score.frequency_z = z_score(score.frequency as f64, frequency_mean, frequency_std_dev);
            score.weirdness_z = score
                .weirdness
                .and_then(|w| z_score(w, weirdness_mean, weirdness_std_dev));
        }

        Self {
            scores,
            frequency_mean,
            frequency_std_dev,
            weirdness_mean,
            weirdness_std_dev,
        }
    }

    /// Number of scored terms
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Check if there are no terms
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Mean and `n - 1` standard deviation; 0 spread below two values
fn mean_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

fn z_score(value: f64, mean: f64, std_dev: f64) -> Option<f64> {
    if std_dev > 0.0 {
        let z = (value - mean) / std_dev;
        z.is_finite().then_some(z)
    } else {
        None
    }
}
