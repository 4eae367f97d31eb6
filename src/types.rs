//! Core types for ontoval
//!
//! This module defines the records that flow between the significance tester
//! and the parameter sweep, plus the configuration for every stage.

use crate::errors::{Result, ValidationError};
use serde::{Deserialize, Serialize};

// ============================================================================
// Candidate & Score Record
// ============================================================================

/// One keyword set produced by a sweep, tagged with the parameter value that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The selected keywords, in selection order
    pub keywords: Vec<String>,
    /// The threshold (or top-N size) that produced this set
    pub threshold: f64,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(keywords: Vec<String>, threshold: f64) -> Self {
        Self {
            keywords,
            threshold,
        }
    }

    /// Number of keywords in the candidate
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Check if the candidate selected nothing
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Outcome of one significance evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Label of the evaluated set (the sweep threshold)
    pub threshold: f64,
    /// One-tailed p-value of the observed overlap
    pub p_value: f64,
    /// Method terms that occur in the reference set
    pub observed_overlap: usize,
    /// Size of the evaluated method result
    pub candidate_size: usize,
    /// Mean overlap over the random trials
    pub random_mean: f64,
    /// Largest overlap seen in any random trial
    pub random_max: usize,
}

impl ScoreRecord {
    /// Order records by threshold ascending.
    ///
    /// Uses a total order so NaN labels cannot poison the sort.
    pub fn cmp_threshold(&self, other: &Self) -> std::cmp::Ordering {
        self.threshold.total_cmp(&other.threshold)
    }
}

// ============================================================================
// Text Encoding
// ============================================================================

/// Encodings accepted for term lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value
    Latin1,
}

impl std::str::FromStr for TextEncoding {
    type Err = ValidationError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            other => Err(ValidationError::invalid_config(format!(
                "unknown encoding '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Analysis Configuration
// ============================================================================

/// Configuration for the component similarity analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// A component is accepted as a structural match when its RMSD is below this
    pub rmsd_tolerance: f64,
    /// Longest word permutation generated for multi-word ontology terms
    pub max_permutation_len: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rmsd_tolerance: 2.0,
            max_permutation_len: 4,
        }
    }
}

impl AnalysisConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rmsd_tolerance.is_nan() || self.rmsd_tolerance <= 0.0 {
            return Err(ValidationError::invalid_config(format!(
                "rmsd_tolerance must be > 0, got {}",
                self.rmsd_tolerance
            )));
        }

        if self.max_permutation_len < 2 {
            return Err(ValidationError::invalid_config(
                "max_permutation_len must be >= 2",
            ));
        }

        Ok(())
    }

    /// Builder method: set RMSD acceptance tolerance
    pub fn with_rmsd_tolerance(mut self, tolerance: f64) -> Self {
        self.rmsd_tolerance = tolerance;
        self
    }

    /// Builder method: set the longest generated permutation
    pub fn with_max_permutation_len(mut self, len: usize) -> Self {
        self.max_permutation_len = len;
        self
    }
}

// ============================================================================
// Significance Configuration
// ============================================================================

/// Configuration for the Monte Carlo significance test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Number of random trials per evaluation
    pub trials: usize,
    /// Seed for reproducible sampling (`None` draws from OS entropy)
    pub seed: Option<u64>,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            seed: None,
        }
    }
}

impl SignificanceConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.trials < 2 {
            return Err(ValidationError::invalid_config(format!(
                "trials must be >= 2, got {}",
                self.trials
            )));
        }
        Ok(())
    }

    /// Builder method: set trial count
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Builder method: set RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

// ============================================================================
// Sweep Configuration
// ============================================================================

/// Most thresholds a single scan may generate
pub const MAX_SCAN_STEPS: f64 = 100_000.0;

/// How the sweep turns term statistics into candidate keyword sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepPolicy {
    /// Keep terms whose frequency and weirdness z-scores both exceed the
    /// threshold, for thresholds `start, start + step, ...` below `end`
    ThresholdScan { start: f64, end: f64, step: f64 },
    /// Keep the `n` weirdest terms, for `n` in `min..=max`
    TopN { min: usize, max: usize },
}

impl Default for SweepPolicy {
    fn default() -> Self {
        SweepPolicy::ThresholdScan {
            start: 0.0,
            end: 10.0,
            step: 1.0,
        }
    }
}

impl SweepPolicy {
    /// Validate policy bounds
    pub fn validate(&self) -> Result<()> {
        match *self {
            SweepPolicy::ThresholdScan { start, end, step } => {
                if !start.is_finite() || !end.is_finite() {
                    return Err(ValidationError::invalid_config(
                        "threshold bounds must be finite",
                    ));
                }
                if step.is_nan() || step <= 0.0 {
                    return Err(ValidationError::invalid_config(format!(
                        "threshold step must be > 0, got {}",
                        step
                    )));
                }
                if end < start {
                    return Err(ValidationError::invalid_config(
                        "threshold end must be >= start",
                    ));
                }
                let steps = ((end - start) / step).ceil();
                if !steps.is_finite() || steps > MAX_SCAN_STEPS {
                    return Err(ValidationError::invalid_config(format!(
                        "threshold scan would generate {} candidates, limit is {}",
                        steps, MAX_SCAN_STEPS
                    )));
                }
            }
            SweepPolicy::TopN { min, max } => {
                if max < min {
                    return Err(ValidationError::invalid_config("top-n max must be >= min"));
                }
            }
        }
        Ok(())
    }
}

/// Configuration for the parameter sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Candidate generation policy
    pub policy: SweepPolicy,
    /// Domain-specific terms must occur more often than this
    pub min_specific_freq: u64,
    /// Size of the worker pool
    pub workers: usize,
    /// Significance settings applied to every candidate
    pub significance: SignificanceConfig,
    /// Also score domain terms that never occur in the general table
    pub include_unshared: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            policy: SweepPolicy::default(),
            min_specific_freq: 100,
            workers: 8,
            significance: SignificanceConfig::default(),
            include_unshared: false,
        }
    }
}

impl SweepConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ValidationError::invalid_config("workers must be > 0"));
        }
        self.policy.validate()?;
        self.significance.validate()
    }

    /// Builder method: set candidate policy
    pub fn with_policy(mut self, policy: SweepPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder method: set minimum domain-specific frequency
    pub fn with_min_specific_freq(mut self, freq: u64) -> Self {
        self.min_specific_freq = freq;
        self
    }

    /// Builder method: set worker pool size
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Builder method: set significance settings
    pub fn with_significance(mut self, significance: SignificanceConfig) -> Self {
        self.significance = significance;
        self
    }

    /// Builder method: score terms missing from the general table
    pub fn with_include_unshared(mut self, include: bool) -> Self {
        self.include_unshared = include;
        self
    }
}

// ============================================================================
// Run Configuration
// ============================================================================

/// All stage configurations, as read from a JSON config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub analysis: AnalysisConfig,
    pub significance: SignificanceConfig,
    pub sweep: SweepConfig,
}

impl RunConfig {
    /// Parse a config from JSON text and validate every section
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        self.significance.validate()?;
        self.sweep.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());
        assert!(SignificanceConfig::default().validate().is_ok());
        assert!(SweepConfig::default().validate().is_ok());
        assert_eq!(SweepConfig::default().workers, 8);
        assert_eq!(AnalysisConfig::default().rmsd_tolerance, 2.0);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(AnalysisConfig::new().with_rmsd_tolerance(0.0).validate().is_err());
        assert!(AnalysisConfig::new().with_max_permutation_len(1).validate().is_err());
        assert!(SignificanceConfig::new().with_trials(1).validate().is_err());
        assert!(SweepConfig::new().with_workers(0).validate().is_err());

        let bad_step = SweepConfig::new().with_policy(SweepPolicy::ThresholdScan {
            start: 0.0,
            end: 5.0,
            step: 0.0,
        });
        assert!(bad_step.validate().is_err());

        let bad_range = SweepConfig::new().with_policy(SweepPolicy::TopN { min: 10, max: 2 });
        assert!(bad_range.validate().is_err());
    }

    #[test]
    fn test_scan_step_count_limited() {
        let tiny_step = SweepPolicy::ThresholdScan {
            start: 0.0,
            end: 10.0,
            step: 1e-9,
        };
        assert!(matches!(
            tiny_step.validate(),
            Err(ValidationError::InvalidConfig { .. })
        ));

        let wide = SweepPolicy::ThresholdScan {
            start: -1e300,
            end: 1e300,
            step: 1.0,
        };
        assert!(wide.validate().is_err());

        let fine = SweepPolicy::ThresholdScan {
            start: 0.0,
            end: 100.0,
            step: 0.01,
        };
        assert!(fine.validate().is_ok());
    }

    #[test]
    fn test_run_config_from_json() {
        let json = r#"{
            "analysis": { "rmsd_tolerance": 1.5 },
            "sweep": {
                "policy": { "kind": "top_n", "min": 1, "max": 400 },
                "workers": 4
            }
        }"#;
        let config = RunConfig::from_json(json).unwrap();
        assert_eq!(config.analysis.rmsd_tolerance, 1.5);
        assert_eq!(config.analysis.max_permutation_len, 4);
        assert_eq!(config.sweep.policy, SweepPolicy::TopN { min: 1, max: 400 });
        assert_eq!(config.sweep.workers, 4);
        assert_eq!(config.sweep.min_specific_freq, 100);
        assert_eq!(config.significance.trials, 10_000);
    }

    #[test]
    fn test_run_config_rejects_invalid_section() {
        let json = r#"{ "significance": { "trials": 0 } }"#;
        assert!(matches!(
            RunConfig::from_json(json),
            Err(ValidationError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_text_encoding_from_str() {
        assert_eq!("ISO-8859-1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert_eq!("utf8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert!("ebcdic".parse::<TextEncoding>().is_err());
    }

    #[test]
    fn test_score_record_ordering() {
        let record = |threshold| ScoreRecord {
            threshold,
            p_value: 0.5,
            observed_overlap: 0,
            candidate_size: 0,
            random_mean: 0.0,
            random_max: 0,
        };
        let mut records = vec![record(3.0), record(-1.0), record(2.5)];
        records.sort_by(ScoreRecord::cmp_threshold);
        let thresholds: Vec<f64> = records.iter().map(|r| r.threshold).collect();
        assert_eq!(thresholds, vec![-1.0, 2.5, 3.0]);
    }
}
