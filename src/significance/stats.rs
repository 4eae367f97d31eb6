//! Statistics over trial results
//!
//! The p-value treats the trial overlaps as a normal sample and asks how far
//! into the upper tail the observed overlap falls. The D'Agostino-Pearson
//! omnibus test is reported next to it as a diagnostic of that assumption.

use crate::errors::{Result, ValidationError};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Smallest sample the omnibus normality test accepts
pub const NORMALITY_MIN_SAMPLES: usize = 8;

/// Arithmetic mean (NaN for an empty slice)
pub fn mean(values: &[usize]) -> f64 {
    values.iter().sum::<usize>() as f64 / values.len() as f64
}

/// Sample standard deviation with an `n - 1` denominator.
///
/// Fewer than two values have no spread and yield 0.
pub fn sample_std_dev(values: &[usize], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Upper-tail probability `1 - Φ(z)` of the standard normal
pub fn upper_tail(z: f64) -> Result<f64> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ValidationError::statistics(e.to_string()))?;
    Ok(1.0 - normal.cdf(z))
}

/// One-tailed p-value that `observed_overlap` is explained by chance.
///
/// A zero standard deviation (every trial identical) gives `z = 0`.
pub fn p_value(observed_overlap: usize, trial_results: &[usize]) -> Result<f64> {
    if trial_results.is_empty() {
        return Err(ValidationError::statistics("no trial results"));
    }

    let x_bar = mean(trial_results);
    let std_dev = sample_std_dev(trial_results, x_bar);
    let z = if std_dev > 0.0 {
        (observed_overlap as f64 - x_bar) / std_dev
    } else {
        0.0
    };

    upper_tail(z)
}

/// Result of the D'Agostino-Pearson omnibus normality test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalityTest {
    /// K² = Z(skew)² + Z(kurtosis)²
    pub statistic: f64,
    /// Survival function of χ²(2) at K²
    pub p_value: f64,
}

/// Central moments m2, m3, m4 (biased, `1/n`)
fn central_moments(values: &[f64]) -> (f64, f64, f64) {
    let n = values.len() as f64;
    let mu = values.iter().sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &v in values {
        let d = v - mu;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Z-score of the sample skewness
fn skew_z(n: f64, m2: f64, m3: f64) -> f64 {
    let b2 = m3 / m2.powf(1.5);
    let mut y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    if y == 0.0 {
        y = 1.0;
    }
    let ya = y / alpha;
    delta * (ya + (ya * ya + 1.0).sqrt()).ln()
}

/// Z-score of the sample kurtosis
fn kurtosis_z(n: f64, m2: f64, m4: f64) -> f64 {
    let b2 = m4 / (m2 * m2);
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let varb2 =
        24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / varb2.sqrt();
    let sqrtbeta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrtbeta1 * (2.0 / sqrtbeta1 + (1.0 + 4.0 / (sqrtbeta1 * sqrtbeta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    let term2 = if denom == 0.0 {
        f64::NAN
    } else {
        denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).powf(1.0 / 3.0)
    };
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

/// D'Agostino-Pearson omnibus normality test over trial results.
///
/// Returns `None` when there are fewer than [`NORMALITY_MIN_SAMPLES`]
/// values or they have no variance.
pub fn normal_test(values: &[usize]) -> Result<Option<NormalityTest>> {
    if values.len() < NORMALITY_MIN_SAMPLES {
        return Ok(None);
    }

    let values: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    let (m2, m3, m4) = central_moments(&values);
    if m2 <= 0.0 {
        return Ok(None);
    }

    let n = values.len() as f64;
    let zs = skew_z(n, m2, m3);
    let zk = kurtosis_z(n, m2, m4);
    let statistic = zs * zs + zk * zk;

    let chi2 = ChiSquared::new(2.0).map_err(|e| ValidationError::statistics(e.to_string()))?;
    Ok(Some(NormalityTest {
        statistic,
        p_value: 1.0 - chi2.cdf(statistic),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_mean_and_std_dev() {
        let values = [2, 4, 4, 4, 5, 5, 7, 9];
        let m = mean(&values);
        assert_eq!(m, 5.0);
        // Population sd is 2; sample sd is sqrt(32 / 7)
        assert!((sample_std_dev(&values, m) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(sample_std_dev(&[3], 3.0), 0.0);
    }

    #[test]
    fn test_upper_tail() {
        assert!((upper_tail(0.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((upper_tail(1.959_963_984_540_054).unwrap() - 0.025).abs() < 1e-9);
        assert!(upper_tail(-10.0).unwrap() > 0.999_999);
    }

    #[test]
    fn test_p_value_zero_variance() {
        assert!((p_value(10, &[3, 3, 3, 3]).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_p_value_tails() {
        let trials = [0, 1, 1, 2, 1, 0, 1, 2, 1, 1];
        let high = p_value(2, &trials).unwrap();
        let low = p_value(0, &trials).unwrap();
        assert!(high < 0.2, "high {}", high);
        assert!(low > 0.8, "low {}", low);
    }

    #[test]
    fn test_p_value_empty_is_error() {
        assert!(matches!(
            p_value(1, &[]),
            Err(ValidationError::Statistics { .. })
        ));
    }

    #[test]
    fn test_normal_test_small_or_constant() {
        assert!(normal_test(&[1, 2, 3]).unwrap().is_none());
        assert!(normal_test(&[4; 50]).unwrap().is_none());
    }

    #[test]
    fn test_normal_test_distinguishes_shapes() {
        // Binomial(40, 0.5) is close to normal
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let binomial: Vec<usize> = (0..2000)
            .map(|_| (0..40).filter(|_| rng.gen_bool(0.5)).count())
            .collect();
        let near_normal = normal_test(&binomial).unwrap().unwrap();
        assert!(near_normal.p_value > 0.001, "p {}", near_normal.p_value);

        // Heavily skewed: mostly zeros with a long tail
        let skewed: Vec<usize> = (0..2000).map(|i| if i % 10 == 0 { i % 97 } else { 0 }).collect();
        let result = normal_test(&skewed).unwrap().unwrap();
        assert!(result.p_value < 1e-6, "p {}", result.p_value);
        assert!(result.statistic > near_normal.statistic);
    }
}
