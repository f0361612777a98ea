//! Comparative inference: Welch's two-sample t-test and Cohen's d
//!
//! Sample A is the reference group in every difference: a positive
//! `mean_difference` or effect size means A is larger.
//!
//! # Example
//! ```
//! use snowshoe::inference::compare_samples;
//!
//! let male = [1000.0, 1200.0, 1100.0];
//! let female = [900.0, 950.0, 1000.0];
//!
//! let result = compare_samples(&male, &female).unwrap();
//! assert_eq!(result.mean_difference, 150.0);
//! assert!(result.effect_size > 0.8); // large
//! ```

use crate::error::{AnalysisError, Result};
use crate::stats::{student_t_two_sided_p, SampleSummary};
use serde::Serialize;
use std::fmt;

/// Conventional magnitude bands for |d|
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Classify an effect size: |d| < 0.2, < 0.5, < 0.8, otherwise large
    pub fn classify(effect_size: f64) -> Self {
        let d = effect_size.abs();
        if d < 0.2 {
            EffectMagnitude::Negligible
        } else if d < 0.5 {
            EffectMagnitude::Small
        } else if d < 0.8 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EffectMagnitude::Negligible => "negligible",
            EffectMagnitude::Small => "small",
            EffectMagnitude::Medium => "medium",
            EffectMagnitude::Large => "large",
        };
        f.write_str(label)
    }
}

/// Result of comparing two independent samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub mean_a: f64,
    pub sd_a: f64,
    pub n_a: usize,
    pub mean_b: f64,
    pub sd_b: f64,
    pub n_b: usize,
    /// `mean_a - mean_b`
    pub mean_difference: f64,
    /// Difference relative to the average of the two means, in percent.
    /// `None` when the two means average to zero.
    pub percent_difference: Option<f64>,
    /// Welch t statistic
    pub test_statistic: f64,
    /// Welch-Satterthwaite degrees of freedom
    pub degrees_of_freedom: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Cohen's d with pooled standard deviation
    pub effect_size: f64,
}

impl ComparisonResult {
    pub fn effect_magnitude(&self) -> EffectMagnitude {
        EffectMagnitude::classify(self.effect_size)
    }

    pub fn is_significant(&self, significance_level: f64) -> bool {
        self.p_value < significance_level
    }
}

/// Outcome of Welch's unequal-variance t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WelchTest {
    pub statistic: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Welch's t-test on two summarized samples
///
/// Fails with `UndefinedStatistic` when both samples have zero variance,
/// since the standard error of the difference is then zero.
pub fn welch_t_test(a: &SampleSummary, b: &SampleSummary) -> Result<WelchTest> {
    let se2_a = a.variance() / a.n as f64;
    let se2_b = b.variance() / b.n as f64;
    let se2 = se2_a + se2_b;

    if se2 <= 0.0 {
        return Err(AnalysisError::UndefinedStatistic {
            statistic: "Welch t statistic",
            reason: "both samples have zero variance".to_string(),
        });
    }

    let statistic = (a.mean - b.mean) / se2.sqrt();
    let df = se2 * se2
        / (se2_a * se2_a / (a.n - 1) as f64 + se2_b * se2_b / (b.n - 1) as f64);
    let p_value = student_t_two_sided_p(statistic, df)?;

    Ok(WelchTest {
        statistic,
        df,
        p_value,
    })
}

/// Cohen's d using the pooled standard deviation
///
/// Fails with `UndefinedStatistic` when the pooled standard deviation is zero.
pub fn cohens_d(a: &SampleSummary, b: &SampleSummary) -> Result<f64> {
    let pooled_variance = ((a.n - 1) as f64 * a.variance() + (b.n - 1) as f64 * b.variance())
        / (a.n + b.n - 2) as f64;

    if pooled_variance <= 0.0 {
        return Err(AnalysisError::UndefinedStatistic {
            statistic: "Cohen's d",
            reason: "pooled standard deviation is zero".to_string(),
        });
    }

    Ok((a.mean - b.mean) / pooled_variance.sqrt())
}

/// Compare two independent samples with missing values already removed
///
/// Fails with `InsufficientSample` when either sample has fewer than two
/// values.
pub fn compare_samples(sample_a: &[f64], sample_b: &[f64]) -> Result<ComparisonResult> {
    let a = SampleSummary::from_sample(sample_a, "Sample A")?;
    let b = SampleSummary::from_sample(sample_b, "Sample B")?;

    let welch = welch_t_test(&a, &b)?;
    let effect_size = cohens_d(&a, &b)?;

    let mean_difference = a.mean - b.mean;
    let average_mean = (a.mean + b.mean) / 2.0;
    let percent_difference = if average_mean != 0.0 {
        Some(mean_difference / average_mean * 100.0)
    } else {
        None
    };

    tracing::debug!(
        "Compared n_a={} n_b={}: t={:.4}, df={:.3}, p={:.4}, d={:.4}",
        a.n,
        b.n,
        welch.statistic,
        welch.df,
        welch.p_value,
        effect_size
    );

    Ok(ComparisonResult {
        mean_a: a.mean,
        sd_a: a.sd,
        n_a: a.n,
        mean_b: b.mean,
        sd_b: b.sd,
        n_b: b.n,
        mean_difference,
        percent_difference,
        test_statistic: welch.statistic,
        degrees_of_freedom: welch.df,
        p_value: welch.p_value,
        effect_size,
    })
}
