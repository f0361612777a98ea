// Descriptive statistics over complete (non-missing) samples

use crate::error::{AnalysisError, Result};
use serde::Serialize;

/// Arithmetic mean
///
/// Fails with `UndefinedStatistic` on an empty sample.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(AnalysisError::UndefinedStatistic {
            statistic: "mean",
            reason: "sample is empty".to_string(),
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// True when every value equals the first one
///
/// Zero spread is detected by equality, not by a computed variance: the mean
/// of a constant sample like `[0.1, 0.1, 0.1]` is off by rounding, so its
/// centered sum of squares is tiny but not zero.
pub fn is_constant(values: &[f64]) -> bool {
    match values.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v == first),
        None => true,
    }
}

/// Sample standard deviation with Bessel's correction (divisor `n - 1`)
///
/// Fails with `UndefinedStatistic` when fewer than two values are given.
/// A constant sample has an sd of exactly zero.
pub fn sample_sd(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(AnalysisError::UndefinedStatistic {
            statistic: "standard deviation",
            reason: format!("requires at least 2 values, got {}", values.len()),
        });
    }
    if is_constant(values) {
        return Ok(0.0);
    }

    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Median (average of the two middle values for even lengths)
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(AnalysisError::UndefinedStatistic {
            statistic: "median",
            reason: "sample is empty".to_string(),
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Mean, standard deviation and size of a sample with at least two values
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleSummary {
    pub n: usize,
    pub mean: f64,
    pub sd: f64,
}

impl SampleSummary {
    /// Summarize a sample, failing with `InsufficientSample` below two values
    pub fn from_sample(values: &[f64], context: &'static str) -> Result<Self> {
        if values.len() < 2 {
            return Err(AnalysisError::InsufficientSample {
                context,
                required: 2,
                actual: values.len(),
            });
        }

        Ok(Self {
            n: values.len(),
            mean: mean(values)?,
            sd: sample_sd(values)?,
        })
    }

    pub fn variance(&self) -> f64 {
        self.sd * self.sd
    }
}
