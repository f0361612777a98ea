// Simple linear regression with correlation diagnostics
//
// Fits `response ≈ intercept + slope * predictor` by ordinary least squares
// in closed form, tests the slope against zero, and computes Pearson's r
// with its own significance test. Both tests use n - 2 degrees of freedom.
//
// Model assumptions (linearity, homoscedasticity, normal residuals) are not
// checked here; only fit statistics are computed.

mod correlation;
mod ols;

pub use correlation::{pearson, PearsonCorrelation};
pub use ols::{fit_linear, LinearFit};

use crate::error::Result;
use serde::Serialize;

/// Fit statistics for one predictor/response pairing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    pub n: usize,
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
    /// Standard error of the slope estimate
    pub slope_std_error: f64,
    /// t statistic for H0: slope = 0
    pub slope_t: f64,
    /// Two-sided p-value of the slope
    pub p_value: f64,
    pub pearson_r: f64,
    pub pearson_p: f64,
}

/// Pair up two optional columns, keeping only complete pairs
pub fn complete_pairs<T, P, R>(records: &[T], predictor: P, response: R) -> Vec<(f64, f64)>
where
    P: Fn(&T) -> Option<f64>,
    R: Fn(&T) -> Option<f64>,
{
    records
        .iter()
        .filter_map(|record| match (predictor(record), response(record)) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
            _ => None,
        })
        .collect()
}

/// Fit the linear model and compute Pearson's r on the same pairs
///
/// Fails with `InsufficientSample` below three pairs and with
/// `DegenerateInput` when the predictor is constant.
pub fn regress(pairs: &[(f64, f64)]) -> Result<RegressionResult> {
    let fit = fit_linear(pairs)?;
    let correlation = pearson(pairs)?;

    tracing::debug!(
        "Regression on {} pairs: slope={:.4}, intercept={:.4}, R^2={:.4}, r={:.4}",
        fit.n,
        fit.slope,
        fit.intercept,
        fit.r_squared,
        correlation.r
    );

    Ok(RegressionResult {
        n: fit.n,
        intercept: fit.intercept,
        slope: fit.slope,
        r_squared: fit.r_squared,
        slope_std_error: fit.slope_std_error,
        slope_t: fit.slope_t,
        p_value: fit.p_value,
        pearson_r: correlation.r,
        pearson_p: correlation.p_value,
    })
}

#[cfg(test)]
mod tests;
