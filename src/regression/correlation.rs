// Pearson product-moment correlation with a two-sided t test

use super::ols::Moments;
use crate::error::{AnalysisError, Result};
use crate::stats::student_t_two_sided_p;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PearsonCorrelation {
    pub n: usize,
    pub r: f64,
    /// t = r * sqrt((n - 2) / (1 - r^2))
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Pearson's r between predictor and response, tested against r = 0
///
/// Same input requirements as the regression fit; a constant response makes
/// r undefined.
pub fn pearson(pairs: &[(f64, f64)]) -> Result<PearsonCorrelation> {
    let m = Moments::from_pairs(pairs, "Pearson correlation")?;

    if m.syy <= 0.0 {
        return Err(AnalysisError::UndefinedStatistic {
            statistic: "Pearson correlation",
            reason: "response has zero variance".to_string(),
        });
    }

    let r = (m.sxy / (m.sxx * m.syy).sqrt()).clamp(-1.0, 1.0);
    let df = m.df();

    let t = if r.abs() < 1.0 {
        r * (df / (1.0 - r * r)).sqrt()
    } else {
        f64::INFINITY.copysign(r)
    };
    let p_value = student_t_two_sided_p(t, df)?;

    Ok(PearsonCorrelation {
        n: m.n,
        r,
        t,
        df,
        p_value,
    })
}
