// Ordinary least squares for a single predictor (normal equations)

use crate::error::{AnalysisError, Result};
use crate::stats::{is_constant, student_t_two_sided_p};
use serde::Serialize;

/// Centered sums of squares and cross-products of paired data
#[derive(Debug, Clone, Copy)]
pub(super) struct Moments {
    pub n: usize,
    pub mean_x: f64,
    pub mean_y: f64,
    pub sxx: f64,
    pub syy: f64,
    pub sxy: f64,
}

impl Moments {
    /// Requires at least three pairs and a non-constant predictor
    pub(super) fn from_pairs(pairs: &[(f64, f64)], context: &'static str) -> Result<Self> {
        if pairs.len() < 3 {
            return Err(AnalysisError::InsufficientSample {
                context,
                required: 3,
                actual: pairs.len(),
            });
        }

        let xs: Vec<f64> = pairs.iter().map(|(x, _)| *x).collect();
        let ys: Vec<f64> = pairs.iter().map(|(_, y)| *y).collect();
        if is_constant(&xs) {
            return Err(AnalysisError::DegenerateInput(
                "predictor has zero variance".to_string(),
            ));
        }

        let n = pairs.len();
        let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
        let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for (x, y) in pairs {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        // Rounding leaves a constant response with a tiny positive syy
        if is_constant(&ys) {
            syy = 0.0;
        }
        if sxx <= 0.0 {
            return Err(AnalysisError::DegenerateInput(
                "predictor has zero variance".to_string(),
            ));
        }

        Ok(Self {
            n,
            mean_x,
            mean_y,
            sxx,
            syy,
            sxy,
        })
    }

    pub(super) fn df(&self) -> f64 {
        (self.n - 2) as f64
    }
}

/// Least-squares line with slope significance
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub n: usize,
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
    /// Residual standard error, sqrt(SSE / (n - 2))
    pub residual_std_error: f64,
    pub slope_std_error: f64,
    pub slope_t: f64,
    pub p_value: f64,
}

impl LinearFit {
    pub fn predict(&self, predictor: f64) -> f64 {
        self.intercept + self.slope * predictor
    }
}

/// Fit `response = intercept + slope * predictor` over `(predictor, response)` pairs
///
/// Fails with `InsufficientSample` below three pairs, `DegenerateInput` for a
/// constant predictor and `UndefinedStatistic` for a constant response
/// (R² is then 0/0).
pub fn fit_linear(pairs: &[(f64, f64)]) -> Result<LinearFit> {
    let m = Moments::from_pairs(pairs, "Linear regression")?;

    if m.syy <= 0.0 {
        return Err(AnalysisError::UndefinedStatistic {
            statistic: "R-squared",
            reason: "response has zero variance".to_string(),
        });
    }

    let slope = m.sxy / m.sxx;
    let intercept = m.mean_y - slope * m.mean_x;

    let sse: f64 = pairs
        .iter()
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let r_squared = (1.0 - sse / m.syy).clamp(0.0, 1.0);

    let residual_variance = sse / m.df();
    let slope_std_error = (residual_variance / m.sxx).sqrt();
    let slope_t = if slope_std_error > 0.0 {
        slope / slope_std_error
    } else {
        // Exact fit: every residual is zero
        f64::INFINITY.copysign(slope)
    };
    let p_value = student_t_two_sided_p(slope_t, m.df())?;

    Ok(LinearFit {
        n: m.n,
        intercept,
        slope,
        r_squared,
        residual_std_error: residual_variance.sqrt(),
        slope_std_error,
        slope_t,
        p_value,
    })
}
