// Scenario tests for the regression stage
//
// Uses hind-foot/weight pairs shaped like juvenile hare measurements:
// weight rises with foot length, with noticeable scatter.

use super::*;
use crate::error::AnalysisError;

fn hare_pairs() -> Vec<(f64, f64)> {
    vec![
        (70.0, 250.0),
        (78.0, 410.0),
        (85.0, 380.0),
        (90.0, 520.0),
        (96.0, 700.0),
        (102.0, 640.0),
        (108.0, 880.0),
        (115.0, 830.0),
        (120.0, 1050.0),
        (126.0, 990.0),
        (131.0, 1210.0),
        (138.0, 1100.0),
    ]
}

/// Perfectly collinear data: response = 2 * predictor + 3
#[test]
fn test_collinear_fit_recovers_line() {
    for n in [3usize, 4, 10, 25] {
        let pairs: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let x = 1.5 * i as f64 - 4.0;
                (x, 2.0 * x + 3.0)
            })
            .collect();

        let result = regress(&pairs).unwrap();

        assert!((result.slope - 2.0).abs() < 1e-9, "n={} slope={}", n, result.slope);
        assert!((result.intercept - 3.0).abs() < 1e-9, "n={}", n);
        assert!((result.r_squared - 1.0).abs() < 1e-12, "n={}", n);
        assert!((result.pearson_r - 1.0).abs() < 1e-12, "n={}", n);
    }
}

/// Decreasing collinear data gives r = -1
#[test]
fn test_collinear_decreasing() {
    let pairs: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 10.0 - 3.0 * i as f64)).collect();
    let result = regress(&pairs).unwrap();

    assert!((result.pearson_r + 1.0).abs() < 1e-12);
    assert!((result.slope + 3.0).abs() < 1e-12);
}

/// Realistic positive relationship: significant slope, moderate-to-strong r
#[test]
fn test_hare_foot_weight_relationship() {
    let result = regress(&hare_pairs()).unwrap();

    assert_eq!(result.n, 12);
    assert!(result.slope > 0.0);
    assert!(result.p_value < 0.001);
    assert!(result.pearson_r > 0.9);
    assert!((result.pearson_r * result.pearson_r - result.r_squared).abs() < 1e-12);
}

/// In simple regression the slope test and the correlation test coincide
#[test]
fn test_slope_and_correlation_tests_agree() {
    let result = regress(&hare_pairs()).unwrap();
    assert!((result.p_value - result.pearson_p).abs() < 1e-10);
}

/// Missing values on either side drop the pair, not the whole record set
#[test]
fn test_complete_pairs_filters_missing() {
    struct Hare {
        foot: Option<f64>,
        weight: Option<f64>,
    }

    let hares = vec![
        Hare { foot: Some(80.0), weight: Some(400.0) },
        Hare { foot: None, weight: Some(500.0) },
        Hare { foot: Some(90.0), weight: None },
        Hare { foot: Some(100.0), weight: Some(700.0) },
        Hare { foot: Some(f64::NAN), weight: Some(700.0) },
    ];

    let pairs = complete_pairs(&hares, |h| h.foot, |h| h.weight);
    assert_eq!(pairs, vec![(80.0, 400.0), (100.0, 700.0)]);

    // Two complete pairs is not enough for a fit
    assert!(matches!(
        regress(&pairs),
        Err(AnalysisError::InsufficientSample {
            required: 3,
            actual: 2,
            ..
        })
    ));
}

/// A constant predictor cannot determine a slope
#[test]
fn test_constant_predictor_is_degenerate() {
    let pairs = [(100.0, 500.0), (100.0, 700.0), (100.0, 900.0)];
    assert!(matches!(
        regress(&pairs),
        Err(AnalysisError::DegenerateInput(_))
    ));
}

/// Decimal constants are not exact in binary but still have zero spread
#[test]
fn test_constant_decimal_predictor_is_degenerate() {
    for x in [0.1, 131.7, 950.7] {
        let pairs = [(x, 1.0), (x, 2.0), (x, 4.0)];
        assert!(
            matches!(regress(&pairs), Err(AnalysisError::DegenerateInput(_))),
            "x = {}",
            x
        );
    }
}

#[test]
fn test_constant_decimal_response_is_undefined() {
    let pairs = [(90.0, 950.7), (100.0, 950.7), (110.0, 950.7), (120.0, 950.7)];
    assert!(matches!(
        regress(&pairs),
        Err(AnalysisError::UndefinedStatistic { .. })
    ));
}

/// Empty input reports the shortfall
#[test]
fn test_empty_input() {
    assert!(matches!(
        regress(&[]),
        Err(AnalysisError::InsufficientSample { actual: 0, .. })
    ));
}
