//! Pipeline driver: derivation, aggregation, comparison and regression
//!
//! Runs each stage once, in order, over an in-memory table. A failed
//! comparison or regression does not abort the run; the error message is
//! kept in the report in place of the result.

use crate::aggregate::{count_by_group, summarize_by_group, GroupSummary};
use crate::config::AnalysisConfig;
use crate::derive::{derive_juveniles, DerivationWarning, DerivedObservation};
use crate::error::Result as StageResult;
use crate::inference::{compare_samples, ComparisonResult};
use crate::loader::{LoadWarning, LoadedTable};
use crate::observation::{Observation, Sex};
use crate::regression::{complete_pairs, regress, RegressionResult};
use anyhow::Result;
use serde::Serialize;

/// Juvenile trap count for one capture year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Weight summary for one (sex, site) cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexSiteWeight {
    pub sex: Sex,
    /// Site label, `"unknown"` for unmapped site codes
    pub site: &'static str,
    #[serde(flatten)]
    pub summary: GroupSummary,
}

/// Weight summary for one sex
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SexWeight {
    pub sex: Sex,
    #[serde(flatten)]
    pub summary: GroupSummary,
}

/// A stage result, or the reason it could not be computed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Computed(T),
    Failed(String),
}

impl<T> StageOutcome<T> {
    fn from_result(stage: &str, result: StageResult<T>) -> Self {
        match result {
            Ok(value) => StageOutcome::Computed(value),
            Err(e) => {
                tracing::warn!("{} failed: {}", stage, e);
                StageOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn computed(&self) -> Option<&T> {
        match self {
            StageOutcome::Computed(value) => Some(value),
            StageOutcome::Failed(_) => None,
        }
    }
}

/// Everything the report renderer needs from one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub config: AnalysisConfig,
    /// Rows the loader skipped before the pipeline ran
    pub load_warnings: Vec<LoadWarning>,
    pub total_records: usize,
    pub juvenile_records: usize,
    pub excluded_non_juvenile: usize,
    pub derivation_warnings: Vec<DerivationWarning>,
    pub counts_by_year: Vec<YearCount>,
    pub weight_by_sex_site: Vec<SexSiteWeight>,
    pub weight_by_sex: Vec<SexWeight>,
    /// Records left out of the male/female comparison because sex is unspecified
    pub unspecified_sex_excluded: usize,
    /// Male weights (A) against female weights (B)
    pub sex_comparison: StageOutcome<ComparisonResult>,
    /// Weight (response) on hind foot length (predictor)
    pub foot_weight_regression: StageOutcome<RegressionResult>,
}

/// Non-missing weights of one sex
pub fn weights_of(records: &[DerivedObservation], sex: Sex) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.sex == sex)
        .filter_map(|r| r.weight)
        .filter(|w| w.is_finite())
        .collect()
}

/// Run the full analysis over a loaded table, keeping its skipped rows in the report
pub fn run_loaded_table(table: &LoadedTable, config: &AnalysisConfig) -> Result<PipelineReport> {
    let mut report = run_pipeline(&table.observations, config)?;
    report.load_warnings = table.warnings.clone();
    Ok(report)
}

/// Run the full analysis over a table of observations
pub fn run_pipeline(observations: &[Observation], config: &AnalysisConfig) -> Result<PipelineReport> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let _span = tracing::debug_span!("pipeline", records = observations.len()).entered();

    let derivation = derive_juveniles(observations, &config.plausible_years());
    let records = &derivation.records;

    let counts_by_year = count_by_group(records, |r| r.capture_year)
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect();

    let weight_by_sex_site = summarize_by_group(
        records,
        |r| (r.sex, r.site_label_or_unknown()),
        |r| r.weight,
    )
    .into_iter()
    .map(|((sex, site), summary)| SexSiteWeight { sex, site, summary })
    .collect();

    let weight_by_sex = summarize_by_group(records, |r| r.sex, |r| r.weight)
        .into_iter()
        .map(|(sex, summary)| SexWeight { sex, summary })
        .collect();

    // Only male and female are compared; unspecified sex is filtered out here
    let unspecified_sex_excluded = records.iter().filter(|r| r.sex == Sex::Unspecified).count();
    if unspecified_sex_excluded > 0 {
        tracing::debug!(
            "Excluding {} unspecified-sex records from the sex comparison",
            unspecified_sex_excluded
        );
    }
    let male = weights_of(records, Sex::Male);
    let female = weights_of(records, Sex::Female);
    let sex_comparison =
        StageOutcome::from_result("Sex comparison", compare_samples(&male, &female));

    let pairs = complete_pairs(records, |r| r.hind_foot_length, |r| r.weight);
    let foot_weight_regression =
        StageOutcome::from_result("Foot/weight regression", regress(&pairs));

    Ok(PipelineReport {
        config: config.clone(),
        load_warnings: Vec::new(),
        total_records: observations.len(),
        juvenile_records: derivation.records.len(),
        excluded_non_juvenile: derivation.excluded_non_juvenile,
        derivation_warnings: derivation.warnings,
        counts_by_year,
        weight_by_sex_site,
        weight_by_sex,
        unspecified_sex_excluded,
        sex_comparison,
        foot_weight_regression,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::AgeClass;

    fn juvenile(sex: Sex, site: &str, date: &str, foot: Option<f64>, weight: Option<f64>) -> Observation {
        Observation::juvenile(sex, site, date, foot, weight)
    }

    fn sample_table() -> Vec<Observation> {
        vec![
            juvenile(Sex::Male, "bonrip", "9/1/1999", Some(120.0), Some(1000.0)),
            juvenile(Sex::Male, "bonbs", "9/2/1999", Some(130.0), Some(1200.0)),
            juvenile(Sex::Male, "bonmat", "9/1/2000", Some(125.0), Some(1100.0)),
            juvenile(Sex::Female, "bonrip", "9/1/2000", Some(110.0), Some(900.0)),
            juvenile(Sex::Female, "bonrip", "9/3/2000", Some(112.0), Some(950.0)),
            juvenile(Sex::Female, "bonbs", "8/30/2001", Some(118.0), Some(1000.0)),
            juvenile(Sex::Unspecified, "bonrip", "8/30/2001", None, Some(5000.0)),
            Observation {
                age_class: AgeClass::Adult,
                ..juvenile(Sex::Male, "bonrip", "9/1/1999", Some(140.0), Some(1600.0))
            },
        ]
    }

    #[test]
    fn test_end_to_end_sex_comparison() {
        let report = run_pipeline(&sample_table(), &AnalysisConfig::default()).unwrap();

        let comparison = report.sex_comparison.computed().unwrap();
        assert_eq!(comparison.mean_a, 1100.0);
        assert_eq!(comparison.mean_b, 950.0);
        assert_eq!(comparison.mean_difference, 150.0);
        assert!((comparison.effect_size - 150.0 / 6250.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(report.unspecified_sex_excluded, 1);
    }

    #[test]
    fn test_adult_excluded_from_aggregates() {
        let report = run_pipeline(&sample_table(), &AnalysisConfig::default()).unwrap();

        assert_eq!(report.total_records, 8);
        assert_eq!(report.juvenile_records, 7);
        assert_eq!(report.excluded_non_juvenile, 1);

        let total: usize = report.counts_by_year.iter().map(|y| y.count).sum();
        assert_eq!(total, 7);

        let male = report
            .weight_by_sex
            .iter()
            .find(|w| w.sex == Sex::Male)
            .unwrap();
        assert_eq!(male.summary.n, 3);
    }

    #[test]
    fn test_counts_by_year_sorted() {
        let report = run_pipeline(&sample_table(), &AnalysisConfig::default()).unwrap();
        assert_eq!(
            report.counts_by_year,
            vec![
                YearCount { year: 1999, count: 2 },
                YearCount { year: 2000, count: 3 },
                YearCount { year: 2001, count: 2 },
            ]
        );
    }

    #[test]
    fn test_sex_site_cells() {
        let report = run_pipeline(&sample_table(), &AnalysisConfig::default()).unwrap();

        let female_riparian = report
            .weight_by_sex_site
            .iter()
            .find(|w| w.sex == Sex::Female && w.site == "Bonanza riparian")
            .unwrap();
        assert_eq!(female_riparian.summary.n, 2);
        assert_eq!(female_riparian.summary.mean().unwrap(), 925.0);

        let sum_n: usize = report.weight_by_sex_site.iter().map(|w| w.summary.n).sum();
        assert_eq!(sum_n, 7);
    }

    #[test]
    fn test_regression_uses_complete_pairs() {
        let report = run_pipeline(&sample_table(), &AnalysisConfig::default()).unwrap();

        let regression = report.foot_weight_regression.computed().unwrap();
        assert_eq!(regression.n, 6);
        assert!(regression.slope > 0.0);
    }

    #[test]
    fn test_stage_failures_are_recorded_not_fatal() {
        let table = vec![
            juvenile(Sex::Male, "bonrip", "9/1/1999", Some(120.0), Some(1000.0)),
            juvenile(Sex::Female, "bonrip", "9/1/1999", Some(110.0), Some(900.0)),
            juvenile(Sex::Female, "bonrip", "bad date", Some(110.0), Some(900.0)),
        ];
        let report = run_pipeline(&table, &AnalysisConfig::default()).unwrap();

        assert!(matches!(report.sex_comparison, StageOutcome::Failed(_)));
        assert!(matches!(report.foot_weight_regression, StageOutcome::Failed(_)));
        assert_eq!(report.derivation_warnings.len(), 1);
    }

    #[test]
    fn test_loaded_table_keeps_load_warnings() {
        let table = LoadedTable {
            observations: sample_table(),
            warnings: vec![LoadWarning {
                line: 9,
                message: "cannot parse weight".to_string(),
            }],
        };
        let report = run_loaded_table(&table, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.load_warnings, table.warnings);
        assert_eq!(report.total_records, 8);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["load_warnings"][0]["line"], 9);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            significance_level: 2.0,
            ..AnalysisConfig::default()
        };
        assert!(run_pipeline(&sample_table(), &config).is_err());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = run_pipeline(&sample_table(), &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["juvenile_records"], 7);
        assert_eq!(json["sex_comparison"]["computed"]["mean_difference"], 150.0);
        assert_eq!(json["weight_by_sex"][0]["sex"], "female");
    }
}
