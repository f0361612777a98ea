//! Aggregation stage: grouped counts and grouped descriptive statistics
//!
//! Results are `BTreeMap`s so iteration is sorted by key and output is
//! reproducible run to run.

use crate::error::{AnalysisError, Result};
use crate::stats;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Count records per group key
///
/// Every record lands in exactly one group, so the counts sum to
/// `records.len()`.
pub fn count_by_group<T, K, F>(records: &[T], key_fn: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key_fn(record)).or_insert(0) += 1;
    }
    counts
}

/// Mean, standard deviation and size of one group's non-missing values
///
/// `mean` is `None` when the group has no values and `sd` is `None` with
/// fewer than two. Use [`GroupSummary::mean`] and [`GroupSummary::sd`] to
/// get these as errors instead of options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Debug rendering of the group key, used in error messages
    #[serde(skip)]
    pub label: String,
    /// Number of non-missing values
    pub n: usize,
    /// Number of records in the group whose value was missing
    pub missing: usize,
    #[serde(rename = "mean")]
    pub mean_value: Option<f64>,
    #[serde(rename = "sd")]
    pub sd_value: Option<f64>,
}

impl GroupSummary {
    fn from_values(label: String, values: &[f64], missing: usize) -> Self {
        Self {
            label,
            n: values.len(),
            missing,
            mean_value: stats::mean(values).ok(),
            sd_value: stats::sample_sd(values).ok(),
        }
    }

    /// Group mean, or `EmptyGroup` if the group has no values
    pub fn mean(&self) -> Result<f64> {
        self.mean_value.ok_or_else(|| AnalysisError::EmptyGroup {
            group: self.label.clone(),
        })
    }

    /// Group standard deviation, or `UndefinedStatistic` below two values
    pub fn sd(&self) -> Result<f64> {
        if self.n == 0 {
            return Err(AnalysisError::EmptyGroup {
                group: self.label.clone(),
            });
        }
        self.sd_value.ok_or_else(|| AnalysisError::UndefinedStatistic {
            statistic: "standard deviation",
            reason: format!("group {} has only {} value", self.label, self.n),
        })
    }
}

/// Summarize a numeric field per group over non-missing values
///
/// Groups are created for every key seen, even when all of their values
/// are missing (`n == 0`).
pub fn summarize_by_group<T, K, F, N>(
    records: &[T],
    key_fn: F,
    numeric_fn: N,
) -> BTreeMap<K, GroupSummary>
where
    K: Ord + Debug,
    F: Fn(&T) -> K,
    N: Fn(&T) -> Option<f64>,
{
    let mut groups: BTreeMap<K, (Vec<f64>, usize)> = BTreeMap::new();
    for record in records {
        let (values, missing) = groups.entry(key_fn(record)).or_default();
        match numeric_fn(record) {
            Some(value) if value.is_finite() => values.push(value),
            _ => *missing += 1,
        }
    }

    groups
        .into_iter()
        .map(|(key, (values, missing))| {
            let summary = GroupSummary::from_values(format!("{:?}", key), &values, missing);
            (key, summary)
        })
        .collect()
}
