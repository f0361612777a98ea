//! Derivation stage: juvenile filter, capture date/year, site labels
//!
//! Derivation is a pure per-record mapping. The only records that never
//! reach the output are non-juveniles (dropped by the filter) and records
//! whose capture date cannot be parsed (skipped with a warning).

use crate::error::{AnalysisError, Result};
use crate::observation::{AgeClass, Observation, Sex};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// Fixed trapping-grid lookup: raw site code to human-readable name
pub const SITE_LABELS: [(&str, &str); 3] = [
    ("bonbs", "Black Spruce stand"),
    ("bonmat", "Bonanza mature"),
    ("bonrip", "Bonanza riparian"),
];

/// Look up the human-readable label for a site code
///
/// Unknown codes yield `None`; no label is guessed.
pub fn site_label(site_code: &str) -> Option<&'static str> {
    let code = site_code.trim().to_ascii_lowercase();
    SITE_LABELS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
}

/// Parse a `month/day/year` capture date
///
/// Four-digit years use `%m/%d/%Y`; two-digit years use `%m/%d/%y`, which
/// resolves `69..=99` to the 1900s and `00..=68` to the 2000s. Any other
/// year field is a parse error.
pub fn parse_capture_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let year_part = trimmed
        .rsplit('/')
        .next()
        .filter(|_| trimmed.matches('/').count() == 2)
        .ok_or_else(|| AnalysisError::parse("capture_date", text, "expected month/day/year"))?;

    if !year_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AnalysisError::parse("capture_date", text, "year must be numeric"));
    }
    let format = match year_part.len() {
        2 => "%m/%d/%y",
        4 => "%m/%d/%Y",
        n => {
            return Err(AnalysisError::parse(
                "capture_date",
                text,
                format!("year must have 2 or 4 digits, found {}", n),
            ))
        }
    };

    NaiveDate::parse_from_str(trimmed, format)
        .map_err(|e| AnalysisError::parse("capture_date", text, e.to_string()))
}

/// A juvenile observation with calendar and site fields derived
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedObservation {
    pub sex: Sex,
    pub site_code: String,
    /// `None` when the site code is not in [`SITE_LABELS`]
    pub site_label: Option<&'static str>,
    pub capture_date: NaiveDate,
    pub capture_year: i32,
    pub hind_foot_length: Option<f64>,
    pub weight: Option<f64>,
}

impl DerivedObservation {
    /// Derive calendar and site fields for a single record
    pub fn from_observation(observation: &Observation) -> Result<Self> {
        let capture_date = parse_capture_date(&observation.capture_date)?;

        Ok(Self {
            sex: observation.sex,
            site_code: observation.site_code.clone(),
            site_label: site_label(&observation.site_code),
            capture_date,
            capture_year: capture_date.year(),
            hind_foot_length: observation.hind_foot_length,
            weight: observation.weight,
        })
    }

    /// Site label, or `"unknown"` for unmapped codes
    pub fn site_label_or_unknown(&self) -> &'static str {
        self.site_label.unwrap_or("unknown")
    }
}

/// Something worth flagging about a record during derivation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivationWarning {
    /// The record was skipped because its date did not parse
    UnparseableDate { record: usize, message: String },
    /// The record was kept, but its year is outside the plausible range
    ImplausibleYear { record: usize, year: i32 },
    /// The record was kept with an absent site label
    UnmappedSite { record: usize, site_code: String },
}

impl fmt::Display for DerivationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationWarning::UnparseableDate { record, message } => {
                write!(f, "record {}: skipped, {}", record, message)
            }
            DerivationWarning::ImplausibleYear { record, year } => {
                write!(f, "record {}: capture year {} outside plausible range", record, year)
            }
            DerivationWarning::UnmappedSite { record, site_code } => {
                write!(f, "record {}: unmapped site code {:?}", record, site_code)
            }
        }
    }
}

/// Output of the derivation stage
#[derive(Debug, Clone, Default, Serialize)]
pub struct Derivation {
    pub records: Vec<DerivedObservation>,
    pub warnings: Vec<DerivationWarning>,
    /// Number of non-juvenile records removed by the filter
    pub excluded_non_juvenile: usize,
}

/// Keep only juvenile records
pub fn filter_juveniles(observations: &[Observation]) -> impl Iterator<Item = (usize, &Observation)> {
    observations
        .iter()
        .enumerate()
        .filter(|(_, obs)| obs.age_class == AgeClass::Juvenile)
}

/// Run the derivation stage over a full table
///
/// `record` indices in warnings refer to positions in `observations`.
pub fn derive_juveniles(
    observations: &[Observation],
    plausible_years: &RangeInclusive<i32>,
) -> Derivation {
    let mut derivation = Derivation {
        excluded_non_juvenile: observations
            .iter()
            .filter(|obs| obs.age_class != AgeClass::Juvenile)
            .count(),
        ..Derivation::default()
    };

    for (index, observation) in filter_juveniles(observations) {
        let derived = match DerivedObservation::from_observation(observation) {
            Ok(derived) => derived,
            Err(e) => {
                tracing::warn!("Skipping record {}: {}", index, e);
                derivation.warnings.push(DerivationWarning::UnparseableDate {
                    record: index,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if !plausible_years.contains(&derived.capture_year) {
            tracing::warn!(
                "Record {} has implausible capture year {}",
                index,
                derived.capture_year
            );
            derivation.warnings.push(DerivationWarning::ImplausibleYear {
                record: index,
                year: derived.capture_year,
            });
        }

        if derived.site_label.is_none() {
            tracing::warn!("Record {} has unmapped site code {:?}", index, derived.site_code);
            derivation.warnings.push(DerivationWarning::UnmappedSite {
                record: index,
                site_code: derived.site_code.clone(),
            });
        }

        derivation.records.push(derived);
    }

    tracing::debug!(
        "Derived {} juvenile records ({} non-juvenile excluded, {} warnings)",
        derivation.records.len(),
        derivation.excluded_non_juvenile,
        derivation.warnings.len()
    );

    derivation
}
