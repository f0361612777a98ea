//! Raw trapping records as handed over by the data loader

use serde::{Deserialize, Serialize};
use std::fmt;

/// Life stage recorded at capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeClass {
    Juvenile,
    Adult,
    /// Anything else, including a missing value
    Other,
}

impl AgeClass {
    /// Normalize a raw age code (`j`, `juvenile`, `a`, `adult`, ...)
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "j" | "juvenile" => AgeClass::Juvenile,
            "a" | "adult" => AgeClass::Adult,
            _ => AgeClass::Other,
        }
    }
}

/// Recorded sex of the animal
///
/// `Unspecified` covers missing and ambiguous entries; it is a group of its
/// own in aggregates and is left out of the male/female comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
    Unspecified,
}

impl Sex {
    /// Normalize a raw sex code (`f`, `female`, `m`, `male`, anything else)
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "f" | "female" => Sex::Female,
            "m" | "male" => Sex::Male,
            _ => Sex::Unspecified,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
            Sex::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One trapping record
///
/// `capture_date` is kept as the raw `month/day/year` text; parsing it is
/// the derivation stage's job so a bad date can be reported per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub age_class: AgeClass,
    pub sex: Sex,
    /// Raw trapping grid code (`bonbs`, `bonmat`, `bonrip`)
    pub site_code: String,
    pub capture_date: String,
    /// Hind foot length in millimeters
    pub hind_foot_length: Option<f64>,
    /// Body weight in grams
    pub weight: Option<f64>,
}

impl Observation {
    /// Convenience constructor for a juvenile record
    pub fn juvenile(
        sex: Sex,
        site_code: &str,
        capture_date: &str,
        hind_foot_length: Option<f64>,
        weight: Option<f64>,
    ) -> Self {
        Self {
            age_class: AgeClass::Juvenile,
            sex,
            site_code: site_code.to_string(),
            capture_date: capture_date.to_string(),
            hind_foot_length,
            weight,
        }
    }
}
