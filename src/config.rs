// Analysis configuration
//
// Only reporting thresholds live here. The juvenile filter, the site lookup
// and the grouping keys are fixed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Thresholds used when flagging records and phrasing results
///
/// # Example
/// ```
/// use snowshoe::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.significance_level, 0.05);
/// assert!(config.plausible_years().contains(&2005));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Significance level (alpha) for calling a result "significant"
    ///
    /// Reports always show the actual p-value; this only chooses the wording.
    pub significance_level: f64,

    /// First capture year considered plausible for the dataset
    pub first_plausible_year: i32,

    /// Last capture year considered plausible for the dataset
    ///
    /// Years outside `first_plausible_year..=last_plausible_year` are
    /// flagged as warnings, never dropped.
    pub last_plausible_year: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            first_plausible_year: 1998,
            last_plausible_year: 2012,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    ///
    /// ```no_run
    /// use snowshoe::config::AnalysisConfig;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = AnalysisConfig::from_file("snowshoe.toml")?;
    /// println!("alpha = {}", config.significance_level);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// Missing keys take their default values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    pub fn plausible_years(&self) -> RangeInclusive<i32> {
        self.first_plausible_year..=self.last_plausible_year
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        if self.first_plausible_year > self.last_plausible_year {
            return Err(format!(
                "first_plausible_year ({}) is after last_plausible_year ({})",
                self.first_plausible_year, self.last_plausible_year
            ));
        }

        Ok(())
    }
}
