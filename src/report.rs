//! Text and JSON renderings of a [`PipelineReport`]

use crate::aggregate::GroupSummary;
use crate::inference::ComparisonResult;
use crate::pipeline::{PipelineReport, StageOutcome};
use crate::regression::RegressionResult;
use crate::stats;
use anyhow::{Context, Result};
use std::fmt::Write as _;

/// Pretty-printed JSON
pub fn render_json(report: &PipelineReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "NA".to_string(),
    }
}

fn fmt_p(p: f64) -> String {
    if p < 0.001 {
        "< 0.001".to_string()
    } else {
        format!("{:.3}", p)
    }
}

fn significance_phrase(p: f64, alpha: f64) -> &'static str {
    if p < alpha {
        "significant"
    } else {
        "not significant"
    }
}

fn summary_cells(summary: &GroupSummary) -> String {
    format!(
        "{:>5} {:>10} {:>10} {:>8}",
        summary.n,
        fmt_opt(summary.mean_value, 1),
        fmt_opt(summary.sd_value, 1),
        summary.missing
    )
}

fn render_counts(out: &mut String, report: &PipelineReport) -> std::fmt::Result {
    writeln!(out, "Juvenile trappings by year")?;
    writeln!(out, "──────────────────────────")?;
    for entry in &report.counts_by_year {
        writeln!(out, "  {}  {:>5}", entry.year, entry.count)?;
    }

    let counts: Vec<f64> = report.counts_by_year.iter().map(|c| c.count as f64).collect();
    if let (Ok(mean), Ok(median)) = (stats::mean(&counts), stats::median(&counts)) {
        let min = counts.iter().copied().fold(f64::INFINITY, f64::min);
        let max = counts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        writeln!(
            out,
            "  min {:.0}, max {:.0}, mean {:.1}, median {:.1}",
            min, max, mean, median
        )?;
    }
    writeln!(out)
}

fn render_weights(out: &mut String, report: &PipelineReport) -> std::fmt::Result {
    writeln!(out, "Juvenile weight (g) by sex and site")?;
    writeln!(out, "───────────────────────────────────")?;
    writeln!(
        out,
        "  {:<12} {:<20} {:>5} {:>10} {:>10} {:>8}",
        "sex", "site", "n", "mean", "sd", "missing"
    )?;
    for row in &report.weight_by_sex_site {
        writeln!(
            out,
            "  {:<12} {:<20} {}",
            row.sex.label(),
            row.site,
            summary_cells(&row.summary)
        )?;
    }
    writeln!(out)?;

    writeln!(out, "Juvenile weight (g) by sex")?;
    writeln!(out, "──────────────────────────")?;
    for row in &report.weight_by_sex {
        writeln!(out, "  {:<12} {}", row.sex.label(), summary_cells(&row.summary))?;
    }
    writeln!(out)
}

fn render_comparison(
    out: &mut String,
    comparison: &ComparisonResult,
    alpha: f64,
) -> std::fmt::Result {
    writeln!(
        out,
        "  male:   mean {:.1} g, sd {:.1}, n {}",
        comparison.mean_a, comparison.sd_a, comparison.n_a
    )?;
    writeln!(
        out,
        "  female: mean {:.1} g, sd {:.1}, n {}",
        comparison.mean_b, comparison.sd_b, comparison.n_b
    )?;
    writeln!(
        out,
        "  difference: {:.1} g ({}%)",
        comparison.mean_difference,
        fmt_opt(comparison.percent_difference, 1)
    )?;
    writeln!(
        out,
        "  Welch t({:.2}) = {:.3}, p {} ({} at alpha = {})",
        comparison.degrees_of_freedom,
        comparison.test_statistic,
        fmt_p(comparison.p_value),
        significance_phrase(comparison.p_value, alpha),
        alpha
    )?;
    writeln!(
        out,
        "  Cohen's d = {:.3} ({})",
        comparison.effect_size,
        comparison.effect_magnitude()
    )
}

fn render_regression(
    out: &mut String,
    regression: &RegressionResult,
    alpha: f64,
) -> std::fmt::Result {
    writeln!(
        out,
        "  weight = {:.3} + {:.3} * hind_foot  (n = {})",
        regression.intercept, regression.slope, regression.n
    )?;
    writeln!(
        out,
        "  slope t = {:.3}, p {} ({})",
        regression.slope_t,
        fmt_p(regression.p_value),
        significance_phrase(regression.p_value, alpha)
    )?;
    writeln!(out, "  R^2 = {:.3}", regression.r_squared)?;
    writeln!(
        out,
        "  Pearson r = {:.3}, p {}",
        regression.pearson_r,
        fmt_p(regression.pearson_p)
    )
}

fn render_outcome<T>(
    out: &mut String,
    title: &str,
    outcome: &StageOutcome<T>,
    alpha: f64,
    render: fn(&mut String, &T, f64) -> std::fmt::Result,
) -> std::fmt::Result {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "─".repeat(title.chars().count()))?;
    match outcome {
        StageOutcome::Computed(value) => render(out, value, alpha)?,
        StageOutcome::Failed(reason) => writeln!(out, "  not computed: {}", reason)?,
    }
    writeln!(out)
}

/// Human-readable multi-section report
pub fn render_text(report: &PipelineReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, report: &PipelineReport) -> std::fmt::Result {
    let alpha = report.config.significance_level;

    writeln!(
        out,
        "{} records, {} juvenile ({} non-juvenile excluded)",
        report.total_records, report.juvenile_records, report.excluded_non_juvenile
    )?;
    if !report.load_warnings.is_empty() {
        writeln!(out, "{} rows skipped while loading:", report.load_warnings.len())?;
        for warning in &report.load_warnings {
            writeln!(out, "  - {}", warning)?;
        }
    }
    if !report.derivation_warnings.is_empty() {
        writeln!(out, "{} derivation warnings:", report.derivation_warnings.len())?;
        for warning in &report.derivation_warnings {
            writeln!(out, "  - {}", warning)?;
        }
    }
    writeln!(out)?;

    render_counts(out, report)?;
    render_weights(out, report)?;

    if report.unspecified_sex_excluded > 0 {
        writeln!(
            out,
            "({} unspecified-sex records excluded from the comparison)",
            report.unspecified_sex_excluded
        )?;
    }
    render_outcome(
        out,
        "Male vs female juvenile weight",
        &report.sex_comparison,
        alpha,
        render_comparison,
    )?;
    render_outcome(
        out,
        "Hind foot length vs weight",
        &report.foot_weight_regression,
        alpha,
        render_regression,
    )
}
