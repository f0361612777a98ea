//! Snowshoe - exploratory statistics for juvenile snowshoe hare measurements
//!
//! This library filters trapping records to juveniles, derives capture years
//! and site names, and computes grouped weight summaries, a Welch t-test with
//! Cohen's d between male and female weights, and a hind-foot/weight linear
//! regression with Pearson correlation.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod derive;
pub mod error;
pub mod inference;
pub mod loader;
pub mod observation;
pub mod pipeline;
pub mod regression;
pub mod report;
pub mod stats;

pub use error::{AnalysisError, Result};
