//! CSV loader for raw trapping records
//!
//! Reads a comma-separated table with a header row and produces
//! [`Observation`]s. Only the columns the pipeline needs are read; extra
//! columns are ignored. Column names are matched case-insensitively:
//!
//! | Field | Accepted headers |
//! |---|---|
//! | capture date | `date`, `capture_date` |
//! | site code | `grid`, `site`, `site_code` |
//! | age class | `age`, `age_class` |
//! | sex | `sex` |
//! | hind foot length | `hindft`, `hind_foot_length` |
//! | weight | `weight` |
//!
//! Empty cells and `NA` are missing values. A row with a malformed numeric
//! cell is skipped and reported as a [`LoadWarning`]. Quoting follows
//! RFC 4180, so quoted fields may hold commas, doubled quotes and line
//! breaks.

use crate::error::AnalysisError;
use crate::observation::{AgeClass, Observation, Sex};
use anyhow::{bail, Context, Result};
use csv::StringRecord;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DATE_HEADERS: &[&str] = &["date", "capture_date"];
const SITE_HEADERS: &[&str] = &["grid", "site", "site_code"];
const AGE_HEADERS: &[&str] = &["age", "age_class"];
const SEX_HEADERS: &[&str] = &["sex"];
const HIND_FOOT_HEADERS: &[&str] = &["hindft", "hind_foot_length"];
const WEIGHT_HEADERS: &[&str] = &["weight"];

/// A data row that could not be turned into an observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadWarning {
    /// 1-based line the record starts on, header included
    pub line: u64,
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Observations read from a table, plus the rows that were skipped
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub observations: Vec<Observation>,
    pub warnings: Vec<LoadWarning>,
}

/// Column positions of the fields we read
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    date: usize,
    site: usize,
    age: usize,
    sex: usize,
    hind_foot: usize,
    weight: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| -> Result<usize> {
            headers
                .iter()
                .map(|h| h.trim_start_matches('\u{feff}'))
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
                .with_context(|| format!("Missing required column (one of: {})", names.join(", ")))
        };

        Ok(Self {
            date: find(DATE_HEADERS)?,
            site: find(SITE_HEADERS)?,
            age: find(AGE_HEADERS)?,
            sex: find(SEX_HEADERS)?,
            hind_foot: find(HIND_FOOT_HEADERS)?,
            weight: find(WEIGHT_HEADERS)?,
        })
    }

    fn width(&self) -> usize {
        [
            self.date,
            self.site,
            self.age,
            self.sex,
            self.hind_foot,
            self.weight,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
            + 1
    }
}

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell.eq_ignore_ascii_case("na")
}

/// Parse an optional numeric cell; `Ok(None)` for a missing value
pub fn parse_measurement(field: &'static str, cell: &str) -> Result<Option<f64>, AnalysisError> {
    if is_missing(cell) {
        return Ok(None);
    }

    let value: f64 = cell
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| AnalysisError::parse(field, cell, e.to_string()))?;

    if !value.is_finite() {
        return Err(AnalysisError::parse(field, cell, "value is not finite"));
    }

    Ok(Some(value))
}

fn parse_record(record: &StringRecord, columns: &ColumnIndex) -> Result<Observation, AnalysisError> {
    let cell = |i: usize| record.get(i).unwrap_or("");

    Ok(Observation {
        age_class: AgeClass::from_code(cell(columns.age)),
        sex: Sex::from_code(cell(columns.sex)),
        site_code: cell(columns.site).to_string(),
        capture_date: cell(columns.date).to_string(),
        hind_foot_length: parse_measurement("hind_foot_length", cell(columns.hind_foot))?,
        weight: parse_measurement("weight", cell(columns.weight))?,
    })
}

fn skip(table: &mut LoadedTable, line: u64, message: String) {
    let warning = LoadWarning { line, message };
    tracing::warn!("Skipping {}", warning);
    table.warnings.push(warning);
}

/// Read observations from any CSV source
///
/// Fails only on I/O errors, an empty input, or a header missing a required
/// column. Bad data rows become warnings.
pub fn read_observations<R: Read>(reader: R) -> Result<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("Failed to read header row")?.clone();
    if headers.is_empty() {
        bail!("Input is empty: expected a header row");
    }
    let columns = ColumnIndex::from_headers(&headers)?;
    let width = columns.width();

    let mut table = LoadedTable::default();
    let mut record = StringRecord::new();

    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) if e.is_io_error() => return Err(e).context("Failed to read input"),
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line());
                skip(&mut table, line, e.to_string());
                continue;
            }
        }

        let line = record.position().map_or(0, |p| p.line());
        if record.len() < width {
            skip(
                &mut table,
                line,
                format!("expected at least {} fields, found {}", width, record.len()),
            );
            continue;
        }

        match parse_record(&record, &columns) {
            Ok(observation) => table.observations.push(observation),
            Err(e) => skip(&mut table, line, e.to_string()),
        }
    }

    tracing::debug!(
        "Loaded {} observations ({} rows skipped)",
        table.observations.len(),
        table.warnings.len()
    );

    Ok(table)
}

/// Read observations from a CSV file on disk
pub fn load_observations<P: AsRef<Path>>(path: P) -> Result<LoadedTable> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_observations(file)
        .with_context(|| format!("Failed to load observations from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "date,time,grid,trap,l_ear,r_ear,hindft,notes,b_key,session_id,study,age,sex,weight";

    fn load(body: &str) -> LoadedTable {
        let input = format!("{}\n{}", HEADER, body);
        read_observations(Cursor::new(input)).unwrap()
    }

    #[test]
    fn test_quoted_fields_with_commas_and_quotes() {
        let input = "date,grid,age,sex,hindft,weight,notes\n\
                     9/1/1999,bonrip,j,m,120,1000,\"trap 4, east side \"\"B\"\"\"\n";
        let table = read_observations(Cursor::new(input)).unwrap();

        assert!(table.warnings.is_empty());
        assert_eq!(table.observations.len(), 1);
        assert_eq!(table.observations[0].weight, Some(1000.0));
    }

    #[test]
    fn test_quoted_line_break_stays_in_one_record() {
        let input = "date,grid,age,sex,hindft,weight\n\
                     9/1/1999,\"bon\nrip\",j,m,120,1000\n\
                     9/2/1999,bonbs,j,f,110,heavy\n";
        let table = read_observations(Cursor::new(input)).unwrap();

        assert_eq!(table.observations.len(), 1);
        assert_eq!(table.observations[0].site_code, "bon\nrip");
        assert_eq!(table.observations[0].hind_foot_length, Some(120.0));

        // The bad row starts on line 4 because the quoted field spans two lines
        assert_eq!(table.warnings.len(), 1);
        assert_eq!(table.warnings[0].line, 4);
    }

    #[test]
    fn test_byte_order_mark_in_header() {
        let input = "\u{feff}date,grid,age,sex,hindft,weight\n9/1/1999,bonrip,j,m,120,1000\n";
        let table = read_observations(Cursor::new(input)).unwrap();
        assert_eq!(table.observations.len(), 1);
    }

    #[test]
    fn test_reads_hare_rows() {
        let table = load(
            "11/26/1998,,bonrip,1A,,,131,,917,51,Population,j,f,1370\n\
             11/26/1998,,bonrip,2B,,,NA,,936,51,Population,a,m,NA\n",
        );

        assert!(table.warnings.is_empty());
        assert_eq!(table.observations.len(), 2);

        let first = &table.observations[0];
        assert_eq!(first.age_class, AgeClass::Juvenile);
        assert_eq!(first.sex, Sex::Female);
        assert_eq!(first.site_code, "bonrip");
        assert_eq!(first.capture_date, "11/26/1998");
        assert_eq!(first.hind_foot_length, Some(131.0));
        assert_eq!(first.weight, Some(1370.0));

        let second = &table.observations[1];
        assert_eq!(second.age_class, AgeClass::Adult);
        assert_eq!(second.hind_foot_length, None);
        assert_eq!(second.weight, None);
    }

    #[test]
    fn test_malformed_weight_skips_row() {
        let table = load(
            "11/26/1998,,bonrip,1A,,,131,,917,51,Population,j,f,heavy\n\
             11/26/1998,,bonbs,1A,,,120,,917,51,Population,j,m,900\n",
        );

        assert_eq!(table.observations.len(), 1);
        assert_eq!(table.warnings.len(), 1);
        assert_eq!(table.warnings[0].line, 2);
        assert!(table.warnings[0].message.contains("weight"));
    }

    #[test]
    fn test_short_row_skipped() {
        let table = load("11/26/1998,,bonrip\n");
        assert!(table.observations.is_empty());
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_header_case_and_aliases() {
        let input = "Capture_Date,SITE,Age_Class,Sex,Hind_Foot_Length,Weight\n3/4/05,bonmat,juvenile,male,99.5,NA\n";
        let table = read_observations(Cursor::new(input)).unwrap();

        assert_eq!(table.observations.len(), 1);
        assert_eq!(table.observations[0].sex, Sex::Male);
        assert_eq!(table.observations[0].hind_foot_length, Some(99.5));
    }

    #[test]
    fn test_missing_column_is_error() {
        let input = "date,grid,age,sex,weight\n";
        let err = read_observations(Cursor::new(input)).unwrap_err();
        assert!(err.to_string().contains("hindft"));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(read_observations(Cursor::new("")).is_err());
    }

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement("weight", " 42.5 ").unwrap(), Some(42.5));
        assert_eq!(parse_measurement("weight", "NA").unwrap(), None);
        assert_eq!(parse_measurement("weight", "").unwrap(), None);
        assert!(parse_measurement("weight", "inf").is_err());
        assert!(parse_measurement("weight", "12g").is_err());
    }
}
