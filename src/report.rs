//! Per-day CSV reporting of aggregate counts.
//!
//! A report is a CSV file with one row per simulated day. Rows are flushed as they are written so
//! an interrupted run still leaves a readable file behind.

use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use log::{info, trace};
use serde::{Deserialize, Serialize};

use crate::disease::Day;
use crate::error::EpiError;
use crate::tracker::DaySummary;

/// The file name of the daily counts report, before the prefix is applied.
pub const DAILY_COUNTS_REPORT: &str = "daily_counts.csv";

/// Where and how reports are written.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            directory: PathBuf::from("."),
            file_prefix: String::new(),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    pub fn directory(&mut self, directory: PathBuf) -> &mut Self {
        self.directory = directory;
        self
    }

    pub fn file_prefix(&mut self, file_prefix: String) -> &mut Self {
        self.file_prefix = file_prefix;
        self
    }

    pub fn overwrite(&mut self, overwrite: bool) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn path_for(&self, report_name: &str) -> PathBuf {
        self.directory
            .join(format!("{}{}", self.file_prefix, report_name))
    }
}

/// One row of the daily counts report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCountsRecord {
    pub day: Day,
    pub susceptible: usize,
    pub infected: usize,
    pub immune: usize,
    pub dead: usize,
    pub cases: usize,
    pub population: usize,
    pub new_infections: usize,
    pub new_deaths: usize,
    pub new_immunities: usize,
    pub reversions: usize,
}

impl DailyCountsRecord {
    #[must_use]
    pub fn new(summary: &DaySummary, population: usize) -> Self {
        DailyCountsRecord {
            day: summary.day,
            susceptible: summary.counts.susceptible,
            infected: summary.counts.infected,
            immune: summary.counts.immune,
            dead: summary.counts.dead,
            cases: summary.cases,
            population,
            new_infections: summary.new_infections,
            new_deaths: summary.new_deaths,
            new_immunities: summary.new_immunities,
            reversions: summary.reversions,
        }
    }
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, EpiError> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
        return Err(EpiError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        ));
    }
    if path.exists() && !overwrite {
        return Err(EpiError::ReportError(format!(
            "File already exists: {}. Please set `overwrite` to true in the file configuration and rerun.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Writes one [`DailyCountsRecord`] per simulated day.
pub struct DailyReport {
    writer: Writer<File>,
    path: PathBuf,
}

impl DailyReport {
    /// Creates the report file described by `options`.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` if the file exists and `overwrite` is off, or cannot be created.
    pub fn create(options: &ReportOptions) -> Result<Self, EpiError> {
        let path = options.path_for(DAILY_COUNTS_REPORT);
        let file = generate_validate_filepath(&path, options.overwrite)?;
        info!("writing daily counts to {}", path.display());
        Ok(DailyReport {
            writer: Writer::from_writer(file),
            path,
        })
    }

    /// Appends the row for one day.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` if the row cannot be written.
    pub fn record(&mut self, summary: &DaySummary, population: usize) -> Result<(), EpiError> {
        trace!("reporting day {}", summary.day);
        self.writer
            .serialize(DailyCountsRecord::new(summary, population))?;
        self.writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
