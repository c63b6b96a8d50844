//! # Dataset Loading and Validation
//!
//! This module is the exclusive entry point for the projection dataset. It
//! reads the state-year-cause panel (CSV), validates it against a strict
//! schema, and converts it into typed [`StateCauseRecord`] rows for the
//! statistical core.
//!
//! - Strict Schema: the base columns `state`, `sex`, `cause`, `year`,
//!   `deaths`, `population` are not configurable; the risk-factor covariate
//!   columns are dictated by the trained model's feature schema.
//! - User-Centric Errors: failures are assumed to be user-input errors. The
//!   `DataError` enum is designed to give clear, actionable feedback.
//! - Suppression handling: CDC WONDER reports small death counts as the
//!   literal string `Suppressed`; those coerce to zero rather than failing.
//!
//! The returned [`Dataset`] is loaded once and treated as immutable for the
//! process lifetime. Reloading means calling [`load_dataset`] again.

use crate::types::{Cause, Sex, State, StateCauseRecord};
use itertools::Itertools;
use polars::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Base columns every projection table must carry, before covariates.
const BASE_COLUMNS: [&str; 6] = ["state", "sex", "cause", "year", "deaths", "population"];

/// A comprehensive error type for all dataset loading and validation failures.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Error from the underlying Polars DataFrame library: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error(
        "The required column '{0}' was not found in the input file. Please check spelling and case."
    )]
    ColumnNotFound(String),
    #[error(
        "The required column '{column_name}' could not be converted to the expected type '{expected_type}'. (Found type: {found_type})"
    )]
    ColumnWrongType {
        column_name: String,
        expected_type: &'static str,
        found_type: String,
    },
    #[error(
        "Missing or null values were found in the required column '{0}'. This tool requires complete data with no missing values."
    )]
    MissingValuesFound(String),
    #[error(
        "Non-finite values (NaN or Infinity) were found in the required column '{0}'. This tool requires all data to be finite."
    )]
    NonFiniteValuesFound(String),
    #[error("Row {row}: {message}")]
    UnknownLabel { row: usize, message: String },
    #[error(
        "Row {row}: population must be positive to serve as a rate denominator, found {value}."
    )]
    NonPositivePopulation { row: usize, value: f64 },
    #[error("The input file contains no rows for any of the five tracked causes.")]
    NoTrackedCauses,
}

/// The loaded, validated projection table. Immutable after construction.
#[derive(Debug)]
pub struct Dataset {
    rows: Vec<StateCauseRecord>,
    covariate_names: Vec<String>,
}

impl Dataset {
    pub fn rows(&self) -> &[StateCauseRecord] {
        &self.rows
    }

    /// Covariate column names, in the order each record stores its values.
    pub fn covariate_names(&self) -> &[String] {
        &self.covariate_names
    }

    /// All distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.year).sorted_unstable().dedup().collect()
    }

    /// The rows belonging to one year (the projector consumes the
    /// target-year slice).
    pub fn for_year(&self, year: i32) -> Vec<&StateCauseRecord> {
        self.rows.iter().filter(|r| r.year == year).collect()
    }
}

/// Loads and validates the projection table.
///
/// `covariate_names` comes from the trained model's feature schema; every
/// named covariate must be present as a numeric column. Rows whose cause
/// label is outside the five tracked causes are filtered out.
pub fn load_dataset(path: &Path, covariate_names: &[String]) -> Result<Dataset, DataError> {
    log::info!("Loading projection dataset from '{}'", path.display());

    let df = CsvReader::new(File::open(path)?)
        .with_options(CsvReadOptions::default().with_has_header(true))
        .finish()?;

    // Verify all required columns exist before touching any values.
    let columns_set: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();
    for col_name in BASE_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .chain(covariate_names.iter().cloned())
    {
        if !columns_set.contains(&col_name) {
            return Err(DataError::ColumnNotFound(col_name));
        }
    }

    let states = internal::extract_string_column(&df, "state")?;
    let sexes = internal::extract_string_column(&df, "sex")?;
    let causes = internal::extract_string_column(&df, "cause")?;
    let years = internal::extract_numeric_column(&df, "year")?;
    let deaths = internal::extract_death_counts(&df)?;
    let populations = internal::extract_numeric_column(&df, "population")?;

    let mut covariate_columns: Vec<Vec<f64>> = Vec::with_capacity(covariate_names.len());
    for name in covariate_names {
        covariate_columns.push(internal::extract_numeric_column(&df, name)?);
    }

    let n = df.height();
    let mut rows = Vec::with_capacity(n);
    let mut skipped_untracked = 0usize;
    for i in 0..n {
        // Rows for causes outside the tracked five are dropped, not an error.
        let Some(cause) = Cause::parse_label(&causes[i]) else {
            skipped_untracked += 1;
            continue;
        };
        let state = State::parse_label(&states[i])
            .map_err(|message| DataError::UnknownLabel { row: i + 1, message })?;
        let sex = Sex::parse_label(&sexes[i])
            .map_err(|message| DataError::UnknownLabel { row: i + 1, message })?;
        let population = populations[i];
        if population <= 0.0 {
            return Err(DataError::NonPositivePopulation {
                row: i + 1,
                value: population,
            });
        }
        rows.push(StateCauseRecord {
            state,
            sex,
            cause,
            year: years[i] as i32,
            observed_deaths: deaths[i],
            population,
            covariates: covariate_columns.iter().map(|col| col[i]).collect(),
        });
    }

    if rows.is_empty() {
        return Err(DataError::NoTrackedCauses);
    }

    log::info!(
        "Loaded {} rows ({} untracked-cause rows filtered out)",
        rows.len(),
        skipped_untracked
    );

    Ok(Dataset {
        rows,
        covariate_names: covariate_names.to_vec(),
    })
}

/// Internal module for column extraction helpers.
mod internal {
    use super::*;

    pub(super) fn extract_numeric_column(
        df: &DataFrame,
        column_name: &str,
    ) -> Result<Vec<f64>, DataError> {
        let series = df.column(column_name)?;
        if series.null_count() > 0 {
            return Err(DataError::MissingValuesFound(column_name.to_string()));
        }

        let casted = match series.cast(&DataType::Float64) {
            Ok(casted) => casted,
            Err(_) => {
                return Err(DataError::ColumnWrongType {
                    column_name: column_name.to_string(),
                    expected_type: "f64 (numeric)",
                    found_type: format!("{:?}", series.dtype()),
                });
            }
        };

        if casted.null_count() > 0 {
            return Err(DataError::ColumnWrongType {
                column_name: column_name.to_string(),
                expected_type: "f64 (numeric)",
                found_type: format!("{:?}", series.dtype()),
            });
        }

        let chunked = casted.f64()?.rechunk();
        let values: Vec<f64> = chunked.into_no_null_iter().collect();
        if values.iter().any(|&v| !v.is_finite()) {
            return Err(DataError::NonFiniteValuesFound(column_name.to_string()));
        }
        Ok(values)
    }

    pub(super) fn extract_string_column(
        df: &DataFrame,
        column_name: &str,
    ) -> Result<Vec<String>, DataError> {
        let series = df.column(column_name)?;
        if series.null_count() > 0 {
            return Err(DataError::MissingValuesFound(column_name.to_string()));
        }

        let casted = series.cast(&DataType::String).map_err(|_| DataError::ColumnWrongType {
            column_name: column_name.to_string(),
            expected_type: "string",
            found_type: format!("{:?}", series.dtype()),
        })?;
        let chunked = casted.str()?.rechunk();
        Ok(chunked.into_no_null_iter().map(|s| s.to_string()).collect())
    }

    /// Death counts need special handling: CDC WONDER emits the literal
    /// string `Suppressed` for small cells, which coerces to 0.0. Nulls in a
    /// numeric deaths column also coerce to 0.0.
    pub(super) fn extract_death_counts(df: &DataFrame) -> Result<Vec<f64>, DataError> {
        let series = df.column("deaths")?;
        if matches!(series.dtype(), DataType::String) {
            let chunked = series.str()?.rechunk();
            let values = chunked
                .into_iter()
                .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0))
                .collect();
            return Ok(values);
        }

        let casted = series.cast(&DataType::Float64).map_err(|_| DataError::ColumnWrongType {
            column_name: "deaths".to_string(),
            expected_type: "f64 (numeric) or 'Suppressed'",
            found_type: format!("{:?}", series.dtype()),
        })?;
        let chunked = casted.f64()?.rechunk();
        Ok(chunked.into_iter().map(|v| v.unwrap_or(0.0)).collect())
    }
}
