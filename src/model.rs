//! # Trained Regressor Artifact and Predictor Adapter
//!
//! The projection core treats the trained mortality regressor as an opaque
//! capability: rows of features in, one YPLL rate per 100,000 out. The
//! [`Regressor`] trait is that seam; any model runtime satisfying it plugs
//! in. The bundled [`RateModel`] is the distilled artifact produced by the
//! (out-of-scope) training pipeline, serialized to a human-readable TOML
//! file with `save`/`load`.
//!
//! The [`PredictorAdapter`] performs no retraining and no feature
//! engineering. Its sole jobs are to validate that each record matches the
//! schema the regressor was trained on (same named covariates, same
//! categorical encodings) and to clamp negative raw predictions to zero: a
//! rate cannot be negative. The clamp is a policy decision layered on the
//! model output, not an invariant of the raw artifact.

use crate::types::{Cause, Sex, State, StateCauseRecord};
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// The feature layout a regressor was trained on.
///
/// The design matrix column order is fixed: encoded state, encoded sex,
/// encoded cause, year, then the named numeric covariates in `covariates`
/// order. Categorical encodings are the label-to-index maps frozen at
/// training time; a label absent from its level list cannot be encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Named numeric covariate columns, in training order.
    pub covariates: Vec<String>,
    /// USPS state codes in training encoding order.
    pub state_levels: Vec<String>,
    /// Sex labels in training encoding order.
    pub sex_levels: Vec<String>,
    /// Cause short names in training encoding order.
    pub cause_levels: Vec<String>,
}

impl FeatureSchema {
    /// Number of design matrix columns: three categoricals + year + covariates.
    pub fn design_width(&self) -> usize {
        4 + self.covariates.len()
    }

    fn encode_level(levels: &[String], label: &str) -> Option<f64> {
        levels.iter().position(|l| l.as_str() == label).map(|i| i as f64)
    }

    pub fn encode_state(&self, state: State) -> Result<f64, SchemaMismatchError> {
        Self::encode_level(&self.state_levels, state.abbrev()).ok_or_else(|| {
            SchemaMismatchError::UnknownState {
                label: state.abbrev().to_string(),
            }
        })
    }

    pub fn encode_sex(&self, sex: Sex) -> Result<f64, SchemaMismatchError> {
        Self::encode_level(&self.sex_levels, sex.label()).ok_or_else(|| {
            SchemaMismatchError::UnknownSex {
                label: sex.label().to_string(),
            }
        })
    }

    pub fn encode_cause(&self, cause: Cause) -> Result<f64, SchemaMismatchError> {
        Self::encode_level(&self.cause_levels, cause.short_name()).ok_or_else(|| {
            SchemaMismatchError::UnknownCause {
                label: cause.short_name().to_string(),
            }
        })
    }
}

/// Raised when input rows do not match the schema the regressor was trained
/// on. Fatal to the projection: the core never silently substitutes defaults.
#[derive(Error, Debug)]
pub enum SchemaMismatchError {
    #[error("State '{label}' has no encoding in the model's feature schema.")]
    UnknownState { label: String },
    #[error("Sex label '{label}' has no encoding in the model's feature schema.")]
    UnknownSex { label: String },
    #[error("Cause '{label}' has no encoding in the model's feature schema.")]
    UnknownCause { label: String },
    #[error(
        "A record carries {found} covariates but the model's schema names {expected}. The dataset and model were built against different feature sets."
    )]
    CovariateCountMismatch { found: usize, expected: usize },
}

/// The opaque-regressor seam. Implementations own a trained artifact and
/// evaluate it over a prebuilt design matrix; they never see raw records.
pub trait Regressor {
    fn schema(&self) -> &FeatureSchema;

    /// One prediction per input row, order-preserving. Output unit is YPLL
    /// rate per 100,000 population for the target year. Raw outputs may be
    /// negative; the adapter applies the clamp.
    fn predict_rows(&self, x: ArrayView2<f64>) -> Array1<f64>;
}

/// The bundled trained artifact: a gradient-boosted mortality model distilled
/// by the training pipeline to an additive form (intercept plus one weight
/// per design column). Saved to and loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateModel {
    pub schema: FeatureSchema,
    pub intercept: f64,
    /// One weight per design matrix column, in `FeatureSchema` column order.
    pub weights: Array1<f64>,
}

/// Custom error type for model loading and saving.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read or write model file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML model file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize model to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error(
        "Model artifact is incoherent: {found} weights for a {expected}-column feature schema."
    )]
    WeightCountMismatch { found: usize, expected: usize },
}

impl RateModel {
    /// Saves the artifact to a human-readable TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        Ok(())
    }

    /// Loads an artifact from a TOML file, rejecting incoherent weights.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let toml_string = fs::read_to_string(path)?;
        let model: RateModel = toml::from_str(&toml_string)?;
        if model.weights.len() != model.schema.design_width() {
            return Err(ModelError::WeightCountMismatch {
                found: model.weights.len(),
                expected: model.schema.design_width(),
            });
        }
        Ok(model)
    }
}

impl Regressor for RateModel {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_rows(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.dot(&self.weights) + self.intercept
    }
}

/// Wraps a trained regressor behind schema validation and the nonnegativity
/// clamp. Pure over its artifact: no side effects, no internal state.
pub struct PredictorAdapter {
    model: Box<dyn Regressor>,
}

impl std::fmt::Debug for PredictorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorAdapter").finish_non_exhaustive()
    }
}

impl PredictorAdapter {
    pub fn new(model: impl Regressor + 'static) -> Self {
        PredictorAdapter {
            model: Box::new(model),
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.model.schema()
    }

    /// Predicts a YPLL rate per 100,000 for each record, order-preserving.
    ///
    /// Every record is validated against the model's feature schema before
    /// any prediction runs; a mismatch fails the whole call. Negative raw
    /// outputs are clamped to zero.
    pub fn predict_records(
        &self,
        records: &[&StateCauseRecord],
    ) -> Result<Array1<f64>, SchemaMismatchError> {
        let schema = self.model.schema();
        let width = schema.design_width();
        let mut buffer = Vec::with_capacity(records.len() * width);
        for record in records {
            if record.covariates.len() != schema.covariates.len() {
                return Err(SchemaMismatchError::CovariateCountMismatch {
                    found: record.covariates.len(),
                    expected: schema.covariates.len(),
                });
            }
            buffer.push(schema.encode_state(record.state)?);
            buffer.push(schema.encode_sex(record.sex)?);
            buffer.push(schema.encode_cause(record.cause)?);
            buffer.push(record.year as f64);
            buffer.extend_from_slice(&record.covariates);
        }

        let x = Array2::from_shape_vec((records.len(), width), buffer)
            .expect("design matrix rows have uniform width by construction");

        let mut predictions = self.model.predict_rows(x.view());
        let mut clamped = 0usize;
        predictions.mapv_inplace(|p| {
            if p < 0.0 {
                clamped += 1;
                0.0
            } else {
                p
            }
        });
        if clamped > 0 {
            log::debug!("Clamped {clamped} negative predicted rates to zero");
        }
        Ok(predictions)
    }
}
