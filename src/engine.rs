//! # Projection Engine
//!
//! Owns the long-lived, read-only artifacts (dataset and trained regressor)
//! and the memoized baseline decomposition, and evaluates scenarios against
//! them. Load and reload are the explicit lifecycle: fatal errors during
//! either abort entirely; the engine presents no result rather than a
//! silently wrong one.
//!
//! Evaluation is a read-only pass over the memoized baseline, so independent
//! sessions may share one `&ProjectionEngine` concurrently; each session's
//! `ScenarioInput` and the derived outcome are its own transient values.

use crate::data::{self, DataError, Dataset};
use crate::decompose::{self, Decomposition};
use crate::model::{ModelError, PredictorAdapter, RateModel, Regressor, SchemaMismatchError};
use crate::project;
use crate::scenario::{apply_scenario, ScenarioInput};
use crate::summary::{summarize, ScenarioOutcome};
use std::path::Path;
use thiserror::Error;

/// Fatal initialization failures. Per policy these abort the load; nothing
/// here is retried because nothing here is transient.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Schema(#[from] SchemaMismatchError),
    #[error("The dataset contains no rows for the target year {year}.")]
    EmptyTargetYear { year: i32 },
}

#[derive(Debug)]
pub struct ProjectionEngine {
    dataset: Dataset,
    adapter: PredictorAdapter,
    target_year: i32,
    /// Scenario-invariant, computed once at load. Every slider move reuses it.
    decomposition: Decomposition,
}

impl ProjectionEngine {
    /// Loads the dataset and the bundled TOML model artifact, then projects
    /// and decomposes the baseline once.
    pub fn load(dataset_path: &Path, model_path: &Path, target_year: i32) -> Result<Self, EngineError> {
        let model = RateModel::load(model_path)?;
        Self::from_parts(dataset_path, model, target_year)
    }

    /// Builds an engine around any regressor runtime satisfying the adapter
    /// contract.
    pub fn from_parts(
        dataset_path: &Path,
        model: impl Regressor + 'static,
        target_year: i32,
    ) -> Result<Self, EngineError> {
        let covariates = model.schema().covariates.clone();
        let dataset = data::load_dataset(dataset_path, &covariates)?;
        let adapter = PredictorAdapter::new(model);
        let decomposition = Self::compute_baseline(&dataset, &adapter, target_year)?;
        Ok(ProjectionEngine {
            dataset,
            adapter,
            target_year,
            decomposition,
        })
    }

    fn compute_baseline(
        dataset: &Dataset,
        adapter: &PredictorAdapter,
        target_year: i32,
    ) -> Result<Decomposition, EngineError> {
        let rows = dataset.for_year(target_year);
        if rows.is_empty() {
            return Err(EngineError::EmptyTargetYear { year: target_year });
        }
        let baseline = project::project_baseline(&rows, adapter)?;
        Ok(decompose::decompose(&rows, &baseline))
    }

    /// Explicit cache invalidation: re-reads the dataset from disk and
    /// recomputes the baseline in place. On failure the engine is left
    /// untouched.
    pub fn reload(&mut self, dataset_path: &Path, target_year: i32) -> Result<(), EngineError> {
        let covariates = self.adapter.schema().covariates.clone();
        let dataset = data::load_dataset(dataset_path, &covariates)?;
        let decomposition = Self::compute_baseline(&dataset, &self.adapter, target_year)?;
        self.dataset = dataset;
        self.target_year = target_year;
        self.decomposition = decomposition;
        Ok(())
    }

    /// One synchronous recomputation pass: scale the memoized baseline by
    /// the scenario and aggregate. Infallible by construction; scenario
    /// inputs are always well-typed numerics over validated data.
    pub fn evaluate(&self, scenario: &ScenarioInput) -> ScenarioOutcome {
        let adjusted = apply_scenario(scenario, &self.decomposition);
        summarize(&self.decomposition, &adjusted)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn decomposition(&self) -> &Decomposition {
        &self.decomposition
    }

    pub fn target_year(&self) -> i32 {
        self.target_year
    }
}
