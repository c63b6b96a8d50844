//! # Baseline Projector
//!
//! Applies the predictor adapter to the target-year rows (covariates held at
//! the most recent observed risk-factor snapshot) and aggregates the
//! predicted rates into per-state baseline totals.
//!
//! Unit discipline: the regressor outputs a YPLL *rate* per 100,000; the
//! absolute life-years for a row are `rate * population / 100,000`. Per-state
//! totals, and everything downstream of this module, are in YEARS, never
//! rates. States with no row for some cause simply contribute zero for it.
//!
//! The baseline is scenario-invariant: compute it once per dataset/model
//! load and reuse it across every scenario evaluation (the engine memoizes
//! it; recomputation would be idempotent, just wasted work).

use crate::model::{PredictorAdapter, SchemaMismatchError};
use crate::types::{Cause, Sex, State, StateCauseRecord};
use std::collections::BTreeMap;

/// The rate scale the regressor predicts on.
pub const RATE_DENOMINATOR: f64 = 100_000.0;

/// One predicted rate for a (state, sex, cause) cell. Immutable once
/// computed for a given model + dataset snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineProjection {
    pub state: State,
    pub sex: Sex,
    pub cause: Cause,
    /// Predicted YPLL rate per 100,000 for the target year. Nonnegative.
    pub ypll_rate: f64,
}

/// The memoized baseline: per-cell rates plus per-state totals in years.
#[derive(Debug, Clone)]
pub struct BaselineTable {
    pub projections: Vec<BaselineProjection>,
    /// Absolute baseline YPLL per state, in years, summed over sex and cause.
    pub state_totals: BTreeMap<State, f64>,
}

/// Projects the baseline for one year's rows.
///
/// `rows` is the target-year slice of the dataset; predictions are
/// order-preserving over it, and each row's rate is converted to absolute
/// years with that row's own (sex-specific) population before state
/// aggregation.
pub fn project_baseline(
    rows: &[&StateCauseRecord],
    adapter: &PredictorAdapter,
) -> Result<BaselineTable, SchemaMismatchError> {
    let rates = adapter.predict_records(rows)?;

    let mut projections = Vec::with_capacity(rows.len());
    let mut state_totals: BTreeMap<State, f64> = BTreeMap::new();
    for (record, &rate) in rows.iter().zip(rates.iter()) {
        projections.push(BaselineProjection {
            state: record.state,
            sex: record.sex,
            cause: record.cause,
            ypll_rate: rate,
        });
        let years = rate * record.population / RATE_DENOMINATOR;
        *state_totals.entry(record.state).or_insert(0.0) += years;
    }

    log::info!(
        "Projected baseline for {} cells across {} states",
        projections.len(),
        state_totals.len()
    );

    Ok(BaselineTable {
        projections,
        state_totals,
    })
}
