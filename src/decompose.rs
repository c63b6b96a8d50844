//! # Cause Decomposer
//!
//! Splits each state's model-predicted baseline total across the five causes
//! using *observed* death proportions as allocation weights. The regressor
//! predicts an aggregate; cause attribution rides on historical proportions,
//! not a cause-specific model. This deliberately assumes the cause mix is
//! stable between the observed year and the target year.
//!
//! When a state has no recorded deaths across all five causes the shares
//! fall back to an equal 1/5 split. The fallback is never silent: the state
//! is flagged on the output record and logged at warn level.

use crate::project::BaselineTable;
use crate::types::{Cause, CauseTable, State, StateCauseRecord};
use std::collections::BTreeMap;

/// One state's decomposed baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDecomposition {
    pub state: State,
    /// Baseline YPLL total in years (from the projector).
    pub baseline_total: f64,
    /// Observed cause shares; always sums to 1 across the five causes.
    pub shares: CauseTable<f64>,
    /// `baseline_total * share` per cause, in years.
    pub cause_ypll: CauseTable<f64>,
    /// True when shares came from the equal-split fallback because the state
    /// had zero recorded deaths across all five causes.
    pub fallback_allocation: bool,
}

/// Per-state decompositions, sorted by state.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub states: Vec<StateDecomposition>,
}

impl Decomposition {
    pub fn for_state(&self, state: State) -> Option<&StateDecomposition> {
        self.states.iter().find(|d| d.state == state)
    }
}

/// Decomposes per-state baseline totals into per-cause figures.
///
/// `rows` supplies the observed death counts (summed over sex strata per
/// state and cause); `baseline` supplies the totals being decomposed. A
/// cause with no rows for a state gets a zero share, not an error.
pub fn decompose(rows: &[&StateCauseRecord], baseline: &BaselineTable) -> Decomposition {
    let mut observed: BTreeMap<State, CauseTable<f64>> = BTreeMap::new();
    for record in rows {
        let table = observed.entry(record.state).or_insert_with(|| CauseTable::filled(0.0));
        table[record.cause] += record.observed_deaths;
    }

    let mut states = Vec::with_capacity(baseline.state_totals.len());
    for (&state, &baseline_total) in &baseline.state_totals {
        let deaths = observed.get(&state).copied().unwrap_or_else(|| CauseTable::filled(0.0));
        let denominator = deaths.total();

        let (shares, fallback_allocation) = if denominator > 0.0 {
            (CauseTable::from_fn(|c| deaths[c] / denominator), false)
        } else {
            log::warn!(
                "State {state} has no recorded deaths across the five tracked causes; \
                 falling back to an equal 1/5 share per cause"
            );
            (CauseTable::filled(1.0 / Cause::COUNT as f64), true)
        };

        let cause_ypll = CauseTable::from_fn(|c| baseline_total * shares[c]);

        states.push(StateDecomposition {
            state,
            baseline_total,
            shares,
            cause_ypll,
            fallback_allocation,
        });
    }

    Decomposition { states }
}
