//! # Scenario Scaler
//!
//! Rescales each cause's baseline YPLL by a user-supplied percentage change:
//! `adjusted = baseline_cause_ypll * (1 + pct/100)`. Pure, deterministic and
//! stateless across calls; each evaluation ignores any previous scenario.
//!
//! Policy: the core applies NO clamp to adjusted values. A percent change
//! below -100 produces a negative adjusted YPLL; whether to clamp that to
//! zero is a presentation-layer decision layered on top of this module.
//! Slider bounds are likewise a UI concern: any real value is accepted here
//! and the formula is applied verbatim.

use crate::decompose::Decomposition;
use crate::types::{Cause, CauseTable, State};

/// Per-cause percentage changes for one scenario evaluation. Ephemeral:
/// supplied per user interaction and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioInput {
    percent_change: CauseTable<f64>,
}

impl ScenarioInput {
    /// The no-op scenario: every cause at 0% change.
    pub fn identity() -> Self {
        ScenarioInput {
            percent_change: CauseTable::filled(0.0),
        }
    }

    pub fn new(percent_change: CauseTable<f64>) -> Self {
        ScenarioInput { percent_change }
    }

    /// Builder-style single-cause override.
    pub fn with_change(mut self, cause: Cause, pct: f64) -> Self {
        self.percent_change[cause] = pct;
        self
    }

    pub fn percent_change(&self, cause: Cause) -> f64 {
        self.percent_change[cause]
    }

    /// The multiplicative factor applied to a cause's baseline YPLL.
    fn factor(&self, cause: Cause) -> f64 {
        1.0 + self.percent_change[cause] / 100.0
    }
}

/// One state's rescaled projection.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedState {
    pub state: State,
    /// Per-cause adjusted YPLL in years. May be negative below -100%.
    pub adjusted_by_cause: CauseTable<f64>,
    /// Sum over the five causes, in years.
    pub adjusted_total: f64,
}

/// Applies a scenario to a decomposed baseline. Output order matches the
/// decomposition's state order.
pub fn apply_scenario(input: &ScenarioInput, decomposition: &Decomposition) -> Vec<AdjustedState> {
    decomposition
        .states
        .iter()
        .map(|d| {
            let adjusted_by_cause = CauseTable::from_fn(|c| d.cause_ypll[c] * input.factor(c));
            AdjustedState {
                state: d.state,
                adjusted_total: adjusted_by_cause.total(),
                adjusted_by_cause,
            }
        })
        .collect()
}
