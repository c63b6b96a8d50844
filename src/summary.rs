//! # Result Aggregator
//!
//! Reduces the baseline decomposition and a scenario's adjusted figures to
//! the per-state and global summary metrics the presentation layer displays.
//!
//! Years gained is `baseline - adjusted`: positive means improvement. The
//! global percent change guards against a zero baseline total by resolving
//! to the sentinel 0.0 (and marking the summary degenerate) instead of
//! propagating an arithmetic fault.

use crate::decompose::Decomposition;
use crate::scenario::AdjustedState;
use crate::types::State;

/// Per-state display metrics, all in years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSummary {
    pub state: State,
    pub baseline_total: f64,
    pub adjusted_total: f64,
    /// `baseline_total - adjusted_total`; positive = life-years gained.
    pub years_gained: f64,
    /// Carried through from the decomposer so the presentation layer can
    /// mark states whose cause split used the equal-share fallback.
    pub fallback_allocation: bool,
}

/// Global summary metrics across all states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSummary {
    pub total_baseline: f64,
    pub total_adjusted: f64,
    pub total_years_gained: f64,
    /// `(adjusted - baseline) / baseline * 100`, or the 0.0 sentinel when the
    /// baseline total is zero.
    pub percent_change: f64,
    /// True when `percent_change` is the zero-baseline sentinel.
    pub degenerate_baseline: bool,
}

/// The full output of one scenario evaluation.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// Sorted by state.
    pub states: Vec<StateSummary>,
    pub global: GlobalSummary,
}

impl ScenarioOutcome {
    /// Min/max of per-state baseline totals, the anchor for choropleth color
    /// scales (the adjusted map is drawn on the baseline's range so sliding
    /// a cause visibly lightens states). `None` when there are no states.
    pub fn baseline_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.states.iter().map(|s| s.baseline_total);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

/// Reduces one scenario's adjusted figures against the baseline.
///
/// `adjusted` must come from `apply_scenario` over the same decomposition,
/// so the two run in lockstep state order.
pub fn summarize(decomposition: &Decomposition, adjusted: &[AdjustedState]) -> ScenarioOutcome {
    debug_assert_eq!(decomposition.states.len(), adjusted.len());

    let states: Vec<StateSummary> = decomposition
        .states
        .iter()
        .zip(adjusted.iter())
        .map(|(d, a)| StateSummary {
            state: d.state,
            baseline_total: d.baseline_total,
            adjusted_total: a.adjusted_total,
            years_gained: d.baseline_total - a.adjusted_total,
            fallback_allocation: d.fallback_allocation,
        })
        .collect();

    let total_baseline: f64 = states.iter().map(|s| s.baseline_total).sum();
    let total_adjusted: f64 = states.iter().map(|s| s.adjusted_total).sum();
    let degenerate_baseline = total_baseline == 0.0;
    let percent_change = if degenerate_baseline {
        0.0
    } else {
        (total_adjusted - total_baseline) / total_baseline * 100.0
    };

    ScenarioOutcome {
        states,
        global: GlobalSummary {
            total_baseline,
            total_adjusted,
            total_years_gained: total_baseline - total_adjusted,
            percent_change,
            degenerate_baseline,
        },
    }
}
