//! End-to-end scenario evaluation over a dataset CSV and a saved model
//! artifact, exercising the full load -> project -> decompose -> scale ->
//! aggregate pass.

use approx::assert_abs_diff_eq;
use ndarray::Array1;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use ypll::engine::{EngineError, ProjectionEngine};
use ypll::model::{FeatureSchema, RateModel};
use ypll::scenario::ScenarioInput;
use ypll::types::{Cause, State};

const HEADER: &str = "state,sex,cause,year,deaths,population,smoking_rate";

/// A constant-rate artifact: intercept only, so every cell predicts `rate`
/// per 100,000 regardless of covariates.
fn constant_model(rate: f64) -> RateModel {
    RateModel {
        schema: FeatureSchema {
            covariates: vec!["smoking_rate".to_string()],
            state_levels: vec!["CA".to_string(), "WY".to_string()],
            sex_levels: vec!["male".to_string(), "female".to_string(), "both".to_string()],
            cause_levels: Cause::ALL.iter().map(|c| c.short_name().to_string()).collect(),
        },
        intercept: rate,
        weights: Array1::from(vec![0.0; 5]),
    }
}

/// California at rate 48 over five 1M-person cells gives the worked example:
/// baseline_total 2400 with observed deaths {cancer 1000, heart 800,
/// stroke 300, lower_resp 200, accidents 100}. Wyoming's deaths are all
/// suppressed, forcing the equal-share fallback.
fn fixture_csv() -> String {
    let mut rows = vec![HEADER.to_string()];
    let ca_deaths = [
        ("cancer", 1000),
        ("heart_disease", 800),
        ("stroke", 300),
        ("lower_resp", 200),
        ("accidents", 100),
    ];
    for (cause, deaths) in ca_deaths {
        rows.push(format!("California,Both,{cause},2030,{deaths},1000000,11.0"));
    }
    rows.push("Wyoming,Both,cancer,2030,Suppressed,100000,14.0".to_string());
    // A historical year the target-year slice must ignore.
    rows.push("California,Both,cancer,2021,900,950000,12.5".to_string());
    rows.join("\n")
}

fn write_fixture(dir: &TempDir) -> (PathBuf, PathBuf) {
    let dataset_path = dir.path().join("df_states.csv");
    let mut file = std::fs::File::create(&dataset_path).unwrap();
    writeln!(file, "{}", fixture_csv()).unwrap();

    let model_path = dir.path().join("model.toml");
    constant_model(48.0).save(&model_path).unwrap();

    (dataset_path, model_path)
}

fn load_engine(dir: &TempDir) -> ProjectionEngine {
    let (dataset_path, model_path) = write_fixture(dir);
    ProjectionEngine::load(&dataset_path, &model_path, 2030).unwrap()
}

fn state_summary(
    outcome: &ypll::summary::ScenarioOutcome,
    state: State,
) -> ypll::summary::StateSummary {
    *outcome.states.iter().find(|s| s.state == state).unwrap()
}

#[test]
fn identity_scenario_reproduces_the_baseline_everywhere() {
    let dir = TempDir::new().unwrap();
    let engine = load_engine(&dir);
    let outcome = engine.evaluate(&ScenarioInput::identity());

    for s in &outcome.states {
        assert_abs_diff_eq!(s.adjusted_total, s.baseline_total, epsilon = 1e-9);
        assert_abs_diff_eq!(s.years_gained, 0.0, epsilon = 1e-9);
    }
    assert_abs_diff_eq!(outcome.global.total_years_gained, 0.0, epsilon = 1e-9);

    let ca = state_summary(&outcome, State::California);
    // 48 per 100k across five 1M-person cells = 2400 life-years.
    assert_abs_diff_eq!(ca.baseline_total, 2400.0, epsilon = 1e-9);
    let wy = state_summary(&outcome, State::Wyoming);
    assert_abs_diff_eq!(wy.baseline_total, 48.0, epsilon = 1e-9);
}

#[test]
fn worked_example_cancer_down_ten_percent() {
    let dir = TempDir::new().unwrap();
    let engine = load_engine(&dir);
    let scenario = ScenarioInput::identity().with_change(Cause::Cancer, -10.0);
    let outcome = engine.evaluate(&scenario);

    let ca = state_summary(&outcome, State::California);
    assert_abs_diff_eq!(ca.baseline_total, 2400.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ca.adjusted_total, 2300.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ca.years_gained, 100.0, epsilon = 1e-9);
}

#[test]
fn observed_shares_decompose_the_baseline_exactly() {
    let dir = TempDir::new().unwrap();
    let engine = load_engine(&dir);
    let ca = engine.decomposition().for_state(State::California).unwrap();

    assert!(!ca.fallback_allocation);
    assert_abs_diff_eq!(ca.shares.total(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(ca.cause_ypll[Cause::Cancer], 1000.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ca.cause_ypll[Cause::HeartDisease], 800.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ca.cause_ypll[Cause::Stroke], 300.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ca.cause_ypll[Cause::ChronicLowerRespiratory], 200.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ca.cause_ypll[Cause::Accidents], 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(ca.cause_ypll.total(), ca.baseline_total, epsilon = 1e-9);
}

#[test]
fn suppressed_state_uses_flagged_equal_shares() {
    let dir = TempDir::new().unwrap();
    let engine = load_engine(&dir);

    let wy = engine.decomposition().for_state(State::Wyoming).unwrap();
    assert!(wy.fallback_allocation);
    assert_abs_diff_eq!(wy.shares.total(), 1.0, epsilon = 1e-12);
    for (_, share) in wy.shares.iter() {
        assert_abs_diff_eq!(*share, 0.2, epsilon = 1e-12);
    }

    // The flag survives into the display summary.
    let outcome = engine.evaluate(&ScenarioInput::identity());
    assert!(state_summary(&outcome, State::Wyoming).fallback_allocation);
    assert!(!state_summary(&outcome, State::California).fallback_allocation);
}

#[test]
fn minus_one_hundred_percent_zeroes_a_cause_below_goes_negative() {
    let dir = TempDir::new().unwrap();
    let engine = load_engine(&dir);

    let at_floor = engine.evaluate(&ScenarioInput::identity().with_change(Cause::Accidents, -100.0));
    let ca = state_summary(&at_floor, State::California);
    assert_abs_diff_eq!(ca.adjusted_total, 2300.0, epsilon = 1e-9);

    // No internal clamp below -100%: accidents contributes -50 years.
    let below = engine.evaluate(&ScenarioInput::identity().with_change(Cause::Accidents, -150.0));
    let ca = state_summary(&below, State::California);
    assert_abs_diff_eq!(ca.adjusted_total, 2350.0, epsilon = 1e-9);
}

#[test]
fn global_metrics_are_consistent_with_per_state_sums() {
    let dir = TempDir::new().unwrap();
    let engine = load_engine(&dir);
    let scenario = ScenarioInput::identity()
        .with_change(Cause::Cancer, -25.0)
        .with_change(Cause::Stroke, 10.0)
        .with_change(Cause::Accidents, -5.0);
    let outcome = engine.evaluate(&scenario);

    let baseline_sum: f64 = outcome.states.iter().map(|s| s.baseline_total).sum();
    let adjusted_sum: f64 = outcome.states.iter().map(|s| s.adjusted_total).sum();
    let gained_sum: f64 = outcome.states.iter().map(|s| s.years_gained).sum();

    assert_abs_diff_eq!(outcome.global.total_baseline, baseline_sum, epsilon = 1e-9);
    assert_abs_diff_eq!(outcome.global.total_adjusted, adjusted_sum, epsilon = 1e-9);
    assert_abs_diff_eq!(outcome.global.total_years_gained, gained_sum, epsilon = 1e-9);
    assert!(!outcome.global.degenerate_baseline);

    let expected_pct = (adjusted_sum - baseline_sum) / baseline_sum * 100.0;
    assert_abs_diff_eq!(outcome.global.percent_change, expected_pct, epsilon = 1e-12);
}

#[test]
fn zero_baseline_resolves_to_the_sentinel_instead_of_faulting() {
    // A zero-rate model drives every baseline total to exactly zero.
    let dir = TempDir::new().unwrap();
    let (dataset_path, _) = write_fixture(&dir);
    let model_path = dir.path().join("zero.toml");
    constant_model(0.0).save(&model_path).unwrap();

    let engine = ProjectionEngine::load(&dataset_path, &model_path, 2030).unwrap();
    let outcome = engine.evaluate(&ScenarioInput::identity().with_change(Cause::Cancer, -10.0));
    assert!(outcome.global.degenerate_baseline);
    assert_eq!(outcome.global.percent_change, 0.0);
}

#[test]
fn historical_rows_are_excluded_from_the_target_year_slice() {
    let dir = TempDir::new().unwrap();
    let engine = load_engine(&dir);
    // Only the 2030 rows count: the 2021 California row would add 456 years.
    let outcome = engine.evaluate(&ScenarioInput::identity());
    let ca = state_summary(&outcome, State::California);
    assert_abs_diff_eq!(ca.baseline_total, 2400.0, epsilon = 1e-9);
}

#[test]
fn missing_target_year_aborts_initialization() {
    let dir = TempDir::new().unwrap();
    let (dataset_path, model_path) = write_fixture(&dir);
    let err = ProjectionEngine::load(&dataset_path, &model_path, 2099).unwrap_err();
    assert!(matches!(err, EngineError::EmptyTargetYear { year: 2099 }));
}

#[test]
fn state_missing_from_the_model_schema_aborts_initialization() {
    let dir = TempDir::new().unwrap();
    let dataset_path = dir.path().join("df_states.csv");
    let mut file = std::fs::File::create(&dataset_path).unwrap();
    // Texas has no encoding in the fixture model's state levels.
    writeln!(file, "{HEADER}\nTexas,Both,cancer,2030,500,2000000,13.0").unwrap();

    let model_path = dir.path().join("model.toml");
    constant_model(48.0).save(&model_path).unwrap();

    let err = ProjectionEngine::load(&dataset_path, &model_path, 2030).unwrap_err();
    assert!(matches!(err, EngineError::Schema(_)));
}

#[test]
fn reload_recomputes_the_memoized_baseline() {
    let dir = TempDir::new().unwrap();
    let mut engine = load_engine(&dir);
    assert_abs_diff_eq!(
        engine.evaluate(&ScenarioInput::identity()).global.total_baseline,
        2448.0,
        epsilon = 1e-9
    );

    // Double California's populations and reload from the new file.
    let updated = dir.path().join("df_states_v2.csv");
    let mut file = std::fs::File::create(&updated).unwrap();
    writeln!(
        file,
        "{HEADER}\nCalifornia,Both,cancer,2030,1000,2000000,11.0"
    )
    .unwrap();
    engine.reload(&updated, 2030).unwrap();

    let outcome = engine.evaluate(&ScenarioInput::identity());
    assert_eq!(outcome.states.len(), 1);
    assert_abs_diff_eq!(outcome.global.total_baseline, 960.0, epsilon = 1e-9);
    assert_eq!(engine.target_year(), 2030);
}
