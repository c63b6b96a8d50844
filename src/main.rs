//! Thin presentation shim over the projection engine: loads the dataset and
//! model artifact, evaluates one scenario from command-line flags, writes the
//! per-state table as TSV and prints the global summary. All computation
//! lives in the library; this binary is plumbing only.

use clap::{Parser, Subcommand};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use ypll::engine::ProjectionEngine;
use ypll::scenario::ScenarioInput;
use ypll::types::Cause;

#[derive(Parser)]
#[command(
    name = "ypll",
    about = "Project Years of Potential Life Lost across U.S. states under cause-specific scenarios"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one scenario against the projected baseline
    #[command(about = "Project the baseline and apply per-cause percent changes")]
    Project {
        /// Path to the projection CSV (state, sex, cause, year, deaths, population, covariates)
        dataset: PathBuf,

        /// Path to the trained model artifact (.toml)
        #[arg(long)]
        model: PathBuf,

        /// Target projection year
        #[arg(long, default_value = "2030")]
        year: i32,

        /// Percent change in cancer deaths (negative = reduction)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        cancer: f64,

        /// Percent change in heart disease deaths
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        heart_disease: f64,

        /// Percent change in stroke deaths
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        stroke: f64,

        /// Percent change in chronic lower respiratory disease deaths
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        lower_resp: f64,

        /// Percent change in accident deaths
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        accidents: f64,

        /// Where to write the per-state TSV (defaults to states.tsv)
        #[arg(long, default_value = "states.tsv")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Project {
            dataset,
            model,
            year,
            cancer,
            heart_disease,
            stroke,
            lower_resp,
            accidents,
            output,
        } => {
            let scenario = ScenarioInput::identity()
                .with_change(Cause::Cancer, cancer)
                .with_change(Cause::HeartDisease, heart_disease)
                .with_change(Cause::Stroke, stroke)
                .with_change(Cause::ChronicLowerRespiratory, lower_resp)
                .with_change(Cause::Accidents, accidents);
            project_command(&dataset, &model, year, &scenario, &output)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn project_command(
    dataset_path: &std::path::Path,
    model_path: &std::path::Path,
    year: i32,
    scenario: &ScenarioInput,
    output_path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ProjectionEngine::load(dataset_path, model_path, year)?;
    let outcome = engine.evaluate(scenario);

    write_state_table(&outcome, output_path)?;
    println!("Per-state table written to: {}", output_path.display());

    println!("Target year:        {year}");
    println!("Total baseline:     {:>14.0} life-years", outcome.global.total_baseline);
    println!("Total adjusted:     {:>14.0} life-years", outcome.global.total_adjusted);
    println!("Total years gained: {:>14.0}", outcome.global.total_years_gained);
    if outcome.global.degenerate_baseline {
        println!("Relative change:    undefined (zero baseline)");
    } else {
        println!("Relative change:    {:>13.1} %", outcome.global.percent_change);
    }

    let fallback: Vec<&str> = outcome
        .states
        .iter()
        .filter(|s| s.fallback_allocation)
        .map(|s| s.state.abbrev())
        .collect();
    if !fallback.is_empty() {
        println!(
            "Note: equal-share cause allocation used for {} (no recorded deaths)",
            fallback.join(", ")
        );
    }

    Ok(())
}

fn write_state_table(
    outcome: &ypll::summary::ScenarioOutcome,
    path: &std::path::Path,
) -> Result<(), std::io::Error> {
    let mut file = BufWriter::new(std::fs::File::create(path)?);
    writeln!(file, "state\tbaseline_total\tadjusted_total\tyears_gained\tfallback_allocation")?;
    for s in &outcome.states {
        writeln!(
            file,
            "{}\t{:.2}\t{:.2}\t{:.2}\t{}",
            s.state, s.baseline_total, s.adjusted_total, s.years_gained, s.fallback_allocation
        )?;
    }
    Ok(())
}
