//! Credit Fairness CLI Module
//!
//! Command-line interface for auditing model predictions stored in a dataset.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::fairness::{FairnessConfig, FairnessEvaluator, FairnessReport, DEFAULT_SENSITIVE_FEATURES};
use crate::utils::{column_to_array, drop_existing, load_data, predictions_from_scores};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString    { s.truecolor(235, 110, 100) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "credit-fairness")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fairness evaluation for credit scoring models")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate the fairness of predictions stored in a dataset
    Evaluate(EvaluateArgs),

    /// Print the default fairness configuration as JSON
    Config,

    /// Show data information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Input data file (CSV, JSON, or Parquet) with features, labels and scores
    #[arg(short, long)]
    pub data: PathBuf,

    /// Column holding the prediction scores
    #[arg(short, long, default_value = "score")]
    pub scores: String,

    /// Column holding 0/1 predictions (derived from scores when omitted)
    #[arg(short, long)]
    pub predictions: Option<String>,

    /// Decision threshold used to derive predictions from scores
    #[arg(long, default_value = "0.5")]
    pub threshold: f64,

    /// True-label column name (overrides the config file)
    #[arg(short, long)]
    pub label: Option<String>,

    /// Comma-separated sensitive attributes (defaults to the known credit attributes present)
    #[arg(long, value_delimiter = ',')]
    pub sensitive: Option<Vec<String>>,

    /// Fairness configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Random seed for the individual fairness sample
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the full report as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl EvaluateArgs {
    /// Configuration from the config file (or defaults) with CLI overrides applied
    pub fn resolve_config(&self) -> anyhow::Result<FairnessConfig> {
        let mut config = match &self.config {
            Some(path) => FairnessConfig::from_json_file(path)?,
            None => FairnessConfig::default(),
        };
        if let Some(label) = &self.label {
            config.label_column = label.clone();
        }
        if let Some(sensitive) = &self.sensitive {
            config.sensitive_features = sensitive.clone();
        }
        if let Some(seed) = self.seed {
            config.individual.seed = Some(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_evaluate(args: &EvaluateArgs) -> anyhow::Result<FairnessReport> {
    section("Evaluate");

    let config = args.resolve_config()?;

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(&args.data)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    let scores = column_to_array(&df, &args.scores)?;
    let predictions = match &args.predictions {
        Some(col) => column_to_array(&df, col)?,
        None => predictions_from_scores(&scores, args.threshold),
    };

    let mut model_columns = vec![args.scores.as_str()];
    if let Some(col) = &args.predictions {
        model_columns.push(col.as_str());
    }
    let features = drop_existing(&df, &model_columns);

    step_run("Evaluating fairness");
    let start = Instant::now();
    let report = FairnessEvaluator::new(config).evaluate_dataset(&features, &predictions, &scores)?;
    step_done(&format!("{:?}", start.elapsed()));

    print_report(&report);

    if let Some(path) = &args.output {
        write_report(&report, path)?;
        println!("  {} {}", ok("✓"), format!("Report written to {}", path.display()));
        println!();
    }

    Ok(report)
}

pub fn cmd_config() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&FairnessConfig::default())?);
    Ok(())
}

pub fn cmd_info(data_path: &PathBuf) -> anyhow::Result<()> {
    section("Data Info");

    let df = load_data(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!("  {:<20} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(50)));

    for col in df.get_columns() {
        let marker = if DEFAULT_SENSITIVE_FEATURES.contains(&col.name().as_str()) {
            accent(" sensitive")
        } else {
            "".normal()
        };
        println!(
            "  {:<20} {:<12} {:>6} {:>8}{}",
            col.name(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0),
            marker
        );
    }

    println!();
    Ok(())
}

fn write_report(report: &FairnessReport, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, report.to_json_pretty()?)?;
    Ok(())
}

fn print_report(report: &FairnessReport) {
    if let Some(warning) = &report.warning {
        println!();
        println!("  {} {}", "!".yellow(), warning.yellow());
    }

    let verdict = if report.is_fair { ok("FAIR") } else { bad("UNFAIR") };
    println!();
    println!("  {:<16} {}", muted("Score"), format!("{:.1}", report.overall_score).white().bold());
    println!("  {:<16} {}", muted("Verdict"), verdict);
    println!(
        "  {:<16} {:.3} {}",
        muted("Individual"),
        report.individual_fairness.violation_rate,
        dim(&format!("({} similar pairs)", report.individual_fairness.pairs_evaluated))
    );

    if !report.group_fairness.is_empty() {
        section("Group fairness");
        println!(
            "  {:<18} {:>7} {:>8} {:>8} {:>8}",
            muted("Attribute"), muted("Groups"), muted("DP diff"), muted("EO diff"), muted("DP ratio")
        );
        for attr in &report.group_fairness {
            match &attr.fairness_metrics {
                Some(fm) => println!(
                    "  {:<18} {:>7} {:>8.3} {:>8.3} {:>8.3}",
                    attr.attribute,
                    attr.group_metrics.len(),
                    fm.demographic_parity_difference,
                    fm.equalized_odds_difference,
                    fm.demographic_parity_ratio
                ),
                None => println!(
                    "  {:<18} {:>7} {:>8}",
                    attr.attribute,
                    attr.group_metrics.len(),
                    dim("n/a")
                ),
            }
        }
    }

    if !report.violations.is_empty() {
        section("Violations");
        for v in &report.violations {
            println!("  {} {}", bad("✗"), v);
        }
    }

    if !report.recommendations.is_empty() {
        section("Recommendations");
        for r in &report.recommendations {
            println!("  {} {}", accent("›"), r);
        }
    }
    println!();
}
