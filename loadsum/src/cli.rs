use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use loadsum_core::ScenarioProfile;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Render the full text report to stdout.
    HumanReadable,
    /// Emit one structured JSON line to stdout.
    Json,
}

/// Built-in scenario profiles, one per supported test shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenarioKind {
    Baseline,
    Stress,
    Navigation,
    Spike,
}

impl ScenarioKind {
    pub fn profile(self) -> ScenarioProfile {
        match self {
            Self::Baseline => ScenarioProfile::baseline(),
            Self::Stress => ScenarioProfile::stress(),
            Self::Navigation => ScenarioProfile::navigation(),
            Self::Spike => ScenarioProfile::spike(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "loadsum",
    author,
    version,
    about = "Synthesize performance reports from load-test metrics snapshots",
    long_about = "loadsum turns the finalized metrics snapshot a load generator emits at the end of a run into a structured, human-readable performance report.\n\nThe snapshot is a JSON document with request counters, latency aggregates, check results and threshold outcomes. Any subset of fields may be absent; missing values degrade to zeros and empty sections, never to an error.\n\nScenario profiles supply the thresholds, latency bands and recommendation templates the report is scored against. Pick a built-in profile with --scenario or load a custom one with --profile.",
    after_help = "Examples:\n  loadsum report summary.json\n  loadsum report summary.json --scenario stress --url https://example.com\n  loadsum report summary.json --profile soak.yaml --out-dir reports/\n  loadsum report summary.json --output json\n  loadsum scenarios"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synthesize a report from a metrics snapshot
    #[command(
        long_about = "Read a snapshot JSON file, score it against a scenario profile and print the resulting report.\n\nThe exit code reflects the run's quality gates: 10 when any check failed, 11 when any threshold was missed, 12 for both."
    )]
    Report(ReportArgs),

    /// List the built-in scenario profiles
    Scenarios,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Path to the snapshot (.json) produced by the load generator
    pub snapshot: PathBuf,

    /// Built-in scenario profile to score against
    #[arg(long, value_enum, default_value_t = ScenarioKind::Baseline, conflicts_with = "profile")]
    pub scenario: ScenarioKind,

    /// Custom scenario profile (.yaml) instead of a built-in one
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Target URL shown in the report's metadata section
    #[arg(long)]
    pub url: Option<String>,

    /// Directory to additionally write the report file into
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}
