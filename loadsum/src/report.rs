use std::path::Path;
use std::time::SystemTime;

use anyhow::Context as _;

use crate::cli::ReportArgs;
use crate::exit_codes::ExitCode;
use crate::outfile;
use crate::output;
use crate::profile_yaml;
use crate::run_error::RunError;

pub fn run(args: &ReportArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);

    let snapshot = read_snapshot(&args.snapshot).map_err(RunError::InvalidInput)?;

    let profile = match &args.profile {
        Some(path) => profile_yaml::load_profile(path).map_err(RunError::InvalidInput)?,
        None => args.scenario.profile(),
    };

    let ctx = run_context(args.url.clone(), SystemTime::now());

    let analysis = loadsum_core::analyze(Some(&snapshot), &profile)
        .map_err(|err| RunError::InvalidInput(err.into()))?;
    let report = loadsum_core::render(&profile, &analysis, &ctx);

    out.print_report(&profile, &analysis, &report)
        .map_err(RunError::RuntimeError)?;

    if let Some(dir) = &args.out_dir {
        let path = outfile::write_report_file(dir, &report.file_name(), &report.to_text())
            .map_err(RunError::RuntimeError)?;
        eprintln!("report={}", path.display());
    }

    let checks_failed = analysis.checks.results.iter().any(|c| c.fails > 0);
    let thresholds_failed = analysis.thresholds.results.iter().any(|t| !t.ok);
    Ok(ExitCode::from_quality_gates(checks_failed, thresholds_failed))
}

fn read_snapshot(path: &Path) -> anyhow::Result<loadsum_core::MetricsSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse snapshot: {}", path.display()))
}

/// Splits an RFC 3339 stamp into the date and time strings the report's
/// metadata section renders. The clock stays out of the core so report
/// bodies are reproducible for a fixed stamp.
fn run_context(target_url: Option<String>, now: SystemTime) -> loadsum_core::RunContext {
    let stamp = humantime::format_rfc3339_seconds(now).to_string();
    let (date, time) = match stamp.split_once('T') {
        Some((date, time)) => (date.to_string(), time.trim_end_matches('Z').to_string()),
        None => (stamp, String::new()),
    };

    loadsum_core::RunContext {
        target_url,
        date,
        time,
    }
}
