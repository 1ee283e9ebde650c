use std::fmt::Write as _;
use std::time::Duration;

use crate::checks::{self, CheckReport};
use crate::classify::{self, Anomaly, Classification};
use crate::error::Result;
use crate::profile::ScenarioProfile;
use crate::snapshot::MetricsSnapshot;
use crate::stats::{self, DerivedStats};
use crate::thresholds::{self, ThresholdReport};

const BANNER_WIDTH: usize = 80;
const KEY_WIDTH: usize = 28;

/// Presentation inputs supplied by the caller. Keeping the clock out of the
/// core makes synthesis deterministic: identical `(snapshot, profile,
/// context)` triples produce byte-identical reports.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub target_url: Option<String>,
    pub date: String,
    pub time: String,
}

/// An ordered, named block of report lines.
#[derive(Debug, Clone)]
pub struct ReportSection {
    /// `None` for banner blocks, which carry their own rule lines.
    pub heading: Option<String>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub sections: Vec<ReportSection>,
    /// Derived identifier: scenario slug plus the caller's run stamp,
    /// sanitized for filesystem use.
    pub file_token: String,
}

impl Report {
    /// Serializes the ordered sections into the final document.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if let Some(heading) = &section.heading {
                writeln!(&mut out, "{heading}").ok();
                writeln!(&mut out, "{}", "-".repeat(heading.len())).ok();
            }
            for line in &section.lines {
                writeln!(&mut out, "{line}").ok();
            }
            out.push('\n');
        }
        out
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.file_token)
    }
}

/// Evaluator and classifier outputs for one run, kept separate from the
/// rendered document so structured sinks can serialize them directly.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub stats: DerivedStats,
    pub checks: CheckReport,
    pub thresholds: ThresholdReport,
    pub classification: Classification,
}

/// Runs the extractor, evaluators and classifier over one snapshot.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidProfile`] when the profile fails
/// structural validation; the snapshot itself cannot fail.
pub fn analyze(snapshot: Option<&MetricsSnapshot>, profile: &ScenarioProfile) -> Result<Analysis> {
    profile.validate()?;

    let stats = stats::derive(snapshot);
    let checks = snapshot
        .map(|s| checks::evaluate(s, &profile.check_bands))
        .unwrap_or_default();
    let thresholds = snapshot
        .map(|s| thresholds::evaluate(s, &profile.threshold_texts))
        .unwrap_or_default();
    let vu_samples = snapshot.map(|s| s.vu_samples.as_slice()).unwrap_or(&[]);

    let classification = classify::classify(&stats, &checks, &thresholds, vu_samples, profile);

    Ok(Analysis {
        stats,
        checks,
        thresholds,
        classification,
    })
}

/// Full pipeline: analyze, then render.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidProfile`] when the profile fails
/// structural validation.
pub fn synthesize(
    snapshot: Option<&MetricsSnapshot>,
    profile: &ScenarioProfile,
    ctx: &RunContext,
) -> Result<Report> {
    let analysis = analyze(snapshot, profile)?;
    Ok(render(profile, &analysis, ctx))
}

/// Assembles the fixed section sequence. Sections are never dropped: empty
/// underlying lists render an explicit line instead.
#[must_use]
pub fn render(profile: &ScenarioProfile, analysis: &Analysis, ctx: &RunContext) -> Report {
    let mut sections = Vec::new();

    sections.push(banner("LOAD TEST PERFORMANCE REPORT"));
    sections.push(test_information(profile, ctx));
    sections.push(test_description(profile));
    sections.push(general_results(&analysis.stats));
    sections.push(response_times(&analysis.stats));
    sections.push(checks_section(&analysis.checks));
    sections.push(thresholds_section(&analysis.thresholds));
    sections.push(findings_section(&analysis.classification));
    sections.push(recommendations_section(profile, &analysis.classification));
    if analysis.classification.capacity.is_some() {
        sections.push(capacity_section(&analysis.classification));
    }
    sections.push(conclusion_section(&analysis.classification));
    sections.push(banner("END OF REPORT"));

    Report {
        sections,
        file_token: file_token(&profile.slug, ctx),
    }
}

fn banner(text: &str) -> ReportSection {
    let rule = "=".repeat(BANNER_WIDTH);
    ReportSection {
        heading: None,
        lines: vec![rule.clone(), centered(text), rule],
    }
}

fn centered(text: &str) -> String {
    let pad = BANNER_WIDTH.saturating_sub(text.len()) / 2;
    format!("{}{text}", " ".repeat(pad))
}

fn section(heading: &str, lines: Vec<String>) -> ReportSection {
    ReportSection {
        heading: Some(heading.to_string()),
        lines,
    }
}

fn kv(lines: &mut Vec<String>, key: &str, value: &str) {
    lines.push(format!("{key:<KEY_WIDTH$}: {value}"));
}

fn test_information(profile: &ScenarioProfile, ctx: &RunContext) -> ReportSection {
    let mut lines = Vec::new();
    kv(&mut lines, "Executed on", &ctx.date);
    kv(&mut lines, "Executed at", &ctx.time);
    kv(
        &mut lines,
        "Target URL",
        ctx.target_url.as_deref().unwrap_or("n/a"),
    );
    kv(&mut lines, "Test type", &profile.test_kind);
    kv(
        &mut lines,
        "Planned duration",
        &format_duration(profile.target_duration),
    );
    kv(
        &mut lines,
        "Virtual users",
        &format!("up to {}", profile.max_vus),
    );
    section("TEST INFORMATION", lines)
}

fn test_description(profile: &ScenarioProfile) -> ReportSection {
    let mut lines = profile.description.clone();

    if !profile.phases.is_empty() {
        lines.push(String::new());
        lines.push("Phases:".to_string());
        for phase in &profile.phases {
            lines.push(format!("  {phase}"));
        }
    }

    if !profile.endpoints.is_empty() {
        lines.push(String::new());
        lines.push("Endpoints exercised:".to_string());
        for endpoint in &profile.endpoints {
            lines.push(format!("  - {endpoint}"));
        }
    }

    section("TEST DESCRIPTION", lines)
}

fn general_results(stats: &DerivedStats) -> ReportSection {
    let mut lines = Vec::new();
    kv(&mut lines, "Total requests", &stats.request_count.to_string());
    kv(
        &mut lines,
        "Successful requests",
        &stats.successful_count.to_string(),
    );
    kv(&mut lines, "Failed requests", &stats.failed_count.to_string());
    kv(
        &mut lines,
        "Success rate",
        &format!("{:.2}%", stats.success_rate_pct),
    );
    kv(
        &mut lines,
        "Data received",
        &format!("{:.2} MiB", stats.received_mib),
    );
    kv(&mut lines, "Data sent", &format!("{:.2} KiB", stats.sent_kib));
    section("GENERAL RESULTS", lines)
}

fn response_times(stats: &DerivedStats) -> ReportSection {
    let mut lines = Vec::new();
    kv(&mut lines, "Average", &format!("{:.0} ms", stats.avg_ms));
    kv(&mut lines, "Minimum", &format!("{:.0} ms", stats.min_ms));
    kv(&mut lines, "Maximum", &format!("{:.0} ms", stats.max_ms));
    kv(&mut lines, "Median (P50)", &format!("{:.0} ms", stats.median_ms));
    kv(&mut lines, "90th percentile", &format!("{:.0} ms", stats.p90_ms));
    kv(&mut lines, "95th percentile", &format!("{:.0} ms", stats.p95_ms));
    kv(&mut lines, "99th percentile", &format!("{:.0} ms", stats.p99_ms));
    section("RESPONSE TIMES", lines)
}

fn checks_section(checks: &CheckReport) -> ReportSection {
    if checks.results.is_empty() {
        return section("CHECKS", vec!["none recorded".to_string()]);
    }

    let mut lines = Vec::new();
    let mut current_group: Option<&str> = None;

    for result in &checks.results {
        if result.group.as_deref() != current_group {
            current_group = result.group.as_deref();
            if let Some(group) = current_group {
                lines.push(format!("{group}:"));
            }
        }

        let indent = if result.group.is_some() { "  " } else { "" };
        lines.push(format!(
            "{indent}{} | {}: {:.1}% ({} of {})",
            result.status,
            result.name,
            result.pass_rate_pct,
            result.passes,
            result.samples(),
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} of {} check samples passed ({:.1}%)",
        checks.tally.passes,
        checks.tally.samples,
        checks.tally.pass_rate_pct(),
    ));

    section("CHECKS", lines)
}

fn thresholds_section(thresholds: &ThresholdReport) -> ReportSection {
    if thresholds.results.is_empty() {
        return section("THRESHOLDS", vec!["none recorded".to_string()]);
    }

    let mut lines = Vec::new();
    for result in &thresholds.results {
        let status = if result.ok { "MET   " } else { "MISSED" };
        lines.push(format!("{status} | {}", result.description));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} of {} thresholds met",
        thresholds.tally.passed, thresholds.tally.total,
    ));

    section("THRESHOLDS", lines)
}

fn findings_section(classification: &Classification) -> ReportSection {
    if classification.anomalies.is_empty() {
        return section("FINDINGS", vec!["No anomalies detected.".to_string()]);
    }

    let mut lines = Vec::new();
    for anomaly in &classification.anomalies {
        match anomaly {
            Anomaly::LatencySpike { max_ms, ceiling_ms } => {
                lines.push(format!(
                    "Latency spike: the slowest request took {max_ms:.0} ms (ceiling {ceiling_ms:.0} ms)."
                ));
                lines.push("  Possible causes: server cold start, heavy queries.".to_string());
            }
            Anomaly::ErrorsDetected { failed_count } => {
                lines.push(format!("Errors detected: {failed_count} requests failed."));
                lines.push("  Review the server logs for details.".to_string());
            }
            Anomaly::FailingChecks { count } => {
                lines.push(format!(
                    "{count} checks fell below the acceptable pass rate."
                ));
            }
            Anomaly::ThresholdsBreached { breached, total } => {
                lines.push(format!("{breached} of {total} thresholds were not met."));
            }
            Anomaly::WatermarkCrossed { watermark, peak } => {
                lines.push(format!(
                    "Concurrency crossed {watermark} vus (peak {peak})."
                ));
            }
        }
    }

    section("FINDINGS", lines)
}

fn recommendations_section(
    profile: &ScenarioProfile,
    classification: &Classification,
) -> ReportSection {
    let tier = &classification.tier;

    let mut lines = Vec::new();
    lines.push(format!("Performance tier: {}", tier.label));
    lines.push(format!("  {}", tier.summary));

    let bullets: Vec<&String> = tier
        .recommendations
        .iter()
        .chain(profile.standing_recommendations.iter())
        .collect();

    lines.push(String::new());
    if bullets.is_empty() {
        lines.push("No corrective action required.".to_string());
    } else {
        for bullet in bullets {
            lines.push(format!("  - {bullet}"));
        }
    }

    section("RECOMMENDATIONS", lines)
}

fn capacity_section(classification: &Classification) -> ReportSection {
    let mut lines = Vec::new();
    if let Some(capacity) = &classification.capacity {
        kv(
            &mut lines,
            "Recommended concurrency",
            &format!("{} vus", capacity.recommended_vus),
        );
        kv(
            &mut lines,
            "Maximum before degradation",
            &format!("{} vus", capacity.max_before_degradation_vus),
        );
    }
    section("ESTIMATED CAPACITY", lines)
}

fn conclusion_section(classification: &Classification) -> ReportSection {
    let mut lines = Vec::new();
    lines.push(format!(
        "{}: {}",
        classification.verdict.label, classification.verdict.text,
    ));

    if let Some(experience) = &classification.experience {
        lines.push(String::new());
        lines.push(format!(
            "Experience score: {}/100 - {}",
            experience.score, experience.rating,
        ));
    }

    section("CONCLUSION", lines)
}

fn file_token(slug: &str, ctx: &RunContext) -> String {
    let raw = format!("report-{slug}-{}-{}", ctx.date, ctx.time);
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let mins = secs / 60;
    let rem = secs % 60;
    if mins > 0 && rem == 0 {
        format!("{mins}m")
    } else if mins > 0 {
        format!("{mins}m {rem}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::profile::ScenarioProfile;
    use crate::snapshot::{CheckCounts, CheckNode, DurationStats, ThresholdFlag};

    fn kv_line(key: &str, value: &str) -> String {
        format!("{key:<KEY_WIDTH$}: {value}")
    }

    fn ctx() -> RunContext {
        RunContext {
            target_url: Some("https://example.test".to_string()),
            date: "2025-11-03".to_string(),
            time: "14:30:00".to_string(),
        }
    }

    fn basic_snapshot() -> MetricsSnapshot {
        let mut checks = BTreeMap::new();
        checks.insert(
            "status is 200".to_string(),
            CheckNode::Counts(CheckCounts {
                passes: 995,
                fails: 5,
            }),
        );

        let mut thresholds = BTreeMap::new();
        let mut duration = BTreeMap::new();
        duration.insert("p(95)<3000".to_string(), ThresholdFlag { ok: true });
        thresholds.insert("http_req_duration".to_string(), duration);

        MetricsSnapshot {
            request_count: 1000,
            failed_count: 5,
            duration_stats: DurationStats {
                avg: 450.0,
                min: 80.0,
                max: 2100.0,
                median: 400.0,
                p90: 700.0,
                p95: 900.0,
                p99: 1500.0,
            },
            bytes_received: 12 * 1024 * 1024,
            bytes_sent: 256 * 1024,
            checks,
            thresholds,
            vu_samples: Vec::new(),
        }
    }

    fn synthesize_basic() -> Report {
        match synthesize(Some(&basic_snapshot()), &ScenarioProfile::baseline(), &ctx()) {
            Ok(report) => report,
            Err(err) => panic!("synthesis failed: {err}"),
        }
    }

    #[test]
    fn report_contains_every_required_section() {
        let report = synthesize_basic();
        let text = report.to_text();

        for heading in [
            "TEST INFORMATION",
            "TEST DESCRIPTION",
            "GENERAL RESULTS",
            "RESPONSE TIMES",
            "CHECKS",
            "THRESHOLDS",
            "FINDINGS",
            "RECOMMENDATIONS",
            "CONCLUSION",
        ] {
            assert!(text.contains(heading), "missing section: {heading}");
        }
        assert!(text.contains("LOAD TEST PERFORMANCE REPORT"));
        assert!(text.contains("END OF REPORT"));
        assert!(!text.is_empty());
    }

    #[test]
    fn basic_scenario_example_renders_expected_classification() {
        let report = synthesize_basic();
        let text = report.to_text();

        assert!(text.contains(&kv_line("Success rate", "99.50%")));
        assert!(text.contains("Performance tier: good"));
        // p95 of 900 is well under every excellent cutoff.
        assert!(text.contains("EXCELLENT:"));
    }

    #[test]
    fn numeric_precision_is_stable() {
        let report = synthesize_basic();
        let text = report.to_text();

        assert!(text.contains(&kv_line("Average", "450 ms")));
        assert!(text.contains(&kv_line("Data received", "12.00 MiB")));
        assert!(text.contains(&kv_line("Data sent", "256.00 KiB")));
        assert!(text.contains("99.5% (995 of 1000)"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let a = synthesize_basic().to_text();
        let b = synthesize_basic().to_text();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_snapshot_still_renders_every_section() {
        let report = match synthesize(
            Some(&MetricsSnapshot::default()),
            &ScenarioProfile::baseline(),
            &ctx(),
        ) {
            Ok(report) => report,
            Err(err) => panic!("synthesis failed: {err}"),
        };
        let text = report.to_text();

        assert!(text.contains("CHECKS\n------\nnone recorded"));
        assert!(text.contains("THRESHOLDS\n----------\nnone recorded"));
        assert!(text.contains("No anomalies detected."));
    }

    #[test]
    fn absent_snapshot_degrades_to_zeros() {
        let report = match synthesize(None, &ScenarioProfile::baseline(), &ctx()) {
            Ok(report) => report,
            Err(err) => panic!("synthesis failed: {err}"),
        };
        let text = report.to_text();

        assert!(text.contains(&kv_line("Total requests", "0")));
        assert!(text.contains(&kv_line("Success rate", "0.00%")));
    }

    #[test]
    fn grouped_checks_render_under_their_group() {
        let mut members = BTreeMap::new();
        members.insert(
            "page loads".to_string(),
            CheckCounts {
                passes: 10,
                fails: 0,
            },
        );

        let mut snapshot = basic_snapshot();
        snapshot
            .checks
            .insert("Landing page".to_string(), CheckNode::Group(members));

        let report = match synthesize(Some(&snapshot), &ScenarioProfile::navigation(), &ctx()) {
            Ok(report) => report,
            Err(err) => panic!("synthesis failed: {err}"),
        };
        let text = report.to_text();

        assert!(text.contains("Landing page:"));
        assert!(text.contains("  PASS | page loads: 100.0% (10 of 10)"));
    }

    #[test]
    fn capacity_section_appears_only_when_configured() {
        let stress = match synthesize(Some(&basic_snapshot()), &ScenarioProfile::stress(), &ctx()) {
            Ok(report) => report,
            Err(err) => panic!("synthesis failed: {err}"),
        };
        assert!(stress.to_text().contains("ESTIMATED CAPACITY"));

        let baseline = synthesize_basic();
        assert!(!baseline.to_text().contains("ESTIMATED CAPACITY"));
    }

    #[test]
    fn navigation_conclusion_includes_the_experience_score() {
        let report = match synthesize(
            Some(&basic_snapshot()),
            &ScenarioProfile::navigation(),
            &ctx(),
        ) {
            Ok(report) => report,
            Err(err) => panic!("synthesis failed: {err}"),
        };
        let text = report.to_text();
        assert!(text.contains("Experience score: "));
        assert!(text.contains("/100 - "));
    }

    #[test]
    fn file_token_is_sanitized() {
        let ctx = RunContext {
            target_url: None,
            date: "03/11/2025".to_string(),
            time: "14:30:00".to_string(),
        };
        let report = match synthesize(None, &ScenarioProfile::spike(), &ctx) {
            Ok(report) => report,
            Err(err) => panic!("synthesis failed: {err}"),
        };

        assert_eq!(report.file_token, "report-spike-03-11-2025-14-30-00");
        assert_eq!(report.file_name(), "report-spike-03-11-2025-14-30-00.txt");
    }

    #[test]
    fn invalid_profile_is_a_synthesis_failure() {
        let mut profile = ScenarioProfile::baseline();
        profile.latency_tiers.clear();
        assert!(synthesize(None, &profile, &ctx()).is_err());
    }
}
