use serde::Serialize;
use std::io::Write as _;

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_report(
        &self,
        profile: &loadsum_core::ScenarioProfile,
        analysis: &loadsum_core::Analysis,
        report: &loadsum_core::Report,
    ) -> anyhow::Result<()> {
        let line = build_report_line(profile, analysis, report);
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonReportLine {
    pub kind: &'static str,
    pub scenario: String,
    pub file_name: String,

    pub stats: JsonStats,
    pub checks: Vec<JsonCheck>,
    pub thresholds: Vec<JsonThreshold>,
    pub classification: JsonClassification,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonStats {
    pub request_count: u64,
    pub failed_count: u64,
    pub successful_count: u64,
    pub success_rate_pct: f64,
    pub received_mib: f64,
    pub sent_kib: f64,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub p90_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonCheck {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub passes: u64,
    pub fails: u64,
    pub pass_rate_pct: f64,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonThreshold {
    pub metric: String,
    pub expression: String,
    pub ok: bool,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonClassification {
    pub tier: JsonTier,
    pub anomalies: Vec<JsonAnomaly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<JsonExperience>,
    pub verdict: JsonVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<JsonCapacity>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonTier {
    pub label: String,
    pub summary: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonAnomaly {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceiling_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breached: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak: Option<u64>,
}

impl JsonAnomaly {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            max_ms: None,
            ceiling_ms: None,
            failed_count: None,
            count: None,
            breached: None,
            total: None,
            watermark: None,
            peak: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonExperience {
    pub score: u32,
    pub rating: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonVerdict {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonCapacity {
    pub recommended_vus: u32,
    pub max_before_degradation_vus: u32,
}

fn build_report_line(
    profile: &loadsum_core::ScenarioProfile,
    analysis: &loadsum_core::Analysis,
    report: &loadsum_core::Report,
) -> JsonReportLine {
    let s = &analysis.stats;

    let checks = analysis
        .checks
        .results
        .iter()
        .map(|c| JsonCheck {
            name: c.name.clone(),
            group: c.group.clone(),
            passes: c.passes,
            fails: c.fails,
            pass_rate_pct: c.pass_rate_pct,
            status: c.status.to_string(),
        })
        .collect();

    let thresholds = analysis
        .thresholds
        .results
        .iter()
        .map(|t| JsonThreshold {
            metric: t.metric.clone(),
            expression: t.expression.clone(),
            ok: t.ok,
            description: t.description.clone(),
        })
        .collect();

    let c = &analysis.classification;
    let anomalies = c.anomalies.iter().map(build_anomaly).collect();

    JsonReportLine {
        kind: "report",
        scenario: profile.slug.clone(),
        file_name: report.file_name(),
        stats: JsonStats {
            request_count: s.request_count,
            failed_count: s.failed_count,
            successful_count: s.successful_count,
            success_rate_pct: s.success_rate_pct,
            received_mib: s.received_mib,
            sent_kib: s.sent_kib,
            avg_ms: s.avg_ms,
            min_ms: s.min_ms,
            max_ms: s.max_ms,
            median_ms: s.median_ms,
            p90_ms: s.p90_ms,
            p95_ms: s.p95_ms,
            p99_ms: s.p99_ms,
        },
        checks,
        thresholds,
        classification: JsonClassification {
            tier: JsonTier {
                label: c.tier.label.clone(),
                summary: c.tier.summary.clone(),
                recommendations: c.tier.recommendations.clone(),
            },
            anomalies,
            experience: c.experience.as_ref().map(|e| JsonExperience {
                score: e.score,
                rating: e.rating.clone(),
            }),
            verdict: JsonVerdict {
                label: c.verdict.label.clone(),
                text: c.verdict.text.clone(),
            },
            capacity: c.capacity.as_ref().map(|cap| JsonCapacity {
                recommended_vus: cap.recommended_vus,
                max_before_degradation_vus: cap.max_before_degradation_vus,
            }),
        },
    }
}

fn build_anomaly(anomaly: &loadsum_core::Anomaly) -> JsonAnomaly {
    use loadsum_core::Anomaly;

    match anomaly {
        Anomaly::LatencySpike { max_ms, ceiling_ms } => JsonAnomaly {
            max_ms: Some(*max_ms),
            ceiling_ms: Some(*ceiling_ms),
            ..JsonAnomaly::new("latency_spike")
        },
        Anomaly::ErrorsDetected { failed_count } => JsonAnomaly {
            failed_count: Some(*failed_count),
            ..JsonAnomaly::new("errors_detected")
        },
        Anomaly::FailingChecks { count } => JsonAnomaly {
            count: Some(*count),
            ..JsonAnomaly::new("failing_checks")
        },
        Anomaly::ThresholdsBreached { breached, total } => JsonAnomaly {
            breached: Some(*breached),
            total: Some(*total),
            ..JsonAnomaly::new("thresholds_breached")
        },
        Anomaly::WatermarkCrossed { watermark, peak } => JsonAnomaly {
            watermark: Some(*watermark),
            peak: Some(*peak),
            ..JsonAnomaly::new("watermark_crossed")
        },
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn sample_line() -> JsonReportLine {
        let profile = loadsum_core::ScenarioProfile::baseline();
        let snapshot = loadsum_core::MetricsSnapshot::default();
        let analysis = match loadsum_core::analyze(Some(&snapshot), &profile) {
            Ok(a) => a,
            Err(err) => panic!("analyze failed: {err}"),
        };
        let ctx = loadsum_core::RunContext {
            target_url: None,
            date: "2025-11-03".to_string(),
            time: "14:30:00".to_string(),
        };
        let report = loadsum_core::render(&profile, &analysis, &ctx);
        build_report_line(&profile, &analysis, &report)
    }

    #[test]
    fn report_line_has_kind_and_scenario() {
        let v: Value = match serde_json::to_value(sample_line()) {
            Ok(v) => v,
            Err(err) => panic!("to_value failed: {err}"),
        };

        assert_eq!(v.get("kind").and_then(Value::as_str), Some("report"));
        assert_eq!(v.get("scenario").and_then(Value::as_str), Some("baseline"));
        assert_eq!(
            v.pointer("/classification/verdict/label").and_then(Value::as_str),
            Some("POOR")
        );
    }

    #[test]
    fn absent_optional_blocks_are_omitted() {
        let v: Value = match serde_json::to_value(sample_line()) {
            Ok(v) => v,
            Err(err) => panic!("to_value failed: {err}"),
        };

        // Baseline has neither experience scoring nor capacity estimation.
        assert!(v.pointer("/classification/experience").is_none());
        assert!(v.pointer("/classification/capacity").is_none());
    }
}
