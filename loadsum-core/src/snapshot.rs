use std::collections::BTreeMap;

use serde::Deserialize;

/// Finalized metrics record produced once by a load generator at the end of
/// a run.
///
/// The generator owns this structure; the synthesizer only reads it. Every
/// field is optional on the wire: a run that aborted before any traffic was
/// sent still deserializes, with counters at zero and empty mappings.
///
/// Field names follow the camelCase summary dump convention; the duration
/// stats additionally accept the k6 spellings (`med`, `p(90)`, ...) so a
/// `handleSummary` export parses unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsSnapshot {
    pub request_count: u64,

    /// Requests whose outcome violated the run's failure predicate
    /// (e.g. non-2xx/3xx). Not necessarily equal to the sum of check fails.
    pub failed_count: u64,

    pub duration_stats: DurationStats,

    pub bytes_received: u64,
    pub bytes_sent: u64,

    /// Check name -> counts, either flat or nested one level under a named
    /// group. Enumeration order is deterministic (lexicographic), group
    /// entries before their member checks.
    pub checks: BTreeMap<String, CheckNode>,

    /// Metric name -> threshold expression -> outcome. Several expressions
    /// per metric are all retained and evaluated independently.
    pub thresholds: BTreeMap<String, BTreeMap<String, ThresholdFlag>>,

    /// Per-interval concurrency samples, if the generator recorded them.
    pub vu_samples: Vec<u64>,
}

/// Latency aggregates in milliseconds. Absent values read as 0 so that
/// downstream comparisons stay numeric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DurationStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    #[serde(alias = "med")]
    pub median: f64,
    #[serde(alias = "p(90)")]
    pub p90: f64,
    #[serde(alias = "p(95)")]
    pub p95: f64,
    #[serde(alias = "p(99)")]
    pub p99: f64,
}

/// A check entry: either a leaf with pass/fail counts or a named group of
/// leaves. `deny_unknown_fields` on [`CheckCounts`] is what disambiguates
/// the untagged variants: a group object never parses as counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CheckNode {
    Counts(CheckCounts),
    Group(BTreeMap<String, CheckCounts>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckCounts {
    pub passes: u64,
    pub fails: u64,
}

impl CheckCounts {
    #[must_use]
    pub fn samples(&self) -> u64 {
        self.passes.saturating_add(self.fails)
    }
}

/// Outcome of a single threshold expression. An absent `ok` reads as
/// failed, which is the conservative interpretation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThresholdFlag {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> MetricsSnapshot {
        match serde_json::from_str(s) {
            Ok(v) => v,
            Err(err) => panic!("snapshot failed to parse: {err}"),
        }
    }

    #[test]
    fn empty_object_parses_to_defaults() {
        let s = parse("{}");
        assert_eq!(s.request_count, 0);
        assert_eq!(s.failed_count, 0);
        assert_eq!(s.duration_stats.avg, 0.0);
        assert!(s.checks.is_empty());
        assert!(s.thresholds.is_empty());
        assert!(s.vu_samples.is_empty());
    }

    #[test]
    fn duration_stats_accept_k6_aliases() {
        let s = parse(
            r#"{"durationStats": {"avg": 450.2, "med": 400.0, "p(90)": 700.0, "p(95)": 900.5, "p(99)": 1200.0}}"#,
        );
        assert_eq!(s.duration_stats.avg, 450.2);
        assert_eq!(s.duration_stats.median, 400.0);
        assert_eq!(s.duration_stats.p90, 700.0);
        assert_eq!(s.duration_stats.p95, 900.5);
        assert_eq!(s.duration_stats.p99, 1200.0);
    }

    #[test]
    fn checks_parse_flat_and_grouped() {
        let s = parse(
            r#"{
                "checks": {
                    "status is 200": {"passes": 10, "fails": 0},
                    "Landing page": {
                        "page loads": {"passes": 5, "fails": 1}
                    }
                }
            }"#,
        );

        match s.checks.get("status is 200") {
            Some(CheckNode::Counts(c)) => {
                assert_eq!(c.passes, 10);
                assert_eq!(c.fails, 0);
                assert_eq!(c.samples(), 10);
            }
            other => panic!("expected flat counts, got {other:?}"),
        }

        match s.checks.get("Landing page") {
            Some(CheckNode::Group(g)) => {
                let c = g.get("page loads").copied().unwrap_or_default();
                assert_eq!(c.passes, 5);
                assert_eq!(c.fails, 1);
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn multiple_thresholds_per_metric_are_retained() {
        let s = parse(
            r#"{
                "thresholds": {
                    "http_req_duration": {
                        "p(95)<4000": {"ok": true},
                        "p(99)<6000": {"ok": false}
                    }
                }
            }"#,
        );

        let per_metric = s
            .thresholds
            .get("http_req_duration")
            .cloned()
            .unwrap_or_default();
        assert_eq!(per_metric.len(), 2);
        assert_eq!(per_metric.get("p(95)<4000"), Some(&ThresholdFlag { ok: true }));
        assert_eq!(per_metric.get("p(99)<6000"), Some(&ThresholdFlag { ok: false }));
    }

    #[test]
    fn missing_threshold_ok_reads_as_failed() {
        let s = parse(r#"{"thresholds": {"http_req_failed": {"rate<0.1": {}}}}"#);
        let flag = s
            .thresholds
            .get("http_req_failed")
            .and_then(|m| m.get("rate<0.1"))
            .copied()
            .unwrap_or_default();
        assert!(!flag.ok);
    }
}
