use crate::snapshot::MetricsSnapshot;

/// Human description for a `(metric, expression)` pair. `pattern` matches
/// by substring against the threshold expression, mirroring how generators
/// name expressions (`p(95)<3000`, `rate<0.1`, ...).
#[derive(Debug, Clone)]
pub struct ThresholdText {
    pub metric: String,
    pub pattern: String,
    pub text: String,
}

impl ThresholdText {
    pub fn new(metric: &str, pattern: &str, text: &str) -> Self {
        Self {
            metric: metric.to_string(),
            pattern: pattern.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdResult {
    pub metric: String,
    pub expression: String,
    pub ok: bool,
    pub description: String,
}

/// Item-level totals across all threshold expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdTally {
    pub passed: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ThresholdReport {
    pub results: Vec<ThresholdResult>,
    pub tally: ThresholdTally,
}

/// Maps every snapshot threshold entry 1:1 to a result, in enumeration
/// order. Unresolved description lookups fall back to a generic
/// `<metric> threshold <expression>` line rather than an empty string.
#[must_use]
pub fn evaluate(snapshot: &MetricsSnapshot, texts: &[ThresholdText]) -> ThresholdReport {
    let mut report = ThresholdReport::default();

    for (metric, expressions) in &snapshot.thresholds {
        for (expression, flag) in expressions {
            report.tally.total = report.tally.total.saturating_add(1);
            if flag.ok {
                report.tally.passed = report.tally.passed.saturating_add(1);
            }

            report.results.push(ThresholdResult {
                metric: metric.clone(),
                expression: expression.clone(),
                ok: flag.ok,
                description: describe(metric, expression, texts),
            });
        }
    }

    report
}

fn describe(metric: &str, expression: &str, texts: &[ThresholdText]) -> String {
    texts
        .iter()
        .find(|t| t.metric == metric && expression.contains(t.pattern.as_str()))
        .map(|t| t.text.clone())
        .unwrap_or_else(|| format!("{metric} threshold {expression}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::snapshot::ThresholdFlag;

    fn snapshot_with(thresholds: Vec<(&str, Vec<(&str, bool)>)>) -> MetricsSnapshot {
        let thresholds = thresholds
            .into_iter()
            .map(|(metric, exprs)| {
                let exprs: BTreeMap<String, ThresholdFlag> = exprs
                    .into_iter()
                    .map(|(e, ok)| (e.to_string(), ThresholdFlag { ok }))
                    .collect();
                (metric.to_string(), exprs)
            })
            .collect();

        MetricsSnapshot {
            thresholds,
            ..MetricsSnapshot::default()
        }
    }

    #[test]
    fn every_expression_maps_to_one_result() {
        let snapshot = snapshot_with(vec![
            ("http_req_duration", vec![("p(95)<4000", true), ("p(99)<6000", false)]),
            ("http_req_failed", vec![("rate<0.1", true)]),
        ]);

        let report = evaluate(&snapshot, &[]);
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.tally.total, 3);
        assert_eq!(report.tally.passed, 2);
    }

    #[test]
    fn descriptions_resolve_by_metric_and_pattern() {
        let snapshot = snapshot_with(vec![("http_req_failed", vec![("rate<0.1", true)])]);
        let texts = vec![ThresholdText::new(
            "http_req_failed",
            "rate<0.1",
            "Error rate below 10%",
        )];

        let report = evaluate(&snapshot, &texts);
        assert_eq!(report.results[0].description, "Error rate below 10%");
    }

    #[test]
    fn unresolved_descriptions_fall_back_to_generic_text() {
        let snapshot = snapshot_with(vec![("iteration_duration", vec![("avg<9000", false)])]);

        let report = evaluate(&snapshot, &[]);
        assert_eq!(
            report.results[0].description,
            "iteration_duration threshold avg<9000"
        );
    }

    #[test]
    fn pattern_must_match_the_same_metric() {
        let snapshot = snapshot_with(vec![("http_req_duration", vec![("rate<0.1", true)])]);
        let texts = vec![ThresholdText::new(
            "http_req_failed",
            "rate<0.1",
            "Error rate below 10%",
        )];

        let report = evaluate(&snapshot, &texts);
        assert_eq!(
            report.results[0].description,
            "http_req_duration threshold rate<0.1"
        );
    }

    #[test]
    fn empty_thresholds_yield_empty_report() {
        let report = evaluate(&MetricsSnapshot::default(), &[]);
        assert!(report.results.is_empty());
        assert_eq!(report.tally, ThresholdTally::default());
    }
}
