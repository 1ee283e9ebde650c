use crate::snapshot::MetricsSnapshot;

const BYTES_PER_KIB: f64 = 1024.0;
const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Scalar aggregates pulled out of a snapshot, pre-rounded to the precision
/// the report renders at: percentages to 2 decimals, data volumes to 2
/// decimals, latencies to whole milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedStats {
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

impl DerivedStats {
    /// Failure ratio in `[0, 1]`; 0 when no requests were made.
    #[must_use]
    pub fn failure_ratio(&self) -> f64 {
        if self.request_count == 0 {
            return 0.0;
        }
        (self.failed_count as f64) / (self.request_count as f64)
    }
}

/// Derives report statistics from a snapshot. `None` stands for a run that
/// aborted before producing a snapshot and yields all zeros, so the report
/// pipeline downstream never has to special-case it.
#[must_use]
pub fn derive(snapshot: Option<&MetricsSnapshot>) -> DerivedStats {
    let Some(s) = snapshot else {
        return DerivedStats::default();
    };

    let successful_count = s.request_count.saturating_sub(s.failed_count);
    let success_rate_pct = if s.request_count > 0 {
        round2((successful_count as f64) / (s.request_count as f64) * 100.0)
    } else {
        0.0
    };

    let d = &s.duration_stats;

    DerivedStats {
        request_count: s.request_count,
        failed_count: s.failed_count,
        successful_count,
        success_rate_pct,
        received_mib: round2((s.bytes_received as f64) / BYTES_PER_MIB),
        sent_kib: round2((s.bytes_sent as f64) / BYTES_PER_KIB),
        avg_ms: round_ms(d.avg),
        min_ms: round_ms(d.min),
        max_ms: round_ms(d.max),
        median_ms: round_ms(d.median),
        p90_ms: round_ms(d.p90),
        p95_ms: round_ms(d.p95),
        p99_ms: round_ms(d.p99),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Whole milliseconds; non-finite or negative inputs collapse to 0 so no
/// NaN/Infinity can reach a report line or a numeric comparison.
fn round_ms(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0).round() } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::DurationStats;

    #[test]
    fn absent_snapshot_yields_all_zeros() {
        let stats = derive(None);
        assert_eq!(stats, DerivedStats::default());
        assert_eq!(stats.success_rate_pct, 0.0);
    }

    #[test]
    fn zero_requests_has_zero_success_rate() {
        let stats = derive(Some(&MetricsSnapshot::default()));
        assert_eq!(stats.success_rate_pct, 0.0);
        assert_eq!(stats.failure_ratio(), 0.0);
    }

    #[test]
    fn success_rate_rounds_to_two_decimals() {
        let snapshot = MetricsSnapshot {
            request_count: 1000,
            failed_count: 5,
            ..MetricsSnapshot::default()
        };
        let stats = derive(Some(&snapshot));
        assert_eq!(stats.successful_count, 995);
        assert_eq!(stats.success_rate_pct, 99.5);

        let snapshot = MetricsSnapshot {
            request_count: 3,
            failed_count: 1,
            ..MetricsSnapshot::default()
        };
        let stats = derive(Some(&snapshot));
        assert_eq!(stats.success_rate_pct, 66.67);
    }

    #[test]
    fn success_rate_stays_in_bounds_when_failed_exceeds_requests() {
        // Producer contract violation: saturate instead of underflowing.
        let snapshot = MetricsSnapshot {
            request_count: 10,
            failed_count: 25,
            ..MetricsSnapshot::default()
        };
        let stats = derive(Some(&snapshot));
        assert_eq!(stats.successful_count, 0);
        assert_eq!(stats.success_rate_pct, 0.0);
    }

    #[test]
    fn data_volumes_convert_and_round() {
        let snapshot = MetricsSnapshot {
            bytes_received: 5 * 1024 * 1024 + 512 * 1024,
            bytes_sent: 1536,
            ..MetricsSnapshot::default()
        };
        let stats = derive(Some(&snapshot));
        assert_eq!(stats.received_mib, 5.5);
        assert_eq!(stats.sent_kib, 1.5);
    }

    #[test]
    fn latencies_round_to_whole_milliseconds() {
        let snapshot = MetricsSnapshot {
            duration_stats: DurationStats {
                avg: 450.4,
                min: 12.6,
                max: 5100.5,
                median: 399.9,
                p90: 700.2,
                p95: 901.5,
                p99: 1200.49,
            },
            ..MetricsSnapshot::default()
        };
        let stats = derive(Some(&snapshot));
        assert_eq!(stats.avg_ms, 450.0);
        assert_eq!(stats.min_ms, 13.0);
        assert_eq!(stats.max_ms, 5101.0);
        assert_eq!(stats.median_ms, 400.0);
        assert_eq!(stats.p90_ms, 700.0);
        assert_eq!(stats.p95_ms, 902.0);
        assert_eq!(stats.p99_ms, 1200.0);
    }

    #[test]
    fn degenerate_latency_inputs_collapse_to_zero() {
        let snapshot = MetricsSnapshot {
            duration_stats: DurationStats {
                avg: f64::NAN,
                max: f64::INFINITY,
                min: -5.0,
                ..DurationStats::default()
            },
            ..MetricsSnapshot::default()
        };
        let stats = derive(Some(&snapshot));
        assert_eq!(stats.avg_ms, 0.0);
        assert_eq!(stats.max_ms, 0.0);
        assert_eq!(stats.min_ms, 0.0);
    }
}
