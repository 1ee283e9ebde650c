use crate::checks::{CheckReport, CheckStatus};
use crate::profile::{CapacityConfig, ExperienceConfig, LatencyStat, ScenarioProfile};
use crate::stats::DerivedStats;
use crate::thresholds::ThresholdReport;
use crate::watermark;

/// A problem flag raised independently of the latency tier. Flags are not
/// mutually exclusive; a run can raise several at once.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// The slowest request exceeded the scenario's spike ceiling.
    LatencySpike { max_ms: f64, ceiling_ms: f64 },
    /// At least one request violated the run's failure predicate.
    ErrorsDetected { failed_count: u64 },
    /// Checks whose pass rate fell below the acceptable band.
    FailingChecks { count: u64 },
    /// Threshold expressions the run did not meet.
    ThresholdsBreached { breached: u64, total: u64 },
    /// Concurrency crossed a configured watermark.
    WatermarkCrossed { watermark: u64, peak: u64 },
}

#[derive(Debug, Clone)]
pub struct TierAssessment {
    pub label: String,
    pub summary: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceScore {
    pub score: u32,
    pub rating: String,
}

#[derive(Debug, Clone)]
pub struct Verdict {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityEstimate {
    pub recommended_vus: u32,
    pub max_before_degradation_vus: u32,
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub tier: TierAssessment,
    pub anomalies: Vec<Anomaly>,
    /// Present only for profiles that configure the experience mode.
    pub experience: Option<ExperienceScore>,
    pub verdict: Verdict,
    pub capacity: Option<CapacityEstimate>,
}

/// Applies the profile's tiered heuristics to the run. Pure and total:
/// every branch resolves to a value for any input combination, assuming
/// the profile passed [`ScenarioProfile::validate`].
#[must_use]
pub fn classify(
    stats: &DerivedStats,
    checks: &CheckReport,
    thresholds: &ThresholdReport,
    vu_samples: &[u64],
    profile: &ScenarioProfile,
) -> Classification {
    Classification {
        tier: select_tier(stats.avg_ms, profile),
        anomalies: find_anomalies(stats, checks, thresholds, vu_samples, profile),
        experience: profile
            .experience
            .as_ref()
            .map(|cfg| score_experience(stats, cfg)),
        verdict: select_verdict(stats, profile),
        capacity: profile
            .capacity
            .as_ref()
            .map(|cfg| estimate_capacity(stats, cfg)),
    }
}

/// Selects the tier whose floor is the greatest value at or below the
/// average duration. Validation guarantees a tier with floor 0 exists.
fn select_tier(avg_ms: f64, profile: &ScenarioProfile) -> TierAssessment {
    let mut selected = 0;
    for (idx, tier) in profile.latency_tiers.iter().enumerate() {
        if tier.floor_ms <= avg_ms {
            selected = idx;
        }
    }

    let tier = &profile.latency_tiers[selected];
    TierAssessment {
        label: tier.label.clone(),
        summary: tier.summary.clone(),
        recommendations: tier.recommendations.clone(),
    }
}

fn find_anomalies(
    stats: &DerivedStats,
    checks: &CheckReport,
    thresholds: &ThresholdReport,
    vu_samples: &[u64],
    profile: &ScenarioProfile,
) -> Vec<Anomaly> {
    let mut out = Vec::new();

    if let Some(ceiling_ms) = profile.spike_ms {
        if stats.max_ms > ceiling_ms {
            out.push(Anomaly::LatencySpike {
                max_ms: stats.max_ms,
                ceiling_ms,
            });
        }
    }

    if stats.failed_count > 0 {
        out.push(Anomaly::ErrorsDetected {
            failed_count: stats.failed_count,
        });
    }

    let failing = checks
        .results
        .iter()
        .filter(|c| c.status == CheckStatus::Fail)
        .count() as u64;
    if failing > 0 {
        out.push(Anomaly::FailingChecks { count: failing });
    }

    let breached = thresholds.tally.total.saturating_sub(thresholds.tally.passed);
    if breached > 0 {
        out.push(Anomaly::ThresholdsBreached {
            breached,
            total: thresholds.tally.total,
        });
    }

    let peak = watermark::peak(vu_samples);
    for crossed in watermark::crossed(vu_samples, &profile.watermarks) {
        out.push(Anomaly::WatermarkCrossed {
            watermark: crossed,
            peak,
        });
    }

    out
}

/// Starts at 100 and deducts: a fixed penalty per crossed average-duration
/// band, the failure ratio in percentage points, and a fixed penalty when
/// p95 exceeds its ceiling. Clamped to `[0, 100]`, rounded to the nearest
/// integer. Non-increasing in avg, max and failure ratio by construction.
fn score_experience(stats: &DerivedStats, cfg: &ExperienceConfig) -> ExperienceScore {
    let mut score = 100.0;

    for band in &cfg.penalty_bands {
        if stats.avg_ms > band.floor_ms {
            score -= band.penalty;
        }
    }

    score -= stats.failure_ratio() * 100.0;

    if stats.p95_ms > cfg.p95_ceiling_ms {
        score -= cfg.p95_penalty;
    }

    let score = score.clamp(0.0, 100.0).round() as u32;

    let rating = cfg
        .ratings
        .iter()
        .find(|r| score >= r.min_score)
        .or_else(|| cfg.ratings.last())
        .map(|r| r.label.clone())
        .unwrap_or_default();

    ExperienceScore { score, rating }
}

/// Descending rule list, first match wins. The fallback covers every input
/// no rule matches, so selection is total.
fn select_verdict(stats: &DerivedStats, profile: &ScenarioProfile) -> Verdict {
    let observed = match profile.verdict_stat {
        LatencyStat::Avg => stats.avg_ms,
        LatencyStat::P95 => stats.p95_ms,
    };

    for rule in &profile.verdict_rules {
        if stats.success_rate_pct >= rule.min_success_rate && observed < rule.max_latency_ms {
            return Verdict {
                label: rule.label.clone(),
                text: rule.text.clone(),
            };
        }
    }

    Verdict {
        label: profile.verdict_fallback.label.clone(),
        text: profile.verdict_fallback.text.clone(),
    }
}

/// Steps the baseline concurrency down once per crossed p95 ceiling, then
/// again when the failure ratio exceeds its limit. The degradation maximum
/// is a fixed multiplier over the final estimate.
fn estimate_capacity(stats: &DerivedStats, cfg: &CapacityConfig) -> CapacityEstimate {
    let mut recommended = cfg.baseline_vus;

    for step in &cfg.p95_steps {
        if stats.p95_ms > step.p95_ceiling_ms {
            recommended = step.vus;
        }
    }

    if stats.failure_ratio() > cfg.failure_ratio_limit {
        recommended = cfg.failure_ratio_vus;
    }

    let max_before = ((recommended as f64) * cfg.degradation_multiplier).round() as u32;

    CapacityEstimate {
        recommended_vus: recommended,
        max_before_degradation_vus: max_before,
    }
}
