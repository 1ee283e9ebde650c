use std::time::Duration;

use crate::checks::CheckBands;
use crate::error::{Error, Result};
use crate::thresholds::ThresholdText;

/// Which latency aggregate the verdict rules compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LatencyStat {
    Avg,
    P95,
}

/// One latency band: selected when the average duration is at or above
/// `floor_ms` and below the next tier's floor.
#[derive(Debug, Clone)]
pub struct LatencyTier {
    pub floor_ms: f64,
    pub label: String,
    pub summary: String,
    pub recommendations: Vec<String>,
}

impl LatencyTier {
    pub fn new(floor_ms: f64, label: &str, summary: &str, recommendations: &[&str]) -> Self {
        Self {
            floor_ms,
            label: label.to_string(),
            summary: summary.to_string(),
            recommendations: recommendations.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

/// One verdict rule; rules are evaluated top-down, first match wins.
#[derive(Debug, Clone)]
pub struct VerdictRule {
    pub min_success_rate: f64,
    pub max_latency_ms: f64,
    pub label: String,
    pub text: String,
}

impl VerdictRule {
    pub fn new(min_success_rate: f64, max_latency_ms: f64, label: &str, text: &str) -> Self {
        Self {
            min_success_rate,
            max_latency_ms,
            label: label.to_string(),
            text: text.to_string(),
        }
    }
}

/// The catch-all verdict used when no rule matches.
#[derive(Debug, Clone)]
pub struct VerdictLabel {
    pub label: String,
    pub text: String,
}

impl VerdictLabel {
    pub fn new(label: &str, text: &str) -> Self {
        Self {
            label: label.to_string(),
            text: text.to_string(),
        }
    }
}

/// Score deduction applied when the average duration exceeds `floor_ms`.
/// Bands accumulate: an average above several floors pays every penalty.
#[derive(Debug, Clone, Copy)]
pub struct PenaltyBand {
    pub floor_ms: f64,
    pub penalty: f64,
}

#[derive(Debug, Clone)]
pub struct RatingCutoff {
    pub min_score: u32,
    pub label: String,
}

impl RatingCutoff {
    pub fn new(min_score: u32, label: &str) -> Self {
        Self {
            min_score,
            label: label.to_string(),
        }
    }
}

/// Configuration for the 0-100 experience score mode.
#[derive(Debug, Clone)]
pub struct ExperienceConfig {
    pub penalty_bands: Vec<PenaltyBand>,
    pub p95_ceiling_ms: f64,
    pub p95_penalty: f64,
    /// Descending cutoffs; the last entry must have `min_score` 0 so every
    /// score maps to a rating.
    pub ratings: Vec<RatingCutoff>,
}

#[derive(Debug, Clone, Copy)]
pub struct CapacityStep {
    pub p95_ceiling_ms: f64,
    pub vus: u32,
}

/// Configuration for the concurrency capacity estimate.
#[derive(Debug, Clone)]
pub struct CapacityConfig {
    pub baseline_vus: u32,
    /// Ascending p95 ceilings; each crossed ceiling steps the estimate down.
    pub p95_steps: Vec<CapacityStep>,
    pub failure_ratio_limit: f64,
    pub failure_ratio_vus: u32,
    pub degradation_multiplier: f64,
}

/// Static description of one test scenario: traffic shape for the report's
/// metadata sections plus every threshold, band, and template the engine
/// is parameterized by. The engine hard-codes none of these numbers.
#[derive(Debug, Clone)]
pub struct ScenarioProfile {
    pub name: String,
    /// Filename-safe token used in the derived report identifier.
    pub slug: String,
    pub test_kind: String,
    pub target_duration: Duration,
    pub max_vus: u64,

    pub description: Vec<String>,
    pub phases: Vec<String>,
    pub endpoints: Vec<String>,

    pub check_bands: CheckBands,
    pub threshold_texts: Vec<ThresholdText>,

    pub latency_tiers: Vec<LatencyTier>,
    /// Recommendations printed for every run of this scenario, independent
    /// of the selected tier.
    pub standing_recommendations: Vec<String>,

    /// Max-duration ceiling for the latency-spike finding; `None` disables
    /// the flag.
    pub spike_ms: Option<f64>,

    pub verdict_stat: LatencyStat,
    pub verdict_rules: Vec<VerdictRule>,
    pub verdict_fallback: VerdictLabel,

    pub experience: Option<ExperienceConfig>,
    pub capacity: Option<CapacityConfig>,

    /// Concurrency watermarks reported when the run's vu samples cross them.
    pub watermarks: Vec<u64>,
}

impl ScenarioProfile {
    /// Structural validation, run once before synthesis. Everything past
    /// this point can assume a tier always matches and a rating always
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfile`] naming the violated invariant.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidProfile {
            profile: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if self.slug.is_empty() {
            return Err(invalid("slug must not be empty"));
        }

        match self.latency_tiers.first() {
            None => return Err(invalid("at least one latency tier is required")),
            Some(first) if first.floor_ms != 0.0 => {
                return Err(invalid("the first latency tier must start at 0 ms"));
            }
            Some(_) => {}
        }
        if !self
            .latency_tiers
            .windows(2)
            .all(|w| w[0].floor_ms < w[1].floor_ms)
        {
            return Err(invalid("latency tier floors must be strictly ascending"));
        }

        if let Some(exp) = &self.experience {
            match exp.ratings.last() {
                None => return Err(invalid("experience ratings must not be empty")),
                Some(last) if last.min_score != 0 => {
                    return Err(invalid("the last experience rating must cover score 0"));
                }
                Some(_) => {}
            }
            if !exp
                .ratings
                .windows(2)
                .all(|w| w[0].min_score > w[1].min_score)
            {
                return Err(invalid("experience rating cutoffs must be descending"));
            }
        }

        if let Some(cap) = &self.capacity {
            if cap.baseline_vus == 0 {
                return Err(invalid("capacity baseline must be positive"));
            }
            if !cap
                .p95_steps
                .windows(2)
                .all(|w| w[0].p95_ceiling_ms < w[1].p95_ceiling_ms)
            {
                return Err(invalid("capacity p95 ceilings must be strictly ascending"));
            }
        }

        Ok(())
    }

    /// Flat constant-vus run against the landing page.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            name: "Baseline load".to_string(),
            slug: "baseline".to_string(),
            test_kind: "Baseline load test".to_string(),
            target_duration: Duration::from_secs(60),
            max_vus: 5,
            description: lines(&[
                "Simulates 5 virtual users hitting the site concurrently for one",
                "minute. Each user:",
                "  - requests the landing page",
                "  - waits one second between requests",
                "  - verifies the response status and content",
            ]),
            phases: Vec::new(),
            endpoints: Vec::new(),
            check_bands: CheckBands::default(),
            threshold_texts: vec![
                ThresholdText::new("http_req_failed", "rate<0.1", "Error rate below 10%"),
                ThresholdText::new(
                    "http_req_duration",
                    "p(95)<3000",
                    "95% of requests complete within 3 seconds",
                ),
            ],
            latency_tiers: vec![
                LatencyTier::new(
                    0.0,
                    "good",
                    "Average response time is below one second.",
                    &[],
                ),
                LatencyTier::new(
                    1000.0,
                    "improvable",
                    "Average response time is above one second.",
                    &[
                        "Optimize image sizes and formats",
                        "Minify CSS and JavaScript bundles",
                        "Serve static assets through a CDN",
                    ],
                ),
                LatencyTier::new(
                    2000.0,
                    "slow",
                    "Average response time is above two seconds.",
                    &[
                        "Add a page cache layer",
                        "Review slow database queries",
                        "Consider a larger hosting plan",
                    ],
                ),
            ],
            standing_recommendations: Vec::new(),
            spike_ms: Some(5000.0),
            verdict_stat: LatencyStat::Avg,
            verdict_rules: vec![
                VerdictRule::new(
                    99.0,
                    1000.0,
                    "EXCELLENT",
                    "The site performs optimally under this load.",
                ),
                VerdictRule::new(
                    95.0,
                    2000.0,
                    "GOOD",
                    "The site works correctly with room for improvement.",
                ),
                VerdictRule::new(
                    90.0,
                    3000.0,
                    "FAIR",
                    "The site needs optimization work to improve the user experience.",
                ),
            ],
            verdict_fallback: VerdictLabel::new(
                "POOR",
                "The site requires immediate attention to resolve performance problems.",
            ),
            experience: None,
            capacity: None,
            watermarks: Vec::new(),
        }
    }

    /// Staged ramp that searches for the breaking point.
    #[must_use]
    pub fn stress() -> Self {
        Self {
            name: "Stress ramp".to_string(),
            slug: "stress".to_string(),
            test_kind: "Stress test".to_string(),
            target_duration: Duration::from_secs(10 * 60),
            max_vus: 30,
            description: lines(&[
                "Gradually increases the load to locate the point where the system",
                "starts to degrade.",
            ]),
            phases: lines(&[
                "1. warm-up   (0-2 min):  0 -> 10 vus",
                "2. normal    (2-5 min): 10 -> 20 vus",
                "3. stress    (5-8 min): 20 -> 30 vus",
                "4. recovery  (8-10 min): 30 -> 0 vus",
            ]),
            endpoints: lines(&[
                "landing page",
                "privacy notice",
                "about us",
                "frequently asked questions",
                "terms and conditions",
                "parcel tracking",
                "billing form",
            ]),
            check_bands: CheckBands::default(),
            threshold_texts: vec![
                ThresholdText::new("http_req_failed", "rate<0.1", "Error rate below 10%"),
                ThresholdText::new(
                    "http_req_duration",
                    "p(95)<4000",
                    "95% of requests complete within 4 seconds",
                ),
                ThresholdText::new(
                    "http_req_duration",
                    "p(99)<6000",
                    "99% of requests complete within 6 seconds",
                ),
            ],
            latency_tiers: vec![
                LatencyTier::new(
                    0.0,
                    "steady",
                    "The system absorbed the ramp without degrading.",
                    &[],
                ),
                LatencyTier::new(
                    2000.0,
                    "strained",
                    "Average response time degraded noticeably under load.",
                    &[
                        "Add an aggressive cache layer (Redis or Memcached)",
                        "Optimize database queries",
                        "Scale the server vertically",
                    ],
                ),
                LatencyTier::new(
                    4000.0,
                    "overloaded",
                    "Average response time collapsed under the ramp.",
                    &[
                        "Review slow queries and add indexes on large tables",
                        "Paginate heavy content",
                        "Scale out behind a load balancer",
                    ],
                ),
            ],
            standing_recommendations: lines(&[
                "Configure auto-scaling ahead of traffic growth",
                "Add rate limiting as protection",
                "Serve static assets through a CDN",
            ]),
            spike_ms: Some(10_000.0),
            verdict_stat: LatencyStat::P95,
            verdict_rules: vec![
                VerdictRule::new(
                    99.0,
                    3000.0,
                    "EXCELLENT",
                    "The system handles stress well and scales with headroom.",
                ),
                VerdictRule::new(
                    95.0,
                    5000.0,
                    "GOOD",
                    "The system withstands the ramp with room for improvement.",
                ),
                VerdictRule::new(
                    90.0,
                    8000.0,
                    "FAIR",
                    "The system shows stress symptoms and needs optimization.",
                ),
            ],
            verdict_fallback: VerdictLabel::new(
                "CRITICAL",
                "The system cannot sustain the load and requires immediate action.",
            ),
            experience: None,
            capacity: Some(CapacityConfig {
                baseline_vus: 30,
                p95_steps: vec![
                    CapacityStep {
                        p95_ceiling_ms: 4000.0,
                        vus: 20,
                    },
                    CapacityStep {
                        p95_ceiling_ms: 6000.0,
                        vus: 15,
                    },
                ],
                failure_ratio_limit: 0.05,
                failure_ratio_vus: 10,
                degradation_multiplier: 1.5,
            }),
            watermarks: Vec::new(),
        }
    }

    /// Constant-vus user journey across several page types.
    #[must_use]
    pub fn navigation() -> Self {
        Self {
            name: "User navigation".to_string(),
            slug: "navigation".to_string(),
            test_kind: "User journey test".to_string(),
            target_duration: Duration::from_secs(5 * 60),
            max_vus: 10,
            description: lines(&[
                "Simulates real users browsing the site:",
                "  1. visit the landing page",
                "  2. run a search",
                "  3. open internal pages",
                "  4. fetch static resources (CSS, JS)",
                "  5. pause between actions, as a reader would",
            ]),
            phases: Vec::new(),
            endpoints: Vec::new(),
            check_bands: CheckBands::default(),
            threshold_texts: vec![
                ThresholdText::new("http_req_failed", "rate<0.1", "Error rate below 10%"),
                ThresholdText::new(
                    "http_req_duration",
                    "p(95)<3000",
                    "95% of requests complete within 3 seconds",
                ),
                ThresholdText::new(
                    "http_req_duration{page:home}",
                    "p(95)<2000",
                    "95% of landing-page requests complete within 2 seconds",
                ),
                ThresholdText::new(
                    "http_req_duration{page:search}",
                    "p(95)<4000",
                    "95% of search requests complete within 4 seconds",
                ),
            ],
            latency_tiers: vec![
                LatencyTier::new(
                    0.0,
                    "instant",
                    "Pages load in under one second on average.",
                    &[],
                ),
                LatencyTier::new(
                    1000.0,
                    "fast",
                    "Pages load in under two seconds on average.",
                    &[],
                ),
                LatencyTier::new(
                    2000.0,
                    "acceptable",
                    "Pages load in under three seconds on average.",
                    &[
                        "Lazy-load below-the-fold images",
                        "Minify and combine CSS/JS files",
                        "Enable gzip compression",
                    ],
                ),
                LatencyTier::new(
                    3000.0,
                    "slow",
                    "Pages are slow enough that users are likely to abandon the site.",
                    &[
                        "Lazy-load below-the-fold images",
                        "Minify and combine CSS/JS files",
                        "Enable gzip compression",
                        "Optimize the critical rendering path",
                    ],
                ),
            ],
            standing_recommendations: lines(&[
                "Prefetch likely next pages",
                "Lean on browser caching for repeat visits",
            ]),
            spike_ms: None,
            verdict_stat: LatencyStat::Avg,
            verdict_rules: vec![
                VerdictRule::new(
                    99.0,
                    1000.0,
                    "EXCELLENT",
                    "Navigation feels instant across the journey.",
                ),
                VerdictRule::new(
                    95.0,
                    2000.0,
                    "GOOD",
                    "Navigation is smooth with occasional slow pages.",
                ),
                VerdictRule::new(
                    90.0,
                    3000.0,
                    "FAIR",
                    "Navigation is noticeably sluggish and needs attention.",
                ),
            ],
            verdict_fallback: VerdictLabel::new(
                "POOR",
                "Navigation is slow or unreliable enough to drive users away.",
            ),
            experience: Some(ExperienceConfig {
                penalty_bands: vec![
                    PenaltyBand {
                        floor_ms: 1000.0,
                        penalty: 10.0,
                    },
                    PenaltyBand {
                        floor_ms: 2000.0,
                        penalty: 15.0,
                    },
                    PenaltyBand {
                        floor_ms: 3000.0,
                        penalty: 25.0,
                    },
                ],
                p95_ceiling_ms: 5000.0,
                p95_penalty: 10.0,
                ratings: vec![
                    RatingCutoff::new(90, "EXCELLENT"),
                    RatingCutoff::new(80, "VERY GOOD"),
                    RatingCutoff::new(70, "GOOD"),
                    RatingCutoff::new(60, "FAIR"),
                    RatingCutoff::new(0, "NEEDS IMPROVEMENT"),
                ],
            }),
            capacity: None,
            watermarks: Vec::new(),
        }
    }

    /// Sudden traffic bursts: a 10x spike followed by a 20x spike.
    #[must_use]
    pub fn spike() -> Self {
        Self {
            name: "Traffic spikes".to_string(),
            slug: "spike".to_string(),
            test_kind: "Spike test".to_string(),
            target_duration: Duration::from_secs(4 * 60),
            max_vus: 100,
            description: lines(&[
                "Simulates sudden traffic bursts such as viral campaigns, social",
                "media mentions, or flash promotions.",
            ]),
            phases: lines(&[
                "1. normal traffic   (0-30s):    5 vus",
                "2. moderate spike   (30-40s):   5 -> 50 vus",
                "3. sustained spike  (40-100s):  50 vus",
                "4. recovery         (100-130s): 50 -> 5 vus",
                "5. mega spike       (160-170s): 5 -> 100 vus",
                "6. maximum load     (170-200s): 100 vus",
                "7. final recovery   (200-220s): 100 -> 5 vus",
            ]),
            endpoints: Vec::new(),
            check_bands: CheckBands {
                pass_min: 95.0,
                warn_min: 85.0,
            },
            threshold_texts: vec![
                ThresholdText::new(
                    "http_req_failed",
                    "rate<0.15",
                    "Error rate below 15% during spikes",
                ),
                ThresholdText::new(
                    "http_req_duration",
                    "p(95)<5000",
                    "95% of requests complete within 5 seconds",
                ),
            ],
            latency_tiers: vec![
                LatencyTier::new(
                    0.0,
                    "resilient",
                    "The site stayed responsive through the bursts.",
                    &[],
                ),
                LatencyTier::new(
                    2000.0,
                    "degraded",
                    "Response times rose noticeably while bursts were active.",
                    &[],
                ),
                LatencyTier::new(
                    5000.0,
                    "overwhelmed",
                    "Response times collapsed during the bursts.",
                    &[
                        "Increase server resources (CPU/RAM)",
                        "Tune application and database pools",
                        "Move to a load-balanced architecture",
                    ],
                ),
            ],
            standing_recommendations: lines(&[
                "Rate-limit by client IP",
                "Front the site with a CDN or anti-DDoS layer",
                "Cap concurrent connections at the edge",
                "Cache full pages aggressively",
                "Auto-scale on traffic bursts where available",
            ]),
            spike_ms: Some(10_000.0),
            verdict_stat: LatencyStat::P95,
            verdict_rules: vec![
                VerdictRule::new(
                    85.0,
                    5000.0,
                    "HIGH",
                    "The site is well prepared for sudden traffic spikes.",
                ),
                VerdictRule::new(
                    85.0,
                    f64::INFINITY,
                    "MEDIUM",
                    "The site survives spikes but with noticeable degradation.",
                ),
            ],
            verdict_fallback: VerdictLabel::new(
                "LOW",
                "The site is vulnerable to traffic spikes and needs urgent work.",
            ),
            experience: None,
            capacity: Some(CapacityConfig {
                baseline_vus: 70,
                p95_steps: vec![
                    CapacityStep {
                        p95_ceiling_ms: 5000.0,
                        vus: 50,
                    },
                    CapacityStep {
                        p95_ceiling_ms: 8000.0,
                        vus: 35,
                    },
                ],
                failure_ratio_limit: 0.15,
                failure_ratio_vus: 25,
                degradation_multiplier: 1.5,
            }),
            watermarks: vec![45, 95],
        }
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
