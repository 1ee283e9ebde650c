mod checks;
mod classify;
mod error;
mod profile;
mod report;
mod snapshot;
mod stats;
mod thresholds;
mod watermark;

pub use checks::{CheckBands, CheckReport, CheckResult, CheckStatus, CheckTally, evaluate as evaluate_checks};
pub use classify::{
    Anomaly, CapacityEstimate, Classification, ExperienceScore, TierAssessment, Verdict, classify,
};
pub use error::{Error, Result};
pub use profile::{
    CapacityConfig, CapacityStep, ExperienceConfig, LatencyStat, LatencyTier, PenaltyBand,
    RatingCutoff, ScenarioProfile, VerdictLabel, VerdictRule,
};
pub use report::{Analysis, Report, ReportSection, RunContext, analyze, render, synthesize};
pub use snapshot::{CheckCounts, CheckNode, DurationStats, MetricsSnapshot, ThresholdFlag};
pub use stats::{DerivedStats, derive as derive_stats};
pub use thresholds::{
    ThresholdReport, ThresholdResult, ThresholdTally, ThresholdText,
    evaluate as evaluate_thresholds,
};
pub use watermark::{crossed as crossed_watermarks, peak as peak_concurrency};
