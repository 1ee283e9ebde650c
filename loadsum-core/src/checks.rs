use crate::snapshot::{CheckNode, MetricsSnapshot};

/// Tiered classification of a single check's pass rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Classification boundaries, in percent. `pass_min` is inclusive,
/// `warn_min` exclusive: rate >= pass_min is a pass, rate > warn_min a
/// warning, anything else a failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckBands {
    pub pass_min: f64,
    pub warn_min: f64,
}

impl Default for CheckBands {
    fn default() -> Self {
        Self {
            pass_min: 100.0,
            warn_min: 90.0,
        }
    }
}

impl CheckBands {
    #[must_use]
    pub fn classify(&self, pass_rate_pct: f64) -> CheckStatus {
        if pass_rate_pct >= self.pass_min {
            CheckStatus::Pass
        } else if pass_rate_pct > self.warn_min {
            CheckStatus::Warn
        } else {
            CheckStatus::Fail
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    /// Owning group name for checks nested one level down.
    pub group: Option<String>,
    pub passes: u64,
    pub fails: u64,
    pub pass_rate_pct: f64,
    pub status: CheckStatus,
}

impl CheckResult {
    #[must_use]
    pub fn samples(&self) -> u64 {
        self.passes.saturating_add(self.fails)
    }
}

/// Sample-level totals across every evaluated check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckTally {
    pub passes: u64,
    pub samples: u64,
}

impl CheckTally {
    /// Pass rate across all samples; 0 when nothing was recorded.
    #[must_use]
    pub fn pass_rate_pct(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        (self.passes as f64) / (self.samples as f64) * 100.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub results: Vec<CheckResult>,
    pub tally: CheckTally,
}

/// Walks the snapshot's checks in enumeration order, flattening one level
/// of grouping while retaining the owning group name. Entries with zero
/// samples are undefined and excluded from both the results and the tally.
#[must_use]
pub fn evaluate(snapshot: &MetricsSnapshot, bands: &CheckBands) -> CheckReport {
    let mut report = CheckReport::default();

    for (name, node) in &snapshot.checks {
        match node {
            CheckNode::Counts(counts) => {
                push_result(&mut report, name, None, counts.passes, counts.fails, bands);
            }
            CheckNode::Group(members) => {
                for (member, counts) in members {
                    push_result(
                        &mut report,
                        member,
                        Some(name.as_str()),
                        counts.passes,
                        counts.fails,
                        bands,
                    );
                }
            }
        }
    }

    report
}

fn push_result(
    report: &mut CheckReport,
    name: &str,
    group: Option<&str>,
    passes: u64,
    fails: u64,
    bands: &CheckBands,
) {
    let samples = passes.saturating_add(fails);
    if samples == 0 {
        return;
    }

    let pass_rate_pct = (passes as f64) / (samples as f64) * 100.0;

    report.tally.passes = report.tally.passes.saturating_add(passes);
    report.tally.samples = report.tally.samples.saturating_add(samples);

    report.results.push(CheckResult {
        name: name.to_string(),
        group: group.map(str::to_string),
        passes,
        fails,
        pass_rate_pct,
        status: bands.classify(pass_rate_pct),
    });
}
