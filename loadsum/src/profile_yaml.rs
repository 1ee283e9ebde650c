use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use loadsum_core::{
    CapacityConfig, CapacityStep, CheckBands, ExperienceConfig, LatencyStat, LatencyTier,
    PenaltyBand, RatingCutoff, ScenarioProfile, ThresholdText, VerdictLabel, VerdictRule,
};

/// On-disk scenario profile. Durations are humantime strings (`10m`, `90s`),
/// field names camelCase, optional blocks default to the off state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ProfileYaml {
    pub name: String,

    /// Filename token; derived from `name` when absent.
    #[serde(default)]
    pub slug: Option<String>,

    pub test_kind: String,
    pub target_duration: YamlDuration,
    pub max_vus: u64,

    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub phases: Vec<String>,
    #[serde(default)]
    pub endpoints: Vec<String>,

    #[serde(default)]
    pub check_bands: Option<CheckBandsYaml>,
    #[serde(default)]
    pub threshold_texts: Vec<ThresholdTextYaml>,

    pub latency_tiers: Vec<LatencyTierYaml>,
    #[serde(default)]
    pub standing_recommendations: Vec<String>,

    #[serde(default)]
    pub spike_ms: Option<f64>,

    /// `avg` (default) or `p95`.
    #[serde(default)]
    pub verdict_stat: Option<String>,
    pub verdict_rules: Vec<VerdictRuleYaml>,
    pub verdict_fallback: VerdictLabelYaml,

    #[serde(default)]
    pub experience: Option<ExperienceYaml>,
    #[serde(default)]
    pub capacity: Option<CapacityYaml>,

    #[serde(default)]
    pub watermarks: Vec<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CheckBandsYaml {
    pub pass_min: f64,
    pub warn_min: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ThresholdTextYaml {
    pub metric: String,
    pub pattern: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct LatencyTierYaml {
    pub floor_ms: f64,
    pub label: String,
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct VerdictRuleYaml {
    pub min_success_rate: f64,
    /// Absent means unbounded.
    #[serde(default)]
    pub max_latency_ms: Option<f64>,
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct VerdictLabelYaml {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ExperienceYaml {
    pub penalty_bands: Vec<PenaltyBandYaml>,
    pub p95_ceiling_ms: f64,
    pub p95_penalty: f64,
    pub ratings: Vec<RatingCutoffYaml>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct PenaltyBandYaml {
    pub floor_ms: f64,
    pub penalty: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct RatingCutoffYaml {
    pub min_score: u32,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CapacityYaml {
    pub baseline_vus: u32,
    #[serde(default)]
    pub p95_steps: Vec<CapacityStepYaml>,
    pub failure_ratio_limit: f64,
    pub failure_ratio_vus: u32,
    #[serde(default = "default_degradation_multiplier")]
    pub degradation_multiplier: f64,
}

fn default_degradation_multiplier() -> f64 {
    1.5
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CapacityStepYaml {
    pub p95_ceiling_ms: f64,
    pub vus: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct YamlDuration(Duration);

impl<'de> Deserialize<'de> for YamlDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw)
            .map(YamlDuration)
            .map_err(serde::de::Error::custom)
    }
}

impl ProfileYaml {
    fn into_profile(self) -> anyhow::Result<ScenarioProfile> {
        let verdict_stat = match self.verdict_stat.as_deref() {
            None => LatencyStat::Avg,
            Some(raw) => raw
                .parse::<LatencyStat>()
                .map_err(|_| anyhow::anyhow!("invalid verdictStat `{raw}` (expected avg or p95)"))?,
        };

        let slug = self.slug.unwrap_or_else(|| slugify(&self.name));

        let profile = ScenarioProfile {
            name: self.name,
            slug,
            test_kind: self.test_kind,
            target_duration: self.target_duration.0,
            max_vus: self.max_vus,
            description: self.description,
            phases: self.phases,
            endpoints: self.endpoints,
            check_bands: self
                .check_bands
                .map(|b| CheckBands {
                    pass_min: b.pass_min,
                    warn_min: b.warn_min,
                })
                .unwrap_or_default(),
            threshold_texts: self
                .threshold_texts
                .into_iter()
                .map(|t| ThresholdText {
                    metric: t.metric,
                    pattern: t.pattern,
                    text: t.text,
                })
                .collect(),
            latency_tiers: self
                .latency_tiers
                .into_iter()
                .map(|t| LatencyTier {
                    floor_ms: t.floor_ms,
                    label: t.label,
                    summary: t.summary,
                    recommendations: t.recommendations,
                })
                .collect(),
            standing_recommendations: self.standing_recommendations,
            spike_ms: self.spike_ms,
            verdict_stat,
            verdict_rules: self
                .verdict_rules
                .into_iter()
                .map(|r| VerdictRule {
                    min_success_rate: r.min_success_rate,
                    max_latency_ms: r.max_latency_ms.unwrap_or(f64::INFINITY),
                    label: r.label,
                    text: r.text,
                })
                .collect(),
            verdict_fallback: VerdictLabel {
                label: self.verdict_fallback.label,
                text: self.verdict_fallback.text,
            },
            experience: self.experience.map(|e| ExperienceConfig {
                penalty_bands: e
                    .penalty_bands
                    .into_iter()
                    .map(|b| PenaltyBand {
                        floor_ms: b.floor_ms,
                        penalty: b.penalty,
                    })
                    .collect(),
                p95_ceiling_ms: e.p95_ceiling_ms,
                p95_penalty: e.p95_penalty,
                ratings: e
                    .ratings
                    .into_iter()
                    .map(|r| RatingCutoff {
                        min_score: r.min_score,
                        label: r.label,
                    })
                    .collect(),
            }),
            capacity: self.capacity.map(|c| CapacityConfig {
                baseline_vus: c.baseline_vus,
                p95_steps: c
                    .p95_steps
                    .into_iter()
                    .map(|s| CapacityStep {
                        p95_ceiling_ms: s.p95_ceiling_ms,
                        vus: s.vus,
                    })
                    .collect(),
                failure_ratio_limit: c.failure_ratio_limit,
                failure_ratio_vus: c.failure_ratio_vus,
                degradation_multiplier: c.degradation_multiplier,
            }),
            watermarks: self.watermarks,
        };

        profile.validate()?;
        Ok(profile)
    }
}

fn slugify(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

pub(crate) fn load_profile(path: &Path) -> anyhow::Result<ScenarioProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    let parsed: ProfileYaml = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse profile: {}", path.display()))?;
    parsed.into_profile()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOAK_PROFILE: &str = r#"
name: Soak test
testKind: Soak test
targetDuration: 2h
maxVus: 15
description:
  - Sustains a moderate load for two hours to surface leaks.
checkBands:
  passMin: 100.0
  warnMin: 95.0
thresholdTexts:
  - metric: http_req_failed
    pattern: rate<0.05
    text: Error rate below 5%
latencyTiers:
  - floorMs: 0.0
    label: healthy
    summary: Latency stayed flat across the soak.
  - floorMs: 1500.0
    label: drifting
    summary: Latency drifted upward over the soak.
    recommendations:
      - Look for connection or memory leaks
verdictStat: p95
verdictRules:
  - minSuccessRate: 99.0
    maxLatencyMs: 2000.0
    label: STABLE
    text: No degradation over the soak window.
  - minSuccessRate: 95.0
    label: DEGRADING
    text: Some degradation under sustained load.
verdictFallback:
  label: UNSTABLE
  text: The system degrades when held under load.
watermarks: [10]
"#;

    #[test]
    fn full_profile_parses_and_validates() {
        let parsed: ProfileYaml = match serde_yaml::from_str(SOAK_PROFILE) {
            Ok(p) => p,
            Err(err) => panic!("yaml failed to parse: {err}"),
        };
        let profile = match parsed.into_profile() {
            Ok(p) => p,
            Err(err) => panic!("profile failed to build: {err}"),
        };

        assert_eq!(profile.slug, "soak-test");
        assert_eq!(profile.target_duration, Duration::from_secs(2 * 60 * 60));
        assert_eq!(profile.verdict_stat, LatencyStat::P95);
        assert_eq!(profile.check_bands.warn_min, 95.0);
        assert_eq!(profile.latency_tiers.len(), 2);
        assert_eq!(profile.watermarks, vec![10]);
        assert!(profile.verdict_rules[0].max_latency_ms.is_finite());
        // An absent ceiling means the rule is unbounded on latency.
        assert!(profile.verdict_rules[1].max_latency_ms.is_infinite());
    }

    #[test]
    fn invalid_verdict_stat_is_rejected() {
        let yaml = SOAK_PROFILE.replace("verdictStat: p95", "verdictStat: p42");
        let parsed: ProfileYaml = match serde_yaml::from_str(&yaml) {
            Ok(p) => p,
            Err(err) => panic!("yaml failed to parse: {err}"),
        };
        assert!(parsed.into_profile().is_err());
    }

    #[test]
    fn invalid_duration_is_rejected_at_parse_time() {
        let yaml = SOAK_PROFILE.replace("targetDuration: 2h", "targetDuration: soon");
        assert!(serde_yaml::from_str::<ProfileYaml>(&yaml).is_err());
    }

    #[test]
    fn tiers_must_still_start_at_zero() {
        let yaml = SOAK_PROFILE.replace("floorMs: 0.0", "floorMs: 100.0");
        let parsed: ProfileYaml = match serde_yaml::from_str(&yaml) {
            Ok(p) => p,
            Err(err) => panic!("yaml failed to parse: {err}"),
        };
        assert!(parsed.into_profile().is_err());
    }
}
