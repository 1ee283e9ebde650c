use loadsum_core::ScenarioProfile;

/// Prints the built-in scenario profiles with their headline numbers.
pub fn run() {
    for profile in [
        ScenarioProfile::baseline(),
        ScenarioProfile::stress(),
        ScenarioProfile::navigation(),
        ScenarioProfile::spike(),
    ] {
        println!(
            "{}: {} (up to {} vus, {})",
            profile.slug,
            profile.test_kind,
            profile.max_vus,
            humantime::format_duration(profile.target_duration),
        );
    }
}
