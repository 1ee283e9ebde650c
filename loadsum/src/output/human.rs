use super::OutputFormatter;

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn print_report(
        &self,
        _profile: &loadsum_core::ScenarioProfile,
        analysis: &loadsum_core::Analysis,
        report: &loadsum_core::Report,
    ) -> anyhow::Result<()> {
        print!("{}", report.to_text());

        // Quality-gate failures are repeated on stderr so they survive
        // stdout redirection into a file.
        let missed: Vec<_> = analysis.thresholds.results.iter().filter(|t| !t.ok).collect();
        if !missed.is_empty() {
            eprintln!("thresholds missed:");
            for t in missed {
                eprintln!("  {}: {}", t.metric, t.expression);
            }
        }

        let failed: Vec<_> = analysis.checks.results.iter().filter(|c| c.fails > 0).collect();
        if !failed.is_empty() {
            eprintln!("checks with failures:");
            for c in failed {
                eprintln!("  {}: {} of {}", c.name, c.fails, c.samples());
            }
        }

        Ok(())
    }
}
