use crate::cli::OutputFormat;

mod human;
mod json;

pub(crate) trait OutputFormatter {
    fn print_report(
        &self,
        profile: &loadsum_core::ScenarioProfile,
        analysis: &loadsum_core::Analysis,
        report: &loadsum_core::Report,
    ) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
