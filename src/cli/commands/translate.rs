use anyhow::Result;

use crate::config::Settings;
use crate::output;
use crate::pipeline::{Orchestrator, TranslateRequest, TranslationOutcome};
use crate::reference::ResolutionMode;
use crate::report;
use crate::ui::Spinner;

pub struct TranslateOptions {
    pub reference: String,
    pub to: String,
    pub from: String,
    pub output: Option<String>,
    pub mode: ResolutionMode,
    pub container: Option<String>,
    pub json: bool,
}

impl TranslateOptions {
    fn request(&self) -> TranslateRequest {
        TranslateRequest::new(self.reference.clone(), self.to.clone())
            .with_source(self.from.clone())
            .with_output(self.output.clone().unwrap_or_default())
            .with_mode(self.mode)
            .with_container_hint(self.container.clone())
    }
}

/// Runs one translation and prints its outcome.
pub async fn run_translate(
    options: TranslateOptions,
    settings: &Settings,
) -> Result<TranslationOutcome> {
    let orchestrator = Orchestrator::from_settings(settings);
    let request = options.request();

    let spinner = Spinner::new(&format!("Translating {}...", request.reference));
    let outcome = orchestrator.translate(&request).await;
    spinner.stop();

    print_outcome(&outcome, options.json)?;
    Ok(outcome)
}

/// Prints the outcome: JSON and successes to stdout, failures to stderr.
pub fn print_outcome(outcome: &TranslationOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", report::render_json(outcome)?);
        return Ok(());
    }

    output::emit_result(&report::render(outcome), outcome.is_success());
    Ok(())
}
