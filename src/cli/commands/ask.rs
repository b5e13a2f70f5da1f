use anyhow::{Result, bail};

use super::translate::{TranslateOptions, run_translate};
use crate::cli::LocationArgs;
use crate::config::Settings;
use crate::pipeline::TranslationOutcome;
use crate::status;
use crate::translation::parse_request;
use crate::ui::Style;

/// Parses a request sentence and runs it as a normal translation.
pub async fn run_ask(
    request: &str,
    location: &LocationArgs,
    json: bool,
    settings: &Settings,
) -> Result<TranslationOutcome> {
    let Some(parsed) = parse_request(request) else {
        bail!(
            "Could not understand the request: '{request}'\n\n\
             Try one of:\n  \
             - translate report.pdf to spanish\n  \
             - translate report.pdf from english to french\n  \
             - report.pdf to de"
        );
    };

    status!(
        "{} {} {} {}",
        Style::label("Translating"),
        Style::value(&parsed.reference),
        Style::label("to"),
        Style::code(&parsed.target_language)
    );

    let options = TranslateOptions {
        reference: parsed.reference,
        to: parsed.target_language,
        from: parsed.source_language,
        output: None,
        mode: location.mode(),
        container: location.container.clone(),
        json,
    };
    run_translate(options, settings).await
}
