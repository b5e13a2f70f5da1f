//! User-facing rendering of translation outcomes.

use crate::pipeline::{Delivery, Failure, TranslationOutcome};
use crate::translation::SourceLanguage;

/// Renders an outcome as a Markdown message.
pub fn render(outcome: &TranslationOutcome) -> String {
    match outcome {
        TranslationOutcome::Success(delivery) => render_success(delivery),
        TranslationOutcome::Failure(failure) => render_failure(failure),
    }
}

/// Renders an outcome as pretty-printed JSON.
pub fn render_json(outcome: &TranslationOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}

fn render_success(delivery: &Delivery) -> String {
    let source = match &delivery.source_language {
        SourceLanguage::Auto => "auto-detected language".to_string(),
        SourceLanguage::Code(code) => code.clone(),
    };

    format!(
        "✅ **Translation Successful**\n\n\
         **Input:** {}\n\
         **Output:** {}\n\
         **Language:** {}\n\
         **Location:** {}\n\n\
         **Details:** Successfully translated {} from {} to {}. Output saved to: {} ({} bytes)",
        delivery.input_name,
        delivery.destination.file_name(),
        delivery.target_language,
        delivery.destination.location_label(),
        delivery.kind.label(),
        source,
        delivery.target_language,
        delivery.destination.identifier(),
        delivery.byte_count,
    )
}

fn render_failure(failure: &Failure) -> String {
    format!("❌ **{}**\n\n{}", failure.kind.title(), failure.detail)
}
