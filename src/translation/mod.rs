mod client;
mod language;
mod request;

pub use client::{
    AzureDocumentTranslator, DocumentTranslator, ENDPOINT_VAR, KEY_VAR, TranslationJob,
    TranslatorError,
};
pub use language::{
    AUTO_DETECT, LANGUAGE_NAMES, SourceLanguage, normalize_language, print_languages,
};
pub use request::{ParsedRequest, parse_request};
