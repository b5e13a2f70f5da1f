use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::document::DocumentKind;

pub const ENDPOINT_VAR: &str = "AZURE_DOCUMENT_TRANSLATION_ENDPOINT";
pub const KEY_VAR: &str = "AZURE_DOCUMENT_TRANSLATION_KEY";

const API_VERSION: &str = "2024-05-01";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// One document to translate.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub content: Bytes,
    pub file_name: String,
    pub kind: DocumentKind,
    pub target_language: String,
    /// `None` lets the backend detect the source language.
    pub source_language: Option<String>,
}

#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("Invalid translation endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("Failed to connect to translation endpoint {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Translation request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to read translated document: {0}")]
    Body(#[source] reqwest::Error),
}

/// The external document translation engine.
#[async_trait]
pub trait DocumentTranslator: Send + Sync {
    async fn translate(&self, job: &TranslationJob) -> Result<Bytes, TranslatorError>;
}

/// Synchronous document translation over the Azure Translator REST API.
pub struct AzureDocumentTranslator {
    client: Client,
    endpoint: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl AzureDocumentTranslator {
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            key: key.into(),
        }
    }

    fn request_url(&self, job: &TranslationJob) -> Result<Url, TranslatorError> {
        let base = format!(
            "{}/translator/document:translate",
            self.endpoint.trim_end_matches('/')
        );
        let mut url =
            Url::parse(&base).map_err(|_| TranslatorError::InvalidEndpoint(self.endpoint.clone()))?;

        {
            let mut query = url.query_pairs_mut();
            if let Some(ref source) = job.source_language {
                query.append_pair("sourceLanguage", source);
            }
            query.append_pair("targetLanguage", &job.target_language);
            query.append_pair("api-version", API_VERSION);
        }
        Ok(url)
    }
}

#[async_trait]
impl DocumentTranslator for AzureDocumentTranslator {
    async fn translate(&self, job: &TranslationJob) -> Result<Bytes, TranslatorError> {
        let url = self.request_url(job)?;

        let part = Part::bytes(job.content.to_vec())
            .file_name(job.file_name.clone())
            .mime_str(job.kind.mime_type())
            .map_err(|source| TranslatorError::Connect {
                url: url.to_string(),
                source,
            })?;
        let form = Form::new().part("document", part);

        info!(
            file = %job.file_name,
            target = %job.target_language,
            source = job.source_language.as_deref().unwrap_or("auto"),
            bytes = job.content.len(),
            "sending document for translation"
        );

        let response = self
            .client
            .post(url.clone())
            .header(KEY_HEADER, &self.key)
            .multipart(form)
            .send()
            .await
            .map_err(|source| TranslatorError::Connect {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslatorError::Status {
                status,
                message: error_message(&body),
            });
        }

        let mut stream = response.bytes_stream();
        let mut translated = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            translated.extend_from_slice(&chunk.map_err(TranslatorError::Body)?);
        }

        debug!(bytes = translated.len(), "received translated document");
        Ok(translated.freeze())
    }
}

/// Extracts `error.message` from a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.code {
            Some(code) if !code.is_empty() => format!("{code}: {}", envelope.error.message),
            _ => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "(empty response body)".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, header_exists, method, path, query_param, query_param_is_missing},
    };

    fn job(source: Option<&str>) -> TranslationJob {
        TranslationJob {
            content: Bytes::from_static(b"%PDF-1.7 original"),
            file_name: "report.pdf".to_string(),
            kind: DocumentKind::Pdf,
            target_language: "es".to_string(),
            source_language: source.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_translate_returns_document_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translator/document:translate"))
            .and(query_param("targetLanguage", "es"))
            .and(query_param("api-version", API_VERSION))
            .and(query_param_is_missing("sourceLanguage"))
            .and(header(KEY_HEADER, "secret"))
            .and(header_exists("content-type"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 traducido".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let translator = AzureDocumentTranslator::new(format!("{}/", server.uri()), "secret");
        let translated = translator.translate(&job(None)).await.unwrap();
        assert_eq!(&translated[..], b"%PDF-1.7 traducido");
    }

    #[tokio::test]
    async fn test_translate_sends_explicit_source_language() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("sourceLanguage", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let translator = AzureDocumentTranslator::new(server.uri(), "secret");
        translator.translate(&job(Some("en"))).await.unwrap();
    }

    #[tokio::test]
    async fn test_translate_surfaces_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":{"code":"InvalidRequest","message":"Target language is not valid."}}"#,
            ))
            .mount(&server)
            .await;

        let translator = AzureDocumentTranslator::new(server.uri(), "secret");
        let err = translator.translate(&job(None)).await.unwrap_err();
        match err {
            TranslatorError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "InvalidRequest: Target language is not valid.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_translate_unreachable_endpoint() {
        let translator = AzureDocumentTranslator::new("http://127.0.0.1:9", "secret");
        let err = translator.translate(&job(None)).await.unwrap_err();
        assert!(matches!(err, TranslatorError::Connect { .. }));
    }

    #[test]
    fn test_invalid_endpoint() {
        let translator = AzureDocumentTranslator::new("not a url", "secret");
        let err = translator.request_url(&job(None)).unwrap_err();
        assert!(matches!(err, TranslatorError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message("Service busy"), "Service busy");
        assert_eq!(error_message(""), "(empty response body)");
        assert_eq!(
            error_message(r#"{"error":{"message":"Quota exceeded"}}"#),
            "Quota exceeded"
        );
    }
}
