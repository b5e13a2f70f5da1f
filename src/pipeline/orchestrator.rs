//! Request coordination from a raw reference to a delivered translation.

use bytes::Bytes;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::outcome::{Delivery, Destination, TranslationOutcome};
use crate::config::Settings;
use crate::document::{DocumentKind, Provenance, ResolvedSource};
use crate::error::Error;
use crate::fs::{ScratchDir, ScratchFile, atomic_write, sibling_path};
use crate::locate::{DirectoryLocator, FuzzyMatcher};
use crate::reference::{DocumentReference, PathPreference, ReferenceClassifier, ResolutionMode};
use crate::storage::{
    AzureBlobStore, ObjectStore, StorageCredentials, StorageError, StorageGateway,
    StorageLocation, parse_url,
};
use crate::translation::{
    AUTO_DETECT, AzureDocumentTranslator, DocumentTranslator, ENDPOINT_VAR, KEY_VAR,
    SourceLanguage, TranslationJob, normalize_language,
};

/// One translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub reference: String,
    pub target_language: String,
    /// A language name or code, or `"auto"`.
    pub source_language: String,
    /// Empty means next to the input, in the input's storage.
    pub output_reference: String,
    pub mode: ResolutionMode,
    /// Only search this container for bare filenames in storage mode.
    pub container_hint: Option<String>,
}

impl TranslateRequest {
    /// A request resolved through object storage with automatic source detection.
    pub fn new(reference: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            target_language: target_language.into(),
            source_language: AUTO_DETECT.to_string(),
            output_reference: String::new(),
            mode: ResolutionMode::Storage,
            container_hint: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source_language: impl Into<String>) -> Self {
        self.source_language = source_language.into();
        self
    }

    #[must_use]
    pub fn with_output(mut self, output_reference: impl Into<String>) -> Self {
        self.output_reference = output_reference.into();
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_container_hint(mut self, container: Option<String>) -> Self {
        self.container_hint = container;
        self
    }
}

/// Where the translated bytes will be written.
#[derive(Debug, Clone)]
enum OutputTarget {
    Local(PathBuf),
    Storage(StorageLocation),
}

/// A resolved source and the scratch copy backing it, if any.
///
/// The scratch file is removed when this is dropped.
struct Staged {
    source: ResolvedSource,
    _scratch: Option<ScratchFile>,
}

/// Runs translation requests against injected backends.
///
/// Backends are owned per instance. A backend that could not be configured is
/// kept as the reason it is missing and reported only when a request needs it.
pub struct Orchestrator {
    classifier: ReferenceClassifier,
    locator: DirectoryLocator,
    matcher: FuzzyMatcher,
    translator: Result<Arc<dyn DocumentTranslator>, Vec<&'static str>>,
    storage: Result<StorageGateway, String>,
    storage_account: Option<String>,
    scratch: ScratchDir,
    timeout: Option<Duration>,
}

impl Orchestrator {
    /// An orchestrator with no backends configured.
    pub fn new(scratch: ScratchDir) -> Self {
        Self {
            classifier: ReferenceClassifier::default(),
            locator: DirectoryLocator::default(),
            matcher: FuzzyMatcher::default(),
            translator: Err(vec![ENDPOINT_VAR, KEY_VAR]),
            storage: Err("object storage is not configured".to_string()),
            storage_account: None,
            scratch,
            timeout: None,
        }
    }

    /// Builds the Azure backends described by `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let scratch = ScratchDir::new(settings.scratch_dir.clone());

        let translator = match (&settings.translation_endpoint, &settings.translation_key) {
            (Some(endpoint), Some(key)) => Ok(Arc::new(AzureDocumentTranslator::new(
                endpoint.clone(),
                key.clone(),
            )) as Arc<dyn DocumentTranslator>),
            _ => Err(settings.missing_translation_vars()),
        };

        let credentials = StorageCredentials::resolve(
            settings.storage_connection_string.as_deref(),
            settings.storage_account_name.as_deref(),
            settings.storage_account_key.as_deref(),
        );
        let storage_account = credentials.as_ref().ok().map(|c| c.account.clone());
        let storage = credentials
            .map(|credentials| {
                StorageGateway::new(Arc::new(AzureBlobStore::new(credentials)), scratch.clone())
                    .with_preferred_containers(settings.preferred_containers.clone())
                    .with_scan_limit(settings.container_scan_limit)
            })
            .map_err(|e| e.to_string());

        Self {
            classifier: ReferenceClassifier::new(settings.ambiguous_paths),
            locator: DirectoryLocator::new(settings.documents_folder.clone()),
            matcher: FuzzyMatcher::new(settings.partial_matching),
            translator,
            storage,
            storage_account,
            scratch,
            timeout: settings.timeout,
        }
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn DocumentTranslator>) -> Self {
        self.translator = Ok(translator);
        self
    }

    /// Uses `store` behind a gateway with default container preferences.
    #[must_use]
    pub fn with_store(self, store: Arc<dyn ObjectStore>) -> Self {
        let gateway = StorageGateway::new(store, self.scratch.clone());
        self.with_gateway(gateway)
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: StorageGateway) -> Self {
        self.storage = Ok(gateway);
        self.storage_account = None;
        self
    }

    #[must_use]
    pub fn with_locator(mut self, locator: DirectoryLocator) -> Self {
        self.locator = locator;
        self
    }

    #[must_use]
    pub const fn with_matcher(mut self, matcher: FuzzyMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    #[must_use]
    pub const fn with_classifier(mut self, classifier: ReferenceClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Bounds each backend call; `None` waits indefinitely.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn locator(&self) -> &DirectoryLocator {
        &self.locator
    }

    pub const fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    pub const fn classifier(&self) -> &ReferenceClassifier {
        &self.classifier
    }

    pub const fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// The storage gateway, or why it is unavailable.
    pub fn storage(&self) -> Result<&StorageGateway, Error> {
        self.storage
            .as_ref()
            .map_err(|reason| Error::StorageBackendUnavailable(reason.clone()))
    }

    /// Translation variables that still need to be set; empty when configured.
    pub fn missing_translation_vars(&self) -> &[&'static str] {
        match &self.translator {
            Ok(_) => &[],
            Err(missing) => missing,
        }
    }

    /// Translates with the positional caller contract.
    ///
    /// `force_storage_mode` resolves everything through object storage;
    /// otherwise the classifier decides.
    pub async fn translate_document(
        &self,
        reference: &str,
        target_language: &str,
        source_language: &str,
        output_reference: &str,
        force_storage_mode: bool,
    ) -> TranslationOutcome {
        let mode = if force_storage_mode {
            ResolutionMode::Storage
        } else {
            ResolutionMode::Auto
        };
        let request = TranslateRequest::new(reference, target_language)
            .with_source(source_language)
            .with_output(output_reference)
            .with_mode(mode);
        self.translate(&request).await
    }

    /// Runs one request to a terminal outcome. Never fails outward.
    pub async fn translate(&self, request: &TranslateRequest) -> TranslationOutcome {
        let outcome = TranslationOutcome::from(self.run(request).await);
        match &outcome {
            TranslationOutcome::Success(delivery) => info!(
                input = %delivery.input,
                output = %delivery.destination.identifier(),
                bytes = delivery.byte_count,
                "translation delivered"
            ),
            TranslationOutcome::Failure(failure) => {
                warn!(kind = ?failure.kind, reference = %request.reference, "translation failed");
            }
        }
        outcome
    }

    async fn run(&self, request: &TranslateRequest) -> Result<Delivery, Error> {
        let raw = request.reference.trim();
        if raw.is_empty() {
            return Err(Error::MalformedReference(
                "No document reference given".to_string(),
            ));
        }

        let reference = self.classify(raw, request.mode)?;
        debug!(%reference, mode = ?request.mode, "classified reference");

        let target = normalize_language(&request.target_language).ok_or_else(|| {
            Error::InvalidLanguage {
                input: request.target_language.clone(),
                role: "target",
            }
        })?;
        let source =
            SourceLanguage::parse(&request.source_language).ok_or_else(|| Error::InvalidLanguage {
                input: request.source_language.clone(),
                role: "source",
            })?;

        let translator = self
            .translator
            .as_ref()
            .map_err(|missing| Error::TranslationCredentialsMissing {
                missing: missing.clone(),
            })?;

        let staged = self.resolve(reference, request).await?;
        let resolved = &staged.source;
        info!(
            name = %resolved.display_name,
            kind = %resolved.kind,
            bytes = resolved.byte_len(),
            temp = ?resolved.temp_path,
            "resolved source"
        );

        let target_output = self.plan_output(request, &resolved.provenance, &target)?;

        let job = TranslationJob {
            content: resolved.content.clone(),
            file_name: resolved.display_name.clone(),
            kind: resolved.kind,
            target_language: target.clone(),
            source_language: source.as_code().map(str::to_string),
        };
        debug!(target = %job.target_language, source = %source, "calling translation backend");
        let translated = self
            .bounded("translation", Error::TranslationBackend, translator.translate(&job))
            .await?;
        if translated.is_empty() {
            return Err(Error::TranslationBackend(
                "The translation service returned an empty document".to_string(),
            ));
        }

        let destination = self.deliver(target_output, &translated).await?;

        Ok(Delivery {
            input: raw.to_string(),
            input_name: resolved.display_name.clone(),
            kind: resolved.kind,
            source_language: source,
            target_language: target,
            destination,
            byte_count: translated.len(),
        })
    }

    fn classify(&self, raw: &str, mode: ResolutionMode) -> Result<DocumentReference, Error> {
        let reference = match mode {
            ResolutionMode::Auto => self.classifier.classify(raw),
            ResolutionMode::Local => ReferenceClassifier::new(PathPreference::Local).classify(raw),
            ResolutionMode::Storage => self.classifier.classify(raw).into_storage()?,
        };
        Ok(reference)
    }

    async fn resolve(
        &self,
        reference: DocumentReference,
        request: &TranslateRequest,
    ) -> Result<Staged, Error> {
        match reference {
            DocumentReference::StorageUrl(url) => {
                let location = self.location_from_url(&url)?;
                self.resolve_storage(location).await
            }
            DocumentReference::StoragePath(location) => self.resolve_storage(location).await,
            DocumentReference::BareFilename(name) if request.mode == ResolutionMode::Storage => {
                let gateway = self.storage()?;
                let location = self
                    .bounded(
                        "storage search",
                        Error::StorageBackendUnavailable,
                        gateway.find_by_filename(&name, request.container_hint.as_deref()),
                    )
                    .await?;
                self.resolve_storage(location).await
            }
            DocumentReference::BareFilename(name) => {
                let path = self.search_documents_folder(&name)?;
                self.resolve_local(path).await
            }
            DocumentReference::LocalPath(path) => self.resolve_local(absolutize(&path)?).await,
        }
    }

    fn location_from_url(&self, url: &str) -> Result<StorageLocation, Error> {
        let parsed = parse_url(url)?;
        if let Some(ref account) = self.storage_account
            && !parsed.account.eq_ignore_ascii_case(account)
        {
            warn!(
                url_account = %parsed.account,
                configured = %account,
                "URL names another storage account, using the configured one"
            );
        }
        Ok(parsed.location)
    }

    fn search_documents_folder(&self, name: &str) -> Result<PathBuf, Error> {
        let Some(directory) = self.locator.find_first_valid() else {
            let host = self.locator.host();
            return Err(Error::DirectoryNotFound {
                searched: self.locator.enumerate(),
                platform: host.platform.name().to_string(),
                home: host.home,
            });
        };
        debug!(directory = %directory.display(), "searching documents folder");

        match self.matcher.find(name, &directory) {
            Ok(Some(found)) => {
                debug!(path = %found.path.display(), stage = ?found.stage, "matched file");
                Ok(found.path)
            }
            Ok(None) => Err(Error::FileNotFound {
                reference: name.to_string(),
                location: format!("Documents folder: {}", directory.display()),
                suggestions: Some(self.matcher.suggestions(name, &directory)),
            }),
            Err(e) => Err(Error::UnreadableFile {
                path: directory,
                reason: format!("Cannot list folder ({e})"),
            }),
        }
    }

    async fn resolve_local(&self, path: PathBuf) -> Result<Staged, Error> {
        if !path.exists() {
            return Err(StorageError::LocalFileMissing(path).into());
        }
        if !path.is_file() {
            return Err(Error::UnreadableFile {
                path,
                reason: "Not a file".to_string(),
            });
        }

        let display_name = file_name_of(&path);
        let Some(kind) = DocumentKind::from_path(&path) else {
            return Err(Error::UnsupportedFormat {
                extension: path
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
                    .unwrap_or_default(),
                reference: display_name,
            });
        };

        let content = tokio::fs::read(&path)
            .await
            .map_err(|e| Error::UnreadableFile {
                path: path.clone(),
                reason: format!("Cannot read file ({e})"),
            })?;

        Ok(Staged {
            source: ResolvedSource {
                content: Bytes::from(content),
                display_name,
                kind,
                provenance: Provenance::Local(path),
                temp_path: None,
            },
            _scratch: None,
        })
    }

    async fn resolve_storage(&self, location: StorageLocation) -> Result<Staged, Error> {
        let gateway = self.storage()?;

        let Some(kind) = DocumentKind::from_name(location.file_name()) else {
            return Err(Error::UnsupportedFormat {
                extension: location.extension().to_lowercase(),
                reference: location.to_string(),
            });
        };

        let download = self
            .bounded(
                "download",
                Error::StorageBackendUnavailable,
                gateway.download_to_temp(&location),
            )
            .await?;

        let display_name = download.file_name().to_string();
        let temp_path = download.file.path().to_path_buf();
        Ok(Staged {
            source: ResolvedSource {
                content: download.content,
                display_name,
                kind,
                provenance: Provenance::Storage(download.location),
                temp_path: Some(temp_path),
            },
            _scratch: Some(download.file),
        })
    }

    /// Decides the output location before any bytes are translated.
    ///
    /// Without an explicit output the sibling of the input is used. A bare
    /// filename lands next to the input in the input's storage; any other
    /// reference keeps its own storage kind.
    fn plan_output(
        &self,
        request: &TranslateRequest,
        input: &Provenance,
        language: &str,
    ) -> Result<OutputTarget, Error> {
        let output = request.output_reference.trim();

        let target = if output.is_empty() {
            match input {
                Provenance::Local(path) => OutputTarget::Local(sibling_path(path, language)),
                Provenance::Storage(location) => OutputTarget::Storage(location.sibling(language)),
            }
        } else {
            let classifier = match request.mode {
                ResolutionMode::Local => ReferenceClassifier::new(PathPreference::Local),
                ResolutionMode::Auto | ResolutionMode::Storage => self.classifier,
            };
            match classifier.classify(output) {
                DocumentReference::BareFilename(name) => match input {
                    Provenance::Local(path) => OutputTarget::Local(path.with_file_name(name)),
                    Provenance::Storage(location) => {
                        OutputTarget::Storage(location.with_file_name(&name))
                    }
                },
                DocumentReference::LocalPath(path) => OutputTarget::Local(absolutize(&path)?),
                DocumentReference::StoragePath(location) => OutputTarget::Storage(location),
                DocumentReference::StorageUrl(url) => {
                    OutputTarget::Storage(self.location_from_url(&url)?)
                }
            }
        };

        if matches!(target, OutputTarget::Storage(_)) {
            self.storage()?;
        }
        debug!(?target, "planned output");
        Ok(target)
    }

    async fn deliver(&self, target: OutputTarget, content: &Bytes) -> Result<Destination, Error> {
        match target {
            OutputTarget::Local(path) => {
                atomic_write(&path, content).map_err(|e| Error::UploadFailed {
                    destination: path.display().to_string(),
                    reason: format!("{e:#}"),
                })?;
                info!(path = %path.display(), bytes = content.len(), "wrote translated document");
                Ok(Destination::Local { path })
            }
            OutputTarget::Storage(location) => {
                let gateway = self.storage()?;
                let destination = location.to_string();

                let staged = self
                    .scratch
                    .create(&location.extension(), content)
                    .map_err(|e| Error::UploadFailed {
                        destination: destination.clone(),
                        reason: format!("{e:#}"),
                    })?;

                let url = self
                    .bounded(
                        "upload",
                        |reason| Error::UploadFailed {
                            destination: destination.clone(),
                            reason,
                        },
                        async {
                            gateway
                                .upload_from_local(staged.path(), &location, true)
                                .await
                                .map_err(|e| Error::upload(destination.clone(), &e))
                        },
                    )
                    .await?;

                Ok(Destination::Storage { location, url })
            }
        }
    }

    /// Awaits `work`, failing with `timed_out` once the configured budget runs out.
    async fn bounded<T, E, F>(
        &self,
        stage: &str,
        timed_out: F,
        work: impl Future<Output = Result<T, E>>,
    ) -> Result<T, Error>
    where
        E: Into<Error>,
        F: FnOnce(String) -> Error,
    {
        let Some(limit) = self.timeout else {
            return work.await.map_err(Into::into);
        };
        match tokio::time::timeout(limit, work).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(timed_out(format!(
                "The {stage} did not finish within {}s",
                limit.as_secs()
            ))),
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Expands a leading `~` and makes the path absolute without touching the disk.
fn absolutize(path: &Path) -> Result<PathBuf, Error> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };
    std::path::absolute(&expanded).map_err(|e| {
        Error::MalformedReference(format!("Cannot resolve path '{}': {e}", path.display()))
    })
}
