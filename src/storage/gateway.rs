//! Reference-level storage operations on top of an [`ObjectStore`].

use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ObjectInfo, ObjectStore, Result, StorageError, StorageLocation};
use crate::document::is_supported_name;
use crate::fs::{ScratchDir, ScratchFile};
use crate::locate::{matches_exactly, matches_with_extension};

/// Containers searched first when only a filename is known.
pub const DEFAULT_PREFERRED_CONTAINERS: &[&str] =
    &["documents", "files", "source", "input", "uploads"];

/// Discovered containers scanned when none of the preferred ones exist.
pub const DEFAULT_CONTAINER_SCAN_LIMIT: usize = 10;

/// A downloaded object and its local scratch copy.
///
/// `content` holds the same bytes as `file`; callers translate from memory and
/// keep `file` only so a local copy with the original extension exists for
/// the lifetime of the request.
#[derive(Debug)]
pub struct Download {
    /// Deleted when dropped.
    pub file: ScratchFile,
    pub content: Bytes,
    pub location: StorageLocation,
}

impl Download {
    pub fn file_name(&self) -> &str {
        self.location.file_name()
    }
}

#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn ObjectStore>,
    preferred_containers: Vec<String>,
    scan_limit: usize,
    scratch: ScratchDir,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn ObjectStore>, scratch: ScratchDir) -> Self {
        Self {
            store,
            preferred_containers: DEFAULT_PREFERRED_CONTAINERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            scan_limit: DEFAULT_CONTAINER_SCAN_LIMIT,
            scratch,
        }
    }

    #[must_use]
    pub fn with_preferred_containers(mut self, containers: Vec<String>) -> Self {
        self.preferred_containers = containers;
        self
    }

    #[must_use]
    pub const fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit;
        self
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn object_url(&self, location: &StorageLocation) -> String {
        self.store.object_url(location)
    }

    /// Downloads an object into a scratch file that keeps its extension.
    pub async fn download_to_temp(&self, location: &StorageLocation) -> Result<Download> {
        info!(%location, provider = self.store.provider_name(), "downloading object");
        let content = self.store.get(location).await?;

        let file = self
            .scratch
            .create(&location.extension(), &content)
            .map_err(|e| StorageError::Unavailable(format!("cannot stage download: {e:#}")))?;

        Ok(Download {
            file,
            content,
            location: location.clone(),
        })
    }

    /// Uploads a local file and returns the object's URL.
    ///
    /// Without `overwrite` an existing object is reported as
    /// [`StorageError::AlreadyExists`] before any bytes are sent.
    pub async fn upload_from_local(
        &self,
        path: &Path,
        destination: &StorageLocation,
        overwrite: bool,
    ) -> Result<String> {
        if !path.is_file() {
            return Err(StorageError::LocalFileMissing(path.to_path_buf()));
        }
        let data = tokio::fs::read(path)
            .await
            .map_err(|_| StorageError::LocalFileMissing(path.to_path_buf()))?;

        if !overwrite && self.store.exists(destination).await? {
            return Err(StorageError::AlreadyExists(destination.to_string()));
        }

        info!(%destination, bytes = data.len(), "uploading object");
        self.store
            .put(destination, Bytes::from(data), overwrite)
            .await
    }

    /// Finds an object by filename using exact and extension-inferred rules.
    ///
    /// With a hint only that container is searched. Otherwise the preferred
    /// containers that exist are searched, or, if none exist, the first
    /// `scan_limit` containers of the account.
    pub async fn find_by_filename(
        &self,
        filename: &str,
        container_hint: Option<&str>,
    ) -> Result<StorageLocation> {
        let containers = match container_hint {
            Some(container) => vec![container.to_string()],
            None => self.search_containers().await?,
        };

        for container in &containers {
            let mut objects = match self.store.list_objects(container).await {
                Ok(objects) => objects,
                Err(StorageError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            objects.sort_by(|a, b| a.key.cmp(&b.key));

            let hit = objects
                .iter()
                .find(|o| matches_exactly(o.file_name(), filename))
                .or_else(|| {
                    objects
                        .iter()
                        .find(|o| matches_with_extension(o.file_name(), filename))
                });

            if let Some(object) = hit {
                let location = StorageLocation::new(container.clone(), object.key.clone());
                debug!(%location, "object matched by filename");
                return Ok(location);
            }
        }

        Err(StorageError::NotFound(format!(
            "'{filename}' in containers: {}",
            if containers.is_empty() {
                "(none)".to_string()
            } else {
                containers.join(", ")
            }
        )))
    }

    async fn search_containers(&self) -> Result<Vec<String>> {
        let mut existing = Vec::new();
        for container in &self.preferred_containers {
            if self.store.container_exists(container).await? {
                existing.push(container.clone());
            }
        }
        if !existing.is_empty() {
            return Ok(existing);
        }

        let mut discovered = self.store.list_containers().await?;
        discovered.truncate(self.scan_limit);
        debug!(count = discovered.len(), "scanning discovered containers");
        Ok(discovered)
    }

    /// Sibling key with `_<language>` before the extension.
    pub fn suggest_output_reference(
        &self,
        input: &StorageLocation,
        language: &str,
    ) -> StorageLocation {
        input.sibling(language)
    }

    /// Supported documents in a container, sorted case-insensitively.
    pub async fn list_documents(&self, container: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects: Vec<_> = self
            .store
            .list_objects(container)
            .await?
            .into_iter()
            .filter(|o| is_supported_name(o.file_name()))
            .collect();
        objects.sort_by_key(|o| o.key.to_lowercase());
        Ok(objects)
    }
}
