//! Object storage access.
//!
//! [`ObjectStore`] is the seam to the external storage backend; the
//! [`StorageGateway`] layers reference resolution, temp-file materialization
//! and filename search on top of it.

mod azure;
mod credentials;
mod gateway;
mod location;

pub use azure::AzureBlobStore;
pub use credentials::{
    ACCOUNT_KEY_VAR, ACCOUNT_NAME_VAR, CONNECTION_STRING_VAR, StorageAuth, StorageCredentials,
};
pub use gateway::{
    DEFAULT_CONTAINER_SCAN_LIMIT, DEFAULT_PREFERRED_CONTAINERS, Download, StorageGateway,
};
pub use location::{
    STORAGE_DOMAIN_MARKERS, StorageLocation, StorageUrl, is_storage_reference, is_storage_url,
    looks_like_storage_path, parse_path, parse_url,
};

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Malformed storage reference: {0}")]
    MalformedReference(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Local file missing: {}", .0.display())]
    LocalFileMissing(PathBuf),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Listing entry for an object in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
}

impl ObjectInfo {
    /// The last path segment of the key.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// Standard object-storage operations against a single account.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Backend name used in logs and diagnostics.
    fn provider_name(&self) -> &'static str;

    /// Public URL (or identifier) of an object.
    fn object_url(&self, location: &StorageLocation) -> String;

    async fn exists(&self, location: &StorageLocation) -> Result<bool>;

    /// Downloads a full object. Missing objects yield [`StorageError::NotFound`].
    async fn get(&self, location: &StorageLocation) -> Result<Bytes>;

    /// Uploads an object, returning its URL.
    ///
    /// With `overwrite` false an existing object yields
    /// [`StorageError::AlreadyExists`].
    async fn put(&self, location: &StorageLocation, data: Bytes, overwrite: bool)
    -> Result<String>;

    async fn list_containers(&self) -> Result<Vec<String>>;

    async fn container_exists(&self, container: &str) -> Result<bool>;

    async fn list_objects(&self, container: &str) -> Result<Vec<ObjectInfo>>;
}
