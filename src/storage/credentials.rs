//! Storage account credentials and request signing.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use super::StorageError;

pub const CONNECTION_STRING_VAR: &str = "AZURE_STORAGE_CONNECTION_STRING";
pub const ACCOUNT_NAME_VAR: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const ACCOUNT_KEY_VAR: &str = "AZURE_STORAGE_ACCOUNT_KEY";

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// How requests to the storage account are authorized.
#[derive(Clone)]
pub enum StorageAuth {
    /// Account key, decoded from base64.
    SharedKey(Vec<u8>),
    /// Shared access signature query string, without the leading `?`.
    Sas(String),
}

impl fmt::Debug for StorageAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedKey(_) => f.write_str("SharedKey(***)"),
            Self::Sas(_) => f.write_str("Sas(***)"),
        }
    }
}

/// Resolved storage account endpoint and authorization.
#[derive(Debug, Clone)]
pub struct StorageCredentials {
    pub account: String,
    pub blob_endpoint: Url,
    pub auth: StorageAuth,
}

impl StorageCredentials {
    /// Builds credentials from a connection string, or an account name/key pair.
    ///
    /// The connection string wins when both are present.
    pub fn resolve(
        connection_string: Option<&str>,
        account_name: Option<&str>,
        account_key: Option<&str>,
    ) -> Result<Self, StorageError> {
        if let Some(conn) = connection_string.filter(|s| !s.trim().is_empty()) {
            return Self::from_connection_string(conn);
        }

        match (account_name, account_key) {
            (Some(name), Some(key)) if !name.is_empty() && !key.is_empty() => {
                Self::from_account_key(name, key)
            }
            _ => Err(StorageError::Unavailable(format!(
                "storage credentials not configured. Set {CONNECTION_STRING_VAR}, \
                 or both {ACCOUNT_NAME_VAR} and {ACCOUNT_KEY_VAR}"
            ))),
        }
    }

    pub fn from_account_key(account: &str, key: &str) -> Result<Self, StorageError> {
        let blob_endpoint = default_endpoint("https", account, DEFAULT_ENDPOINT_SUFFIX)?;
        Ok(Self {
            account: account.to_string(),
            blob_endpoint,
            auth: StorageAuth::SharedKey(decode_key(key)?),
        })
    }

    /// Parses `Key=Value;...` connection strings.
    ///
    /// Supports `AccountName` + `AccountKey` (with optional
    /// `DefaultEndpointsProtocol` and `EndpointSuffix`), or `BlobEndpoint` +
    /// `SharedAccessSignature`.
    pub fn from_connection_string(conn: &str) -> Result<Self, StorageError> {
        let parts: BTreeMap<String, String> = conn
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();

        let get = |key: &str| parts.get(key).filter(|v| !v.is_empty());

        let blob_endpoint = match get("blobendpoint") {
            Some(endpoint) => Url::parse(endpoint).map_err(|e| {
                StorageError::Unavailable(format!("invalid BlobEndpoint in connection string: {e}"))
            })?,
            None => {
                let account = get("accountname").ok_or_else(|| {
                    StorageError::Unavailable(
                        "connection string has neither AccountName nor BlobEndpoint".to_string(),
                    )
                })?;
                let protocol = get("defaultendpointsprotocol").map_or("https", String::as_str);
                let suffix = get("endpointsuffix").map_or(DEFAULT_ENDPOINT_SUFFIX, String::as_str);
                default_endpoint(protocol, account, suffix)?
            }
        };

        let account = match get("accountname") {
            Some(name) => name.clone(),
            None => blob_endpoint
                .host_str()
                .and_then(|host| host.split('.').next())
                .unwrap_or_default()
                .to_string(),
        };

        let auth = if let Some(key) = get("accountkey") {
            StorageAuth::SharedKey(decode_key(key)?)
        } else if let Some(sas) = get("sharedaccesssignature") {
            StorageAuth::Sas(sas.trim_start_matches('?').to_string())
        } else {
            return Err(StorageError::Unavailable(
                "connection string has neither AccountKey nor SharedAccessSignature".to_string(),
            ));
        };

        Ok(Self {
            account,
            blob_endpoint,
            auth,
        })
    }

    /// Appends the SAS token to a request URL when SAS auth is in use.
    pub fn apply_sas(&self, url: &mut Url) {
        if let StorageAuth::Sas(token) = &self.auth {
            let merged = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{token}"),
                _ => token.clone(),
            };
            url.set_query(Some(&merged));
        }
    }

    /// Adds a SharedKey `Authorization` header; a no-op for SAS auth.
    pub fn sign(&self, request: &mut Request) -> Result<(), StorageError> {
        let StorageAuth::SharedKey(key) = &self.auth else {
            return Ok(());
        };

        let payload = string_to_sign(&self.account, request);
        let mut mac = Hmac::<Sha256>::new_from_slice(key)
            .map_err(|e| StorageError::Unavailable(format!("invalid account key: {e}")))?;
        mac.update(payload.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        let value = HeaderValue::from_str(&format!("SharedKey {}:{signature}", self.account))
            .map_err(|e| StorageError::Unavailable(format!("invalid authorization header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

fn default_endpoint(protocol: &str, account: &str, suffix: &str) -> Result<Url, StorageError> {
    Url::parse(&format!("{protocol}://{account}.blob.{suffix}"))
        .map_err(|e| StorageError::Unavailable(format!("invalid storage account name: {e}")))
}

fn decode_key(key: &str) -> Result<Vec<u8>, StorageError> {
    STANDARD
        .decode(key.trim())
        .map_err(|_| {
            StorageError::Unavailable("storage account key is not valid base64".to_string())
        })
}

/// Builds the SharedKey string-to-sign for a Blob service request.
pub(crate) fn string_to_sign(account: &str, request: &Request) -> String {
    let headers = request.headers();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    };

    let content_length = request
        .body()
        .and_then(reqwest::Body::as_bytes)
        .map_or(0, <[u8]>::len);

    let mut out = String::new();
    out.push_str(request.method().as_str());
    out.push('\n');
    for name in ["content-encoding", "content-language"] {
        out.push_str(header(name));
        out.push('\n');
    }
    if content_length > 0 {
        out.push_str(&content_length.to_string());
    }
    out.push('\n');
    for name in [
        "content-md5",
        "content-type",
        "date",
        "if-modified-since",
        "if-match",
        "if-none-match",
        "if-unmodified-since",
        "range",
    ] {
        out.push_str(header(name));
        out.push('\n');
    }

    let ms_headers: BTreeMap<&str, &str> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-ms-"))
        .map(|(name, value)| (name.as_str(), value.to_str().unwrap_or_default().trim()))
        .collect();
    for (name, value) in ms_headers {
        out.push_str(name);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }

    let url = request.url();
    out.push('/');
    out.push_str(account);
    out.push_str(url.path());

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in url.query_pairs() {
        params
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into_owned());
    }
    for (name, mut values) in params {
        values.sort();
        out.push('\n');
        out.push_str(&name);
        out.push(':');
        out.push_str(&values.join(","));
    }

    out
}
