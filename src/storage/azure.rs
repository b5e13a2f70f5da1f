//! Azure Blob Storage backend over the Blob service REST API.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, IF_NONE_MATCH};
use reqwest::{Client, Method, Response, StatusCode};
use tracing::debug;
use url::Url;

use super::credentials::StorageCredentials;
use super::{ObjectInfo, ObjectStore, Result, StorageError, StorageLocation};
use crate::document::DocumentKind;

const API_VERSION: &str = "2021-08-06";

/// [`ObjectStore`] backed by an Azure storage account.
pub struct AzureBlobStore {
    client: Client,
    credentials: StorageCredentials,
}

impl AzureBlobStore {
    pub fn new(credentials: StorageCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
        }
    }

    pub const fn credentials(&self) -> &StorageCredentials {
        &self.credentials
    }

    /// Builds a request URL; `segments` are appended as encoded path parts.
    fn url_for(&self, segments: &[&str], query: &[(&str, &str)], with_sas: bool) -> Result<Url> {
        let mut url = self.credentials.blob_endpoint.clone();
        if !segments.is_empty() {
            let mut path = url.path_segments_mut().map_err(|()| {
                StorageError::Unavailable("blob endpoint cannot be used as a base URL".to_string())
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        if with_sas {
            self.credentials.apply_sas(&mut url);
        }
        Ok(url)
    }

    fn object_segments(location: &StorageLocation) -> Vec<&str> {
        std::iter::once(location.container.as_str())
            .chain(location.key.split('/').filter(|s| !s.is_empty()))
            .collect()
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let mut builder = self
            .client
            .request(method.clone(), url)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-date", http_date())
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let mut request = builder.build()?;
        self.credentials.sign(&mut request)?;

        debug!(%method, path = request.url().path(), "blob request");
        Ok(self.client.execute(request).await?)
    }

    /// Fetches every page of a listing, following `NextMarker`.
    async fn list_pages<T>(
        &self,
        segments: &[&str],
        base_query: &[(&str, &str)],
        parse: fn(&str) -> Result<(Vec<T>, Option<String>)>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut query = base_query.to_vec();
            if let Some(ref m) = marker {
                query.push(("marker", m.as_str()));
            }
            let url = self.url_for(segments, &query, true)?;
            let response = self.execute(Method::GET, url, HeaderMap::new(), None).await?;
            let body = check_status(response, &segments.join("/")).await?.text().await?;

            let (page, next) = parse(&body)?;
            items.extend(page);
            match next {
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl ObjectStore for AzureBlobStore {
    fn provider_name(&self) -> &'static str {
        "azure-blob"
    }

    fn object_url(&self, location: &StorageLocation) -> String {
        self.url_for(&Self::object_segments(location), &[], false)
            .map_or_else(|_| location.to_string(), String::from)
    }

    async fn exists(&self, location: &StorageLocation) -> Result<bool> {
        let url = self.url_for(&Self::object_segments(location), &[], true)?;
        let response = self.execute(Method::HEAD, url, HeaderMap::new(), None).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => check_status(response, &location.to_string()).await.map(|_| true),
        }
    }

    async fn get(&self, location: &StorageLocation) -> Result<Bytes> {
        let url = self.url_for(&Self::object_segments(location), &[], true)?;
        let response = self.execute(Method::GET, url, HeaderMap::new(), None).await?;
        let response = check_status(response, &location.to_string()).await?;
        Ok(response.bytes().await?)
    }

    async fn put(
        &self,
        location: &StorageLocation,
        data: Bytes,
        overwrite: bool,
    ) -> Result<String> {
        let url = self.url_for(&Self::object_segments(location), &[], true)?;

        let content_type = DocumentKind::from_name(location.file_name())
            .map_or("application/octet-stream", DocumentKind::mime_type);
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        if !overwrite {
            headers.insert(IF_NONE_MATCH, HeaderValue::from_static("*"));
        }

        let response = self.execute(Method::PUT, url, headers, Some(data)).await?;
        if !overwrite
            && matches!(
                response.status(),
                StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED
            )
        {
            return Err(StorageError::AlreadyExists(location.to_string()));
        }
        check_status(response, &location.to_string()).await?;

        Ok(self.object_url(location))
    }

    async fn list_containers(&self) -> Result<Vec<String>> {
        self.list_pages(&[], &[("comp", "list")], parse_container_list)
            .await
    }

    async fn container_exists(&self, container: &str) -> Result<bool> {
        let url = self.url_for(&[container], &[("restype", "container")], true)?;
        let response = self.execute(Method::HEAD, url, HeaderMap::new(), None).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => check_status(response, container).await.map(|_| true),
        }
    }

    async fn list_objects(&self, container: &str) -> Result<Vec<ObjectInfo>> {
        self.list_pages(
            &[container],
            &[("restype", "container"), ("comp", "list")],
            parse_blob_list,
        )
        .await
    }
}

fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Maps non-success statuses to storage errors, passing successes through.
async fn check_status(response: Response, target: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(&body).unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => Err(StorageError::NotFound(target.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StorageError::Unavailable(
            format!("authorization failed ({status}): {message}"),
        )),
        _ => Err(StorageError::Unavailable(format!(
            "request for '{target}' failed with status {status}: {message}"
        ))),
    }
}

fn parse_document(xml: &str) -> Result<roxmltree::Document<'_>> {
    roxmltree::Document::parse(xml.trim_start_matches('\u{feff}'))
        .map_err(|e| StorageError::Unavailable(format!("invalid listing response: {e}")))
}

fn child_text<'a>(node: roxmltree::Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|c| c.has_tag_name(name))
        .and_then(|c| c.text())
}

fn next_marker(doc: &roxmltree::Document<'_>) -> Option<String> {
    child_text(doc.root_element(), "NextMarker")
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

fn parse_container_list(xml: &str) -> Result<(Vec<String>, Option<String>)> {
    let doc = parse_document(xml)?;
    let names = doc
        .descendants()
        .filter(|n| n.has_tag_name("Container"))
        .filter_map(|n| child_text(n, "Name"))
        .map(String::from)
        .collect();
    Ok((names, next_marker(&doc)))
}

fn parse_blob_list(xml: &str) -> Result<(Vec<ObjectInfo>, Option<String>)> {
    let doc = parse_document(xml)?;
    let objects = doc
        .descendants()
        .filter(|n| n.has_tag_name("Blob"))
        .filter_map(|blob| {
            let key = child_text(blob, "Name")?.to_string();
            let size = blob
                .children()
                .find(|c| c.has_tag_name("Properties"))
                .and_then(|p| child_text(p, "Content-Length"))
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0);
            Some(ObjectInfo { key, size })
        })
        .collect();
    Ok((objects, next_marker(&doc)))
}

fn parse_error_message(xml: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(xml.trim_start_matches('\u{feff}')).ok()?;
    let root = doc.root_element();
    let code = child_text(root, "Code").unwrap_or_default();
    let message = child_text(root, "Message")?.lines().next()?.trim();
    Some(if code.is_empty() {
        message.to_string()
    } else {
        format!("{code}: {message}")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::StorageAuth;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param, query_param_is_missing},
    };

    fn sas_store(server: &MockServer) -> AzureBlobStore {
        AzureBlobStore::new(StorageCredentials {
            account: "devaccount".to_string(),
            blob_endpoint: Url::parse(&server.uri()).unwrap(),
            auth: StorageAuth::Sas("sv=2022-11-02&sig=testsig".to_string()),
        })
    }

    const CONTAINERS_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
        <EnumerationResults ServiceEndpoint="https://devaccount.blob.core.windows.net/">
          <Containers>
            <Container><Name>documents</Name><Properties/></Container>
            <Container><Name>translated</Name><Properties/></Container>
          </Containers>
          <NextMarker />
        </EnumerationResults>"#;

    #[test]
    fn test_parse_container_list() {
        let (names, marker) = parse_container_list(CONTAINERS_XML).unwrap();
        assert_eq!(names, vec!["documents", "translated"]);
        assert_eq!(marker, None);
    }

    #[test]
    fn test_parse_blob_list_with_marker() {
        let xml = r#"<EnumerationResults ContainerName="documents">
              <Blobs>
                <Blob><Name>2024/report.pdf</Name><Properties><Content-Length>2048</Content-Length></Properties></Blob>
                <Blob><Name>notes.txt</Name><Properties><Content-Length>12</Content-Length></Properties></Blob>
              </Blobs>
              <NextMarker>page-2</NextMarker>
            </EnumerationResults>"#;

        let (objects, marker) = parse_blob_list(xml).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].key, "2024/report.pdf");
        assert_eq!(objects[0].file_name(), "report.pdf");
        assert_eq!(objects[0].size, 2048);
        assert_eq!(marker.as_deref(), Some("page-2"));
    }

    #[test]
    fn test_parse_error_message() {
        let xml = "<?xml version=\"1.0\"?><Error><Code>AuthenticationFailed</Code>\
                   <Message>Server failed to authenticate the request.\nRequestId:1</Message></Error>";
        assert_eq!(
            parse_error_message(xml).as_deref(),
            Some("AuthenticationFailed: Server failed to authenticate the request.")
        );
    }

    #[test]
    fn test_object_url_encodes_segments_without_sas() {
        let store = AzureBlobStore::new(StorageCredentials {
            account: "acct".to_string(),
            blob_endpoint: Url::parse("https://acct.blob.core.windows.net").unwrap(),
            auth: StorageAuth::Sas("sig=secret".to_string()),
        });
        let url = store.object_url(&StorageLocation::new("docs", "2024/My Report.pdf"));
        assert_eq!(
            url,
            "https://acct.blob.core.windows.net/docs/2024/My%20Report.pdf"
        );
    }

    #[tokio::test]
    async fn test_list_containers_appends_sas() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("comp", "list"))
            .and(query_param("sig", "testsig"))
            .and(header("x-ms-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_string(CONTAINERS_XML))
            .mount(&server)
            .await;

        let containers = sas_store(&server).list_containers().await.unwrap();
        assert_eq!(containers, vec!["documents", "translated"]);
    }

    #[tokio::test]
    async fn test_list_objects_follows_next_marker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents"))
            .and(query_param("comp", "list"))
            .and(query_param_is_missing("marker"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<EnumerationResults><Blobs><Blob><Name>a.pdf</Name></Blob></Blobs>\
                 <NextMarker>m2</NextMarker></EnumerationResults>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/documents"))
            .and(query_param("marker", "m2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<EnumerationResults><Blobs><Blob><Name>b.docx</Name></Blob></Blobs>\
                 <NextMarker/></EnumerationResults>",
            ))
            .mount(&server)
            .await;

        let objects = sas_store(&server).list_objects("documents").await.unwrap();
        let keys: Vec<_> = objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a.pdf", "b.docx"]);
    }

    #[tokio::test]
    async fn test_get_missing_blob_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/missing.pdf"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                "<Error><Code>BlobNotFound</Code><Message>The specified blob does not exist.</Message></Error>",
            ))
            .mount(&server)
            .await;

        let err = sas_store(&server)
            .get(&StorageLocation::new("documents", "missing.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(ref t) if t == "documents/missing.pdf"));
    }

    #[tokio::test]
    async fn test_get_returns_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/folder/report.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .mount(&server)
            .await;

        let data = sas_store(&server)
            .get(&StorageLocation::new("documents", "folder/report.pdf"))
            .await
            .unwrap();
        assert_eq!(&data[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_put_sends_block_blob_headers() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/documents/report_es.pdf"))
            .and(header("x-ms-blob-type", "BlockBlob"))
            .and(header("content-type", "application/pdf"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let url = sas_store(&server)
            .put(
                &StorageLocation::new("documents", "report_es.pdf"),
                Bytes::from_static(b"translated"),
                true,
            )
            .await
            .unwrap();
        assert_eq!(url, format!("{}/documents/report_es.pdf", server.uri()));
    }

    #[tokio::test]
    async fn test_put_without_overwrite_reports_existing() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(header("if-none-match", "*"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let err = sas_store(&server)
            .put(
                &StorageLocation::new("documents", "report_es.pdf"),
                Bytes::from_static(b"x"),
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_exists_and_container_exists() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/documents/report.pdf"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/documents"))
            .and(query_param("restype", "container"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/input"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = sas_store(&server);
        assert!(
            store
                .exists(&StorageLocation::new("documents", "report.pdf"))
                .await
                .unwrap()
        );
        assert!(
            !store
                .exists(&StorageLocation::new("documents", "other.pdf"))
                .await
                .unwrap()
        );
        assert!(store.container_exists("documents").await.unwrap());
        assert!(!store.container_exists("input").await.unwrap());
    }

    #[tokio::test]
    async fn test_forbidden_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                "<Error><Code>AuthenticationFailed</Code><Message>Signature mismatch</Message></Error>",
            ))
            .mount(&server)
            .await;

        let err = sas_store(&server).list_containers().await.unwrap_err();
        assert!(
            matches!(err, StorageError::Unavailable(ref m) if m.contains("Signature mismatch"))
        );
    }
}
