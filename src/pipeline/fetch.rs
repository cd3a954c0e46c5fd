//! Document retrieval: fetch every selected document and encode it.
//!
//! All fetches are issued at once and joined with `try_join_all`, which
//! keeps results in selection order regardless of completion order and
//! returns on the first failure, dropping the fetches still in flight.
//! There is no retry at this layer; the caller retries the whole packet.

use crate::config::PacketConfig;
use crate::error::{DocumentFailure, PacketError};
use crate::model::{Document, FetchedDocument};
use crate::pipeline::encode::encode_document;
use crate::pipeline::select::display_name;
use crate::progress::ProgressCallback;
use futures::future::try_join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

static STORAGE_FAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(bucket|storage|access ?denied)\b").unwrap());

/// Retrieves and encodes the documents selected for a packet.
#[derive(Clone)]
pub struct DocumentFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    expected_content_type: Option<String>,
    progress: Option<ProgressCallback>,
}

impl DocumentFetcher {
    pub fn new(client: reqwest::Client, config: &PacketConfig) -> Self {
        Self {
            client,
            timeout_secs: config.fetch_timeout_secs,
            expected_content_type: config.expected_content_type.clone(),
            progress: config.progress_callback.clone(),
        }
    }

    /// Fetch and encode every document in `selection`, preserving its order.
    ///
    /// # Errors
    /// * [`PacketError::NoDocumentsSelected`] for an empty selection, before
    ///   any request is made.
    /// * [`PacketError::StorageConfiguration`] naming the document when the
    ///   source answers 401/403, or any 4xx whose body mentions the bucket,
    ///   storage or access denial. These point at storage setup rather than
    ///   the document, so they are not reported as `DocumentProcessing`.
    /// * [`PacketError::DocumentProcessing`] naming the first document that
    ///   failed for any other reason: missing URL, other non-success status,
    ///   transport failure, timeout or empty body.
    pub async fn fetch_all(
        &self,
        selection: &[&Document],
    ) -> Result<Vec<FetchedDocument>, PacketError> {
        if selection.is_empty() {
            return Err(PacketError::NoDocumentsSelected);
        }

        let total = selection.len();
        info!("Fetching {} document(s)", total);

        let fetches = selection
            .iter()
            .enumerate()
            .map(|(index, doc)| self.fetch_one(doc, index, total));
        try_join_all(fetches).await
    }

    async fn fetch_one(
        &self,
        doc: &Document,
        index: usize,
        total: usize,
    ) -> Result<FetchedDocument, PacketError> {
        let name = display_name(doc);
        if let Some(ref cb) = self.progress {
            cb.on_document_start(name, index, total);
        }

        let result = self.retrieve(doc, name).await;

        match &result {
            Ok((_, size)) => {
                if let Some(ref cb) = self.progress {
                    cb.on_document_complete(name, index, total, *size);
                }
            }
            Err(e) => {
                warn!("Document '{}' failed: {}", name, e);
                if let Some(ref cb) = self.progress {
                    cb.on_document_error(name, index, total, &e.to_string());
                }
            }
        }

        result.map(|(fetched, _)| fetched)
    }

    async fn retrieve(
        &self,
        doc: &Document,
        name: &str,
    ) -> Result<(FetchedDocument, usize), PacketError> {
        let fail = |source: DocumentFailure| PacketError::DocumentProcessing {
            document: name.to_string(),
            source,
        };

        let url = match doc.url.as_deref().map(str::trim) {
            Some(u) if !u.is_empty() => u,
            _ => return Err(fail(DocumentFailure::MissingUrl)),
        };

        debug!("GET {} for '{}'", url, name);
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| fail(self.transport_failure(url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_storage_fault(status, &body) {
                return Err(PacketError::StorageConfiguration {
                    document: name.to_string(),
                    status: status.as_u16(),
                    detail: summarize_body(&body, status),
                });
            }
            return Err(fail(DocumentFailure::SourceFetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}"),
            }));
        }

        self.check_content_type(&response, doc, name);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fail(self.transport_failure(url, e)))?;

        let file_data = encode_document(&bytes).map_err(fail)?;
        debug!("'{}': {} bytes fetched", name, bytes.len());

        Ok((
            FetchedDocument {
                id: doc.id.clone(),
                name: name.to_string(),
                url: url.to_string(),
                doc_type: doc.doc_type.clone(),
                file_data,
            },
            bytes.len(),
        ))
    }

    fn transport_failure(&self, url: &str, e: reqwest::Error) -> DocumentFailure {
        if e.is_timeout() {
            DocumentFailure::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            DocumentFailure::SourceFetch {
                url: url.to_string(),
                status: None,
                reason: e.to_string(),
            }
        }
    }

    /// Warn, never fail, when the source serves an unexpected content type.
    fn check_content_type(&self, response: &reqwest::Response, doc: &Document, name: &str) {
        let Some(ref expected) = self.expected_content_type else {
            return;
        };
        let expected = doc.content_type.as_deref().unwrap_or(expected.as_str());
        match response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            Some(actual) if content_type_matches(actual, expected) => {}
            Some(actual) => warn!(
                "Document '{}' served as '{}', expected '{}'",
                name, actual, expected
            ),
            None => debug!("Document '{}' has no Content-Type header", name),
        }
    }
}

/// Compare media types, ignoring parameters and case.
fn content_type_matches(actual: &str, expected: &str) -> bool {
    let essence = actual.split(';').next().unwrap_or("").trim();
    essence.eq_ignore_ascii_case(expected.trim())
}

/// Whether a failed source fetch points at storage misconfiguration.
fn is_storage_fault(status: StatusCode, body: &str) -> bool {
    status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || (status.is_client_error() && STORAGE_FAULT.is_match(body))
}

fn summarize_body(body: &str, status: StatusCode) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status.canonical_reason().unwrap_or("no detail").to_string();
    }
    match body.char_indices().nth(200) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_ignores_parameters() {
        assert!(content_type_matches("application/pdf", "application/pdf"));
        assert!(content_type_matches("Application/PDF; charset=binary", "application/pdf"));
        assert!(!content_type_matches("text/html", "application/pdf"));
    }

    #[test]
    fn storage_fault_detection() {
        assert!(is_storage_fault(StatusCode::FORBIDDEN, ""));
        assert!(is_storage_fault(StatusCode::UNAUTHORIZED, "whatever"));
        assert!(is_storage_fault(
            StatusCode::NOT_FOUND,
            r#"{"error":"Bucket not found"}"#
        ));
        assert!(is_storage_fault(StatusCode::BAD_REQUEST, "AccessDenied: Access Denied"));
        assert!(!is_storage_fault(StatusCode::NOT_FOUND, "Not Found"));
        assert!(!is_storage_fault(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage backend exploded"
        ));
    }

    #[test]
    fn summarize_truncates_long_bodies() {
        let long = "x".repeat(500);
        let s = summarize_body(&long, StatusCode::FORBIDDEN);
        assert!(s.ends_with('…'));
        assert_eq!(s.chars().count(), 201);
        assert_eq!(summarize_body("", StatusCode::FORBIDDEN), "Forbidden");
    }

    #[tokio::test]
    async fn empty_selection_makes_no_request() {
        let fetcher = DocumentFetcher::new(reqwest::Client::new(), &PacketConfig::default());
        let err = fetcher.fetch_all(&[]).await.unwrap_err();
        assert!(matches!(err, PacketError::NoDocumentsSelected));
    }

    #[tokio::test]
    async fn missing_url_names_document() {
        let fetcher = DocumentFetcher::new(reqwest::Client::new(), &PacketConfig::default());
        let doc = Document {
            id: "7".into(),
            name: "Warranty".into(),
            url: None,
            doc_type: "warranty".into(),
            content_type: None,
            product_type: None,
        };
        let err = fetcher.fetch_all(&[&doc]).await.unwrap_err();
        match err {
            PacketError::DocumentProcessing { document, source } => {
                assert_eq!(document, "Warranty");
                assert_eq!(source, DocumentFailure::MissingUrl);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
