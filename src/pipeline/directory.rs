//! Category directory: which documents exist for a product type.
//!
//! The result only annotates the request (`allAvailableDocuments`) so the
//! rendering side can print a manifest. It is never used for validation, and
//! any failure degrades to an empty list via [`available_document_names`].

use crate::error::DirectoryError;
use crate::model::{Document, ProductType};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Lookup of registry documents by product category.
#[async_trait]
pub trait DocumentDirectory: Send + Sync {
    async fn documents_by_product_type(
        &self,
        product_type: ProductType,
    ) -> Result<Vec<Document>, DirectoryError>;
}

/// An in-memory directory.
///
/// Documents tagged with a `productType` are listed only under that type;
/// untagged documents are listed under every type.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    documents: Vec<Document>,
}

impl StaticDirectory {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl DocumentDirectory for StaticDirectory {
    async fn documents_by_product_type(
        &self,
        product_type: ProductType,
    ) -> Result<Vec<Document>, DirectoryError> {
        Ok(self
            .documents
            .iter()
            .filter(|d| d.product_type.is_none_or(|t| t == product_type))
            .cloned()
            .collect())
    }
}

/// A registry reachable over HTTP.
///
/// Issues `GET <base>/documents?productType=<type>` and expects a JSON array
/// of documents.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectory {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DocumentDirectory for HttpDirectory {
    async fn documents_by_product_type(
        &self,
        product_type: ProductType,
    ) -> Result<Vec<Document>, DirectoryError> {
        let url = format!("{}/documents", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("productType", product_type.as_str())])
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable {
                reason: format!("HTTP {}", response.status()),
            });
        }

        response
            .json::<Vec<Document>>()
            .await
            .map_err(|e| DirectoryError::InvalidResponse {
                reason: e.to_string(),
            })
    }
}

/// Names of every document in `product_type`, or `[]` on any failure.
///
/// Blank names are dropped. `None` for `directory` means no directory is
/// configured, which is not an error.
pub async fn available_document_names(
    directory: Option<&dyn DocumentDirectory>,
    product_type: ProductType,
    timeout_secs: u64,
) -> Vec<String> {
    let Some(directory) = directory else {
        debug!("No document directory configured");
        return Vec::new();
    };

    let lookup = directory.documents_by_product_type(product_type);
    let result = match tokio::time::timeout(Duration::from_secs(timeout_secs), lookup).await {
        Ok(result) => result,
        Err(_) => Err(DirectoryError::Timeout { secs: timeout_secs }),
    };

    match result {
        Ok(documents) => {
            let names: Vec<String> = documents
                .into_iter()
                .map(|d| d.name)
                .filter(|n| !n.trim().is_empty())
                .collect();
            debug!("Directory lists {} '{}' document(s)", names.len(), product_type);
            names
        }
        Err(e) => {
            warn!(
                "Directory lookup for '{}' failed, continuing without it: {}",
                product_type, e
            );
            Vec::new()
        }
    }
}
