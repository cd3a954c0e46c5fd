//! Error types for the submittal-packet library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PacketError`] — **Fatal**: the packet cannot be produced at all
//!   (nothing selected, a document could not be fetched, the rendering
//!   service rejected the request). Returned as `Err(PacketError)` from the
//!   [`crate::service::PacketService`] entry points.
//!
//! * [`DirectoryError`] — **Non-fatal**: the category directory lookup
//!   failed. It is logged and degraded to an empty `allAvailableDocuments`
//!   list; it never reaches the caller.
//!
//! Classification for user-facing output is a match over the variant
//! ([`PacketError::category`]), never a substring search over a message.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage a timeout or cancellation happened in.
///
/// The directory lookup is best-effort and never fails the pipeline, so it
/// has no stage of its own; it runs inside [`Stage::Fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "document fetch",
            Stage::Render => "packet rendering",
        };
        f.write_str(name)
    }
}

/// All fatal errors returned by the submittal-packet library.
#[derive(Debug, Error)]
pub enum PacketError {
    // ── Selection errors ──────────────────────────────────────────────────
    /// The selection filtered down to nothing; no network call was made.
    #[error("No documents selected.\nSelect at least one document to include in the packet.")]
    NoDocumentsSelected,

    // ── Document errors ───────────────────────────────────────────────────
    /// A single selected document could not be fetched or encoded.
    #[error("Failed to process document '{document}': {source}")]
    DocumentProcessing {
        document: String,
        #[source]
        source: DocumentFailure,
    },

    /// Document storage refused access; almost always a bucket/policy
    /// misconfiguration rather than a problem with the document itself.
    #[error("Storage refused access to document '{document}' (HTTP {status}): {detail}")]
    StorageConfiguration {
        document: String,
        status: u16,
        detail: String,
    },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The rendering service answered with a non-2xx status.
    #[error("Rendering service error (HTTP {status} {status_text}): {message}")]
    RenderService {
        status: u16,
        status_text: String,
        message: String,
    },

    /// The rendering service answered 2xx with a zero-byte body.
    #[error("Rendering service returned an empty packet (0 bytes)")]
    EmptyArtifact,

    /// The rendering service could not be reached at all.
    #[error("Could not reach the rendering service at '{endpoint}': {reason}")]
    Connectivity { endpoint: String, reason: String },

    // ── Control errors ────────────────────────────────────────────────────
    /// A network call exceeded its configured timeout.
    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },

    /// The caller cancelled the pipeline.
    #[error("Packet generation cancelled during {stage}")]
    Cancelled { stage: Stage },

    // ── Delivery errors ───────────────────────────────────────────────────
    /// Neither the preview nor its fallback could display the packet.
    #[error("Could not present packet: {reason}")]
    Presentation { reason: String },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single document could not be turned into a `FetchedDocument`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentFailure {
    /// The registry entry has no source URL.
    #[error("document has no source URL")]
    MissingUrl,

    /// Retrieval failed at the transport level or with a non-success status.
    #[error("fetch of '{url}' failed: {reason}")]
    SourceFetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// Encoding produced no usable base64 payload.
    #[error("encoding failed: {reason}")]
    Encoding { reason: String },

    /// Retrieval exceeded the fetch timeout.
    #[error("fetch timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// A non-fatal failure of the category directory lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("directory lookup timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("directory returned an unreadable response: {reason}")]
    InvalidResponse { reason: String },
}

/// Coarse user-facing classification of a [`PacketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    NoDocuments,
    DocumentProcessing,
    StorageConfiguration,
    RenderService,
    EmptyArtifact,
    Connectivity,
    Timeout,
    Cancelled,
    Presentation,
    Unknown,
}

impl PacketError {
    /// Classify this error for user-facing reporting.
    pub fn category(&self) -> FailureCategory {
        match self {
            PacketError::NoDocumentsSelected => FailureCategory::NoDocuments,
            PacketError::DocumentProcessing {
                source: DocumentFailure::Timeout { .. },
                ..
            } => FailureCategory::Timeout,
            PacketError::DocumentProcessing { .. } => FailureCategory::DocumentProcessing,
            PacketError::StorageConfiguration { .. } => FailureCategory::StorageConfiguration,
            PacketError::RenderService { .. } => FailureCategory::RenderService,
            PacketError::EmptyArtifact => FailureCategory::EmptyArtifact,
            PacketError::Connectivity { .. } => FailureCategory::Connectivity,
            PacketError::Timeout { .. } => FailureCategory::Timeout,
            PacketError::Cancelled { .. } => FailureCategory::Cancelled,
            PacketError::Presentation { .. } | PacketError::OutputWriteFailed { .. } => {
                FailureCategory::Presentation
            }
            PacketError::InvalidConfig(_) | PacketError::Internal(_) => FailureCategory::Unknown,
        }
    }

    /// The name of the document this error concerns, if any.
    pub fn document(&self) -> Option<&str> {
        match self {
            PacketError::DocumentProcessing { document, .. }
            | PacketError::StorageConfiguration { document, .. } => Some(document),
            _ => None,
        }
    }

    /// Render an actionable message for the person who asked for the packet.
    pub fn user_message(&self) -> String {
        match self {
            PacketError::NoDocumentsSelected => {
                "Please select at least one document to include in the packet.".to_string()
            }
            PacketError::DocumentProcessing { document, source } => match source {
                DocumentFailure::Timeout { secs } => format!(
                    "Document \"{document}\" took longer than {secs}s to download. \
                     Try again, or deselect it."
                ),
                other => format!(
                    "Document \"{document}\" could not be processed ({other}). \
                     Check that the file still exists and try again."
                ),
            },
            PacketError::StorageConfiguration { document, .. } => format!(
                "Document storage denied access to \"{document}\". \
                 The storage bucket or its access policy is likely misconfigured; \
                 contact an administrator."
            ),
            PacketError::RenderService { status, message, .. } => {
                format!("The packet service rejected the request (HTTP {status}): {message}")
            }
            PacketError::EmptyArtifact => {
                "The packet service returned an empty PDF. Please try again.".to_string()
            }
            PacketError::Connectivity { .. } => {
                "Could not connect to the packet service. \
                 Check your network connection and that the service is running."
                    .to_string()
            }
            PacketError::Timeout { stage, secs } => {
                format!("The {stage} step did not finish within {secs}s. Please try again.")
            }
            PacketError::Cancelled { .. } => "Packet generation was cancelled.".to_string(),
            PacketError::Presentation { reason } => {
                format!("The packet was generated but could not be opened: {reason}")
            }
            PacketError::OutputWriteFailed { path, .. } => format!(
                "The packet was generated but could not be saved to {}.",
                path.display()
            ),
            PacketError::InvalidConfig(_) | PacketError::Internal(_) => {
                "Failed to generate the submittal packet. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_processing_names_document() {
        let e = PacketError::DocumentProcessing {
            document: "Fire Assembly.pdf".into(),
            source: DocumentFailure::SourceFetch {
                url: "https://cdn.example.com/fa.pdf".into(),
                status: Some(404),
                reason: "HTTP 404 Not Found".into(),
            },
        };
        assert!(e.to_string().contains("Fire Assembly.pdf"));
        assert!(e.to_string().contains("404"));
        assert_eq!(e.category(), FailureCategory::DocumentProcessing);
        assert_eq!(e.document(), Some("Fire Assembly.pdf"));
    }

    #[test]
    fn fetch_timeout_classified_as_timeout() {
        let e = PacketError::DocumentProcessing {
            document: "TDS".into(),
            source: DocumentFailure::Timeout { secs: 60 },
        };
        assert_eq!(e.category(), FailureCategory::Timeout);
        assert!(e.user_message().contains("60s"));
    }

    #[test]
    fn render_service_message_surfaces() {
        let e = PacketError::RenderService {
            status: 500,
            status_text: "Internal Server Error".into(),
            message: "render failed".into(),
        };
        assert!(e.to_string().contains("render failed"));
        assert!(e.user_message().contains("render failed"));
        assert_eq!(e.category(), FailureCategory::RenderService);
    }

    #[test]
    fn storage_configuration_is_actionable() {
        let e = PacketError::StorageConfiguration {
            document: "MSDS".into(),
            status: 403,
            detail: "Access Denied".into(),
        };
        assert_eq!(e.category(), FailureCategory::StorageConfiguration);
        assert!(e.user_message().contains("misconfigured"));
    }

    #[test]
    fn internal_falls_back_to_generic_message() {
        let e = PacketError::Internal("boom".into());
        assert_eq!(e.category(), FailureCategory::Unknown);
        assert_eq!(
            e.user_message(),
            "Failed to generate the submittal packet. Please try again."
        );
    }

    #[test]
    fn timeout_display_names_stage() {
        let e = PacketError::Timeout {
            stage: Stage::Render,
            secs: 120,
        };
        assert_eq!(e.to_string(), "packet rendering timed out after 120s");
    }
}
