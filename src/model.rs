//! Data types flowing through the packet pipeline.
//!
//! Input types ([`SelectableDocument`], [`ProjectDetails`]) are tolerant:
//! every project field is optional. Output types ([`ProjectData`],
//! [`PacketRequest`]) are canonical: every field is populated, so the wire
//! payload never carries an absent value.
//!
//! Field names on the wire are camelCase to match the rendering service.

use crate::error::PacketError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Documents ────────────────────────────────────────────────────────────

/// A document as known to the external registry. The pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Source location. A selected document without one cannot be fetched.
    #[serde(default)]
    pub url: Option<String>,
    /// Category tag (e.g. `tds`, `msds`, `warranty`).
    #[serde(rename = "type", default)]
    pub doc_type: String,
    /// Content-type hint recorded by the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Product category this document belongs to; used by in-memory directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
}

/// A registry document plus the caller's selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableDocument {
    pub document: Document,
    #[serde(default)]
    pub selected: bool,
    /// Relative position in the packet. Ties keep input order.
    #[serde(default)]
    pub order: i64,
}

impl SelectableDocument {
    pub fn new(document: Document, selected: bool, order: i64) -> Self {
        Self {
            document,
            selected,
            order,
        }
    }
}

/// A selected document whose bytes have been retrieved and base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedDocument {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Base64 of the document bytes, without any `data:` prefix. Never empty.
    pub file_data: String,
}

// ── Project metadata ─────────────────────────────────────────────────────

/// Product category of the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    #[default]
    StructuralFloor,
    Underlayment,
}

impl ProductType {
    /// Wire name, e.g. `structural-floor`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::StructuralFloor => "structural-floor",
            ProductType::Underlayment => "underlayment",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submission status flags as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusInput {
    pub for_review: Option<bool>,
    pub for_approval: Option<bool>,
    pub for_record: Option<bool>,
    pub for_information_only: Option<bool>,
}

/// Canonical submission status flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusFlags {
    pub for_review: bool,
    pub for_approval: bool,
    pub for_record: bool,
    pub for_information_only: bool,
}

/// Submittal-type checklist as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmittalTypeInput {
    pub tds: Option<bool>,
    pub three_part_specs: Option<bool>,
    pub test_report_icc_esr5194: Option<bool>,
    pub test_report_icc_esl1645: Option<bool>,
    pub fire_assembly: Option<bool>,
    pub fire_assembly01: Option<bool>,
    pub fire_assembly02: Option<bool>,
    pub fire_assembly03: Option<bool>,
    pub msds: Option<bool>,
    pub leed_guide: Option<bool>,
    pub installation_guide: Option<bool>,
    pub warranty: Option<bool>,
    pub samples: Option<bool>,
    pub other: Option<bool>,
    pub other_text: Option<String>,
}

/// Canonical submittal-type checklist: fourteen flags plus free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittalType {
    pub tds: bool,
    pub three_part_specs: bool,
    pub test_report_icc_esr5194: bool,
    pub test_report_icc_esl1645: bool,
    pub fire_assembly: bool,
    pub fire_assembly01: bool,
    pub fire_assembly02: bool,
    pub fire_assembly03: bool,
    pub msds: bool,
    pub leed_guide: bool,
    pub installation_guide: bool,
    pub warranty: bool,
    pub samples: bool,
    pub other: bool,
    pub other_text: String,
}

/// Partial project metadata as entered by the user.
///
/// Canonicalised by [`crate::pipeline::payload::canonicalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDetails {
    pub project_name: Option<String>,
    pub submitted_to: Option<String>,
    pub prepared_by: Option<String>,
    pub date: Option<String>,
    pub project_number: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub product: Option<String>,
    pub product_type: Option<ProductType>,
    pub status: Option<StatusInput>,
    pub submittal_type: Option<SubmittalTypeInput>,
}

/// Fully-populated project metadata as sent to the rendering service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub project_name: String,
    pub submitted_to: String,
    pub prepared_by: String,
    pub date: String,
    pub project_number: String,
    pub email_address: String,
    pub phone_number: String,
    pub product: String,
    pub product_type: ProductType,
    pub status: StatusFlags,
    pub submittal_type: SubmittalType,
}

// ── Wire payload and result ──────────────────────────────────────────────

/// The canonical body POSTed to `<endpoint>/generate-packet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketRequest {
    pub project_data: ProjectData,
    /// Selected documents in ascending `order`.
    pub documents: Vec<FetchedDocument>,
    pub selected_document_names: Vec<String>,
    /// Informational manifest of every document in the product category.
    pub all_available_documents: Vec<String>,
}

/// The composed PDF returned by the rendering service.
///
/// Opaque to this crate; guaranteed non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct PacketArtifact {
    bytes: Vec<u8>,
}

impl PacketArtifact {
    /// Wrap rendered bytes, rejecting a zero-length body.
    pub fn new(bytes: Vec<u8>) -> Result<Self, PacketError> {
        if bytes.is_empty() {
            return Err(PacketError::EmptyArtifact);
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the body starts with the `%PDF` magic. Informational only.
    pub fn looks_like_pdf(&self) -> bool {
        self.bytes.starts_with(b"%PDF")
    }
}

impl fmt::Debug for PacketArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketArtifact")
            .field("len", &self.bytes.len())
            .field("looks_like_pdf", &self.looks_like_pdf())
            .finish()
    }
}

// ── CLI input ────────────────────────────────────────────────────────────

/// Everything needed to request a packet, as a single JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketManifest {
    #[serde(default)]
    pub project: ProjectDetails,
    #[serde(default)]
    pub documents: Vec<SelectableDocument>,
    /// Optional in-memory category directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<Vec<Document>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_artifact_rejected() {
        let err = PacketArtifact::new(Vec::new()).unwrap_err();
        assert!(matches!(err, PacketError::EmptyArtifact));
    }

    #[test]
    fn artifact_pdf_magic() {
        let a = PacketArtifact::new(b"%PDF-1.7\n...".to_vec()).unwrap();
        assert!(a.looks_like_pdf());
        assert_eq!(a.len(), 12);
        let b = PacketArtifact::new(b"<html>".to_vec()).unwrap();
        assert!(!b.looks_like_pdf());
    }

    #[test]
    fn product_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProductType::StructuralFloor).unwrap(),
            "\"structural-floor\""
        );
        let p: ProductType = serde_json::from_str("\"underlayment\"").unwrap();
        assert_eq!(p, ProductType::Underlayment);
        assert_eq!(ProductType::default(), ProductType::StructuralFloor);
    }

    #[test]
    fn submittal_type_field_names() {
        let v = serde_json::to_value(SubmittalType::default()).unwrap();
        let obj = v.as_object().unwrap();
        for key in [
            "tds",
            "threePartSpecs",
            "testReportIccEsr5194",
            "testReportIccEsl1645",
            "fireAssembly",
            "fireAssembly01",
            "fireAssembly02",
            "fireAssembly03",
            "msds",
            "leedGuide",
            "installationGuide",
            "warranty",
            "samples",
            "other",
            "otherText",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj.len(), 15);
    }

    #[test]
    fn manifest_parses_minimal_json() {
        let json = r#"{
            "project": { "projectName": "Tower B", "status": { "forReview": true } },
            "documents": [
                { "document": { "id": "1", "name": "TDS", "url": "https://x/tds.pdf", "type": "tds" },
                  "selected": true, "order": 2 }
            ]
        }"#;
        let m: PacketManifest = serde_json::from_str(json).unwrap();
        assert_eq!(m.project.project_name.as_deref(), Some("Tower B"));
        assert_eq!(m.project.status.unwrap().for_review, Some(true));
        assert_eq!(m.documents[0].order, 2);
        assert_eq!(m.documents[0].document.doc_type, "tds");
        assert!(m.directory.is_none());
    }

    #[test]
    fn fetched_document_wire_shape() {
        let d = FetchedDocument {
            id: "1".into(),
            name: "TDS".into(),
            url: "https://x/tds.pdf".into(),
            doc_type: "tds".into(),
            file_data: "JVBERg==".into(),
        };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["fileData"], "JVBERg==");
        assert_eq!(v["type"], "tds");
    }
}
