//! Payload construction: partial project metadata → canonical request.
//!
//! ## Default table
//!
//! | Field | Default when absent or blank |
//! |-------|------------------------------|
//! | `projectName` | `"Untitled Project"` |
//! | `submittedTo`, `preparedBy`, `projectNumber`, `emailAddress`, `phoneNumber` | `"N/A"` |
//! | `date` | today, long form (`October 19, 2026`) |
//! | `product` | `"3/4-in (20mm)"` |
//! | `productType` | `structural-floor` |
//! | each `status` flag | `false` |
//! | each `submittalType` flag | `false` |
//! | `submittalType.otherText` | `""` |
//!
//! Blank strings count as absent.

use crate::model::{
    Document, FetchedDocument, PacketRequest, ProjectData, ProjectDetails, StatusFlags,
    StatusInput, SubmittalType, SubmittalTypeInput,
};
use crate::pipeline::select::display_name;
use chrono::NaiveDate;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";
pub const NOT_APPLICABLE: &str = "N/A";
pub const DEFAULT_PRODUCT: &str = "3/4-in (20mm)";

/// Render a date the way it appears on the cover sheet, e.g. `October 19, 2026`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn text_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Populate every project field, substituting the documented defaults.
pub fn canonicalize(details: ProjectDetails, today: NaiveDate) -> ProjectData {
    ProjectData {
        project_name: text_or(details.project_name, DEFAULT_PROJECT_NAME),
        submitted_to: text_or(details.submitted_to, NOT_APPLICABLE),
        prepared_by: text_or(details.prepared_by, NOT_APPLICABLE),
        date: text_or(details.date, &format_long_date(today)),
        project_number: text_or(details.project_number, NOT_APPLICABLE),
        email_address: text_or(details.email_address, NOT_APPLICABLE),
        phone_number: text_or(details.phone_number, NOT_APPLICABLE),
        product: text_or(details.product, DEFAULT_PRODUCT),
        product_type: details.product_type.unwrap_or_default(),
        status: canonical_status(details.status.unwrap_or_default()),
        submittal_type: canonical_submittal_type(details.submittal_type.unwrap_or_default()),
    }
}

fn canonical_status(s: StatusInput) -> StatusFlags {
    StatusFlags {
        for_review: s.for_review.unwrap_or(false),
        for_approval: s.for_approval.unwrap_or(false),
        for_record: s.for_record.unwrap_or(false),
        for_information_only: s.for_information_only.unwrap_or(false),
    }
}

fn canonical_submittal_type(s: SubmittalTypeInput) -> SubmittalType {
    SubmittalType {
        tds: s.tds.unwrap_or(false),
        three_part_specs: s.three_part_specs.unwrap_or(false),
        test_report_icc_esr5194: s.test_report_icc_esr5194.unwrap_or(false),
        test_report_icc_esl1645: s.test_report_icc_esl1645.unwrap_or(false),
        fire_assembly: s.fire_assembly.unwrap_or(false),
        fire_assembly01: s.fire_assembly01.unwrap_or(false),
        fire_assembly02: s.fire_assembly02.unwrap_or(false),
        fire_assembly03: s.fire_assembly03.unwrap_or(false),
        msds: s.msds.unwrap_or(false),
        leed_guide: s.leed_guide.unwrap_or(false),
        installation_guide: s.installation_guide.unwrap_or(false),
        warranty: s.warranty.unwrap_or(false),
        samples: s.samples.unwrap_or(false),
        other: s.other.unwrap_or(false),
        other_text: s.other_text.unwrap_or_default(),
    }
}

/// Assemble the wire payload.
///
/// `selection` must be the same filtered, sorted list the documents were
/// fetched from; its names become `selectedDocumentNames`.
pub fn build_request(
    project_data: ProjectData,
    selection: &[&Document],
    documents: Vec<FetchedDocument>,
    available: Vec<String>,
) -> PacketRequest {
    PacketRequest {
        project_data,
        documents,
        selected_document_names: selection
            .iter()
            .map(|d| display_name(d).to_string())
            .collect(),
        all_available_documents: available
            .into_iter()
            .filter(|n| !n.trim().is_empty())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductType;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn long_date_format() {
        assert_eq!(format_long_date(today()), "October 19, 2026");
        assert_eq!(
            format_long_date(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()),
            "March 4, 2025"
        );
    }

    #[test]
    fn empty_input_gets_every_default() {
        let data = canonicalize(ProjectDetails::default(), today());
        assert_eq!(data.project_name, "Untitled Project");
        assert_eq!(data.submitted_to, "N/A");
        assert_eq!(data.prepared_by, "N/A");
        assert_eq!(data.project_number, "N/A");
        assert_eq!(data.email_address, "N/A");
        assert_eq!(data.phone_number, "N/A");
        assert_eq!(data.date, "October 19, 2026");
        assert_eq!(data.product, "3/4-in (20mm)");
        assert_eq!(data.product_type, ProductType::StructuralFloor);
        assert_eq!(data.status, StatusFlags::default());
        assert_eq!(data.submittal_type, SubmittalType::default());
    }

    #[test]
    fn canonical_json_has_no_nulls() {
        let data = canonicalize(ProjectDetails::default(), today());
        let v = serde_json::to_value(&data).unwrap();
        fn walk(v: &serde_json::Value) {
            match v {
                serde_json::Value::Null => panic!("null in canonical payload"),
                serde_json::Value::Object(m) => m.values().for_each(walk),
                serde_json::Value::Array(a) => a.iter().for_each(walk),
                _ => {}
            }
        }
        walk(&v);
        assert_eq!(v["status"].as_object().unwrap().len(), 4);
        assert_eq!(v["submittalType"]["otherText"], "");
    }

    #[test]
    fn provided_values_kept_and_blanks_defaulted() {
        let details = ProjectDetails {
            project_name: Some("Harbor Point".into()),
            submitted_to: Some("   ".into()),
            date: Some("2026-01-02".into()),
            product_type: Some(ProductType::Underlayment),
            status: Some(StatusInput {
                for_approval: Some(true),
                ..Default::default()
            }),
            submittal_type: Some(SubmittalTypeInput {
                msds: Some(true),
                other: Some(true),
                other_text: Some("Acoustic test".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let data = canonicalize(details, today());
        assert_eq!(data.project_name, "Harbor Point");
        assert_eq!(data.submitted_to, "N/A");
        assert_eq!(data.date, "2026-01-02");
        assert_eq!(data.product_type, ProductType::Underlayment);
        assert!(data.status.for_approval);
        assert!(!data.status.for_review);
        assert!(data.submittal_type.msds);
        assert!(data.submittal_type.other);
        assert!(!data.submittal_type.tds);
        assert_eq!(data.submittal_type.other_text, "Acoustic test");
    }

    #[test]
    fn request_names_follow_selection() {
        let docs = [
            Document {
                id: "1".into(),
                name: "TDS".into(),
                url: None,
                doc_type: "tds".into(),
                content_type: None,
                product_type: None,
            },
            Document {
                id: "2".into(),
                name: String::new(),
                url: None,
                doc_type: "other".into(),
                content_type: None,
                product_type: None,
            },
        ];
        let selection: Vec<&Document> = docs.iter().collect();
        let req = build_request(
            canonicalize(ProjectDetails::default(), today()),
            &selection,
            Vec::new(),
            vec!["TDS".into(), String::new(), "MSDS".into()],
        );
        assert_eq!(req.selected_document_names, vec!["TDS", "Unnamed Document"]);
        assert_eq!(req.all_available_documents, vec!["TDS", "MSDS"]);
    }
}
