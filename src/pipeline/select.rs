//! Selection: reduce the caller's document list to what goes in the packet.

use crate::model::{Document, SelectableDocument};

/// Display name used when a selected document has none.
pub const UNNAMED_DOCUMENT: &str = "Unnamed Document";

/// Keep the entries with `selected == true`, sorted ascending by `order`.
///
/// The sort is stable, so equal `order` values keep their input order.
pub fn select_documents(entries: &[SelectableDocument]) -> Vec<&Document> {
    let mut selected: Vec<&SelectableDocument> = entries.iter().filter(|e| e.selected).collect();
    selected.sort_by_key(|e| e.order);
    selected.into_iter().map(|e| &e.document).collect()
}

/// Name of a document for display and diagnostics.
pub fn display_name(doc: &Document) -> &str {
    if doc.name.trim().is_empty() {
        UNNAMED_DOCUMENT
    } else {
        &doc.name
    }
}
