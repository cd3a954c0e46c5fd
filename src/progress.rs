//! Progress-callback trait for packet generation events.
//!
//! Inject an [`Arc<dyn PacketProgressCallback>`] via
//! [`crate::config::PacketConfigBuilder::progress_callback`] to receive
//! events as the pipeline fetches each document and hands the packet to the
//! rendering service.
//!
//! # Example
//!
//! ```rust
//! use submittal_packet::{PacketConfig, PacketProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     fetched: AtomicUsize,
//! }
//!
//! impl PacketProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, name: &str, index: usize, total: usize, bytes: usize) {
//!         self.fetched.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("[{}/{}] {} ({} bytes)", index + 1, total, name, bytes);
//!     }
//! }
//!
//! let config = PacketConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { fetched: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it assembles a packet.
///
/// Document fetches run concurrently, so `on_document_*` events arrive in
/// completion order, not selection order. All methods default to no-ops.
pub trait PacketProgressCallback: Send + Sync {
    /// Called once the selection is known, before any fetch.
    ///
    /// # Arguments
    /// * `total_documents` — number of selected documents
    fn on_packet_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document's source is requested.
    ///
    /// # Arguments
    /// * `name`  — document display name
    /// * `index` — 0-based position in the sorted selection
    /// * `total` — number of selected documents
    fn on_document_start(&self, name: &str, index: usize, total: usize) {
        let _ = (name, index, total);
    }

    /// Called when a document has been fetched and encoded.
    ///
    /// # Arguments
    /// * `bytes` — size of the raw document body
    fn on_document_complete(&self, name: &str, index: usize, total: usize, bytes: usize) {
        let _ = (name, index, total, bytes);
    }

    /// Called when a document fails; the packet will fail with it.
    fn on_document_error(&self, name: &str, index: usize, total: usize, error: &str) {
        let _ = (name, index, total, error);
    }

    /// Called just before the request is POSTed to the rendering service.
    fn on_render_start(&self, document_count: usize) {
        let _ = document_count;
    }

    /// Called with the size of the rendered packet.
    fn on_packet_complete(&self, artifact_bytes: usize) {
        let _ = artifact_bytes;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PacketProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PacketConfig`].
pub type ProgressCallback = Arc<dyn PacketProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        artifact: AtomicUsize,
    }

    impl PacketProgressCallback for TrackingCallback {
        fn on_packet_start(&self, total_documents: usize) {
            self.total.store(total_documents, Ordering::SeqCst);
        }

        fn on_document_start(&self, _name: &str, _index: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _name: &str, _index: usize, _total: usize, _bytes: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_error(&self, _name: &str, _index: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_packet_complete(&self, artifact_bytes: usize) {
            self.artifact.store(artifact_bytes, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_packet_start(2);
        cb.on_document_start("TDS", 0, 2);
        cb.on_document_complete("TDS", 0, 2, 1024);
        cb.on_document_error("MSDS", 1, 2, "HTTP 404");
        cb.on_render_start(2);
        cb.on_packet_complete(4096);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_packet_start(3);
        tracker.on_document_start("A", 0, 3);
        tracker.on_document_complete("A", 0, 3, 10);
        tracker.on_document_start("B", 1, 3);
        tracker.on_document_error("B", 1, 3, "HTTP 500");
        tracker.on_packet_complete(2048);

        assert_eq!(tracker.total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.artifact.load(Ordering::SeqCst), 2048);
    }
}
