//! Packet generation entry points.
//!
//! [`PacketService`] owns its configuration and HTTP client; construct one
//! per rendering endpoint and share it. Nothing here reads process-wide
//! state after construction.
//!
//! ```text
//! selection ─▶ select ─┬─▶ fetch (fan-out, fail-fast) ─┐
//!                      └─▶ directory (best-effort) ────┴─▶ payload ─▶ render
//! ```

use crate::config::PacketConfig;
use crate::error::{PacketError, Stage};
use crate::model::{PacketArtifact, PacketRequest, ProjectDetails, SelectableDocument};
use crate::pipeline::directory::{available_document_names, DocumentDirectory};
use crate::pipeline::fetch::DocumentFetcher;
use crate::pipeline::payload::{build_request, canonicalize};
use crate::pipeline::render::PacketClient;
use crate::pipeline::select::select_documents;
use chrono::{Local, NaiveDate};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Assembles submittal packets against one rendering service.
///
/// # Example
/// ```rust,no_run
/// use submittal_packet::{PacketConfig, PacketService, ProjectDetails};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = PacketService::new(PacketConfig::from_env()?)?;
/// let selection = Vec::new(); // Vec<SelectableDocument> from the registry
/// let packet = service
///     .generate_packet(&selection, ProjectDetails::default())
///     .await?;
/// std::fs::write("packet.pdf", packet.as_bytes())?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PacketService {
    config: PacketConfig,
    http: reqwest::Client,
    fetcher: DocumentFetcher,
    client: PacketClient,
    directory: Option<Arc<dyn DocumentDirectory>>,
}

impl PacketService {
    /// Build a service with its own HTTP client.
    pub fn new(config: PacketConfig) -> Result<Self, PacketError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PacketError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(config, http))
    }

    /// Build a service around an existing `reqwest::Client`.
    pub fn with_http_client(config: PacketConfig, http: reqwest::Client) -> Self {
        Self {
            fetcher: DocumentFetcher::new(http.clone(), &config),
            client: PacketClient::new(http.clone(), &config),
            http,
            directory: None,
            config,
        }
    }

    /// Attach a category directory used to fill `allAvailableDocuments`.
    pub fn with_directory(mut self, directory: Arc<dyn DocumentDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn config(&self) -> &PacketConfig {
        &self.config
    }

    /// The HTTP client every stage uses, carrying the configured user agent.
    /// Share it with collaborators such as [`crate::HttpDirectory`].
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Run every stage except the render POST and return the request that
    /// would be sent.
    pub async fn build_request(
        &self,
        documents: &[SelectableDocument],
        project: ProjectDetails,
    ) -> Result<PacketRequest, PacketError> {
        let tracker = StageTracker::default();
        self.build_request_on(documents, project, Local::now().date_naive(), &tracker)
            .await
    }

    /// Generate a packet for the selected `documents`.
    ///
    /// # Errors
    /// * [`PacketError::NoDocumentsSelected`] — nothing selected; no network
    ///   call is made.
    /// * [`PacketError::DocumentProcessing`] / [`PacketError::StorageConfiguration`]
    ///   — a selected document could not be fetched; nothing is sent to the
    ///   rendering service.
    /// * [`PacketError::RenderService`], [`PacketError::EmptyArtifact`],
    ///   [`PacketError::Connectivity`], [`PacketError::Timeout`] — rendering
    ///   failed.
    pub async fn generate_packet(
        &self,
        documents: &[SelectableDocument],
        project: ProjectDetails,
    ) -> Result<PacketArtifact, PacketError> {
        self.run(documents, project, &StageTracker::default()).await
    }

    /// Like [`Self::generate_packet`], abandoning in-flight work when
    /// `cancel` fires.
    pub async fn generate_packet_with_cancel(
        &self,
        documents: &[SelectableDocument],
        project: ProjectDetails,
        cancel: &CancellationToken,
    ) -> Result<PacketArtifact, PacketError> {
        let tracker = StageTracker::default();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let stage = tracker.current();
                info!("Packet generation cancelled during {}", stage);
                Err(PacketError::Cancelled { stage })
            }
            result = self.run(documents, project, &tracker) => result,
        }
    }

    /// Generate a packet and write it to `output_path`.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn generate_packet_to_file(
        &self,
        documents: &[SelectableDocument],
        project: ProjectDetails,
        output_path: impl AsRef<Path>,
    ) -> Result<PacketArtifact, PacketError> {
        let artifact = self.generate_packet(documents, project).await?;
        let path = output_path.as_ref();
        let write_failed = |source| PacketError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(write_failed)?;
        }

        let tmp_path = path.with_extension("pdf.tmp");
        tokio::fs::write(&tmp_path, artifact.as_bytes())
            .await
            .map_err(write_failed)?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(write_failed)?;

        Ok(artifact)
    }

    /// Synchronous wrapper around [`Self::generate_packet`].
    ///
    /// Creates a temporary tokio runtime internally; do not call from
    /// inside an async context.
    pub fn generate_packet_blocking(
        &self,
        documents: &[SelectableDocument],
        project: ProjectDetails,
    ) -> Result<PacketArtifact, PacketError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| PacketError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.generate_packet(documents, project))
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    async fn run(
        &self,
        documents: &[SelectableDocument],
        project: ProjectDetails,
        tracker: &StageTracker,
    ) -> Result<PacketArtifact, PacketError> {
        let total_start = Instant::now();
        let request = self
            .build_request_on(documents, project, Local::now().date_naive(), tracker)
            .await?;

        tracker.enter(Stage::Render);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_render_start(request.documents.len());
        }
        let artifact = self.client.generate(&request).await?;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_packet_complete(artifact.len());
        }
        info!(
            "Packet complete: {} documents, {} bytes, {}ms total",
            request.documents.len(),
            artifact.len(),
            total_start.elapsed().as_millis()
        );
        Ok(artifact)
    }

    async fn build_request_on(
        &self,
        documents: &[SelectableDocument],
        project: ProjectDetails,
        today: NaiveDate,
        tracker: &StageTracker,
    ) -> Result<PacketRequest, PacketError> {
        // ── Step 1: Selection ────────────────────────────────────────────
        let selection = select_documents(documents);
        if selection.is_empty() {
            return Err(PacketError::NoDocumentsSelected);
        }
        debug!(
            "{} of {} documents selected",
            selection.len(),
            documents.len()
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_packet_start(selection.len());
        }

        // ── Step 2: Canonical project data ───────────────────────────────
        let project_data = canonicalize(project, today);

        // ── Step 3: Fetch documents ∥ directory lookup ──────────────────
        // The first fetch failure drops the lookup still in flight.
        tracker.enter(Stage::Fetch);
        let (fetched, available) = tokio::try_join!(
            self.fetcher.fetch_all(&selection),
            async {
                Ok::<_, PacketError>(
                    available_document_names(
                        self.directory.as_deref(),
                        project_data.product_type,
                        self.config.directory_timeout_secs,
                    )
                    .await,
                )
            },
        )?;

        // ── Step 4: Payload ──────────────────────────────────────────────
        Ok(build_request(project_data, &selection, fetched, available))
    }
}

/// Last stage the pipeline entered, for cancellation reporting.
#[derive(Default)]
struct StageTracker(AtomicU8);

impl StageTracker {
    fn enter(&self, stage: Stage) {
        self.0.store(stage as u8, Ordering::SeqCst);
    }

    fn current(&self) -> Stage {
        match self.0.load(Ordering::SeqCst) {
            x if x == Stage::Render as u8 => Stage::Render,
            _ => Stage::Fetch,
        }
    }
}
