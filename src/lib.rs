//! # submittal-packet
//!
//! Assemble a multi-document submittal packet: fetch the documents a user
//! selected, normalise the project metadata, and hand both to a remote
//! rendering service that composes the final PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! selection
//!  │
//!  ├─ 1. Select     filter to selected, stable-sort by order
//!  ├─ 2. Fetch      concurrent GET of every document (fail-fast)
//!  │  └ Directory   best-effort listing of the product category
//!  ├─ 3. Payload    canonical project data + base64 documents
//!  ├─ 4. Render     POST <endpoint>/generate-packet → PDF bytes
//!  └─ 5. Present    preview or save the packet
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use submittal_packet::{PacketConfig, PacketService, PacketManifest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manifest: PacketManifest = serde_json::from_str(&std::fs::read_to_string("packet.json")?)?;
//!     // Endpoint from PACKET_SERVICE_URL, else http://localhost:3001
//!     let service = PacketService::new(PacketConfig::from_env()?)?;
//!     match service.generate_packet(&manifest.documents, manifest.project).await {
//!         Ok(packet) => std::fs::write("packet.pdf", packet.as_bytes())?,
//!         Err(e) => eprintln!("{}", e.user_message()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `packet` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod present;
pub mod progress;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PacketConfig, PacketConfigBuilder, DEFAULT_ENDPOINT, ENDPOINT_ENV_VAR};
pub use error::{DirectoryError, DocumentFailure, FailureCategory, PacketError, Stage};
pub use model::{
    Document, FetchedDocument, PacketArtifact, PacketManifest, PacketRequest, ProductType,
    ProjectData, ProjectDetails, SelectableDocument, StatusFlags, StatusInput, SubmittalType,
    SubmittalTypeInput,
};
pub use pipeline::directory::{DocumentDirectory, HttpDirectory, StaticDirectory};
pub use pipeline::payload::canonicalize;
pub use pipeline::render::PacketClient;
pub use present::{
    ensure_pdf_extension, packet_filename, ArtifactPresenter, DesktopPresenter, SystemViewer,
    Viewer,
};
pub use progress::{NoopProgressCallback, PacketProgressCallback, ProgressCallback};
pub use service::PacketService;
