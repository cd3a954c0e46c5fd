//! CLI binary for submittal-packet.
//!
//! A thin shim over the library crate that reads a packet manifest, maps
//! CLI flags to `PacketConfig`, and previews or saves the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use submittal_packet::{
    canonicalize, packet_filename, ArtifactPresenter, DesktopPresenter, DocumentDirectory,
    HttpDirectory, PacketConfig, PacketError, PacketManifest, PacketProgressCallback, PacketRequest,
    PacketService, ProgressCallback, StaticDirectory,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// How long a previewed packet stays on disk before the CLI removes it.
const PREVIEW_HOLD: Duration = Duration::from_secs(3);

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar over the document fetches, then a spinner
/// while the rendering service composes the packet.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PacketProgressCallback for CliProgressCallback {
    fn on_packet_start(&self, total_documents: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} documents  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(total_documents as u64);
        self.bar.set_prefix("Fetching");
    }

    fn on_document_start(&self, name: &str, _index: usize, _total: usize) {
        self.bar.set_message(name.to_string());
    }

    fn on_document_complete(&self, name: &str, index: usize, total: usize, bytes: usize) {
        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {}  {}",
            green("✓"),
            index + 1,
            total,
            name,
            dim(&format!("{:.1} KiB", bytes as f64 / 1024.0)),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, name: &str, index: usize, total: usize, error: &str) {
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {}  {}",
            red("✗"),
            index + 1,
            total,
            name,
            red(&msg),
        ));
    }

    fn on_render_start(&self, document_count: usize) {
        self.bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        self.bar.set_prefix("Rendering");
        self.bar
            .set_message(format!("composing {document_count} documents…"));
    }

    fn on_packet_complete(&self, artifact_bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} packet ready  {}",
            green("✔"),
            dim(&format!("{:.1} KiB", artifact_bytes as f64 / 1024.0))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate and save next to the manifest's project name
  packet selection.json

  # Save to a specific file
  packet selection.json -o "Harbor Point.pdf"

  # Open in the system PDF viewer instead of saving
  packet selection.json --preview

  # Show the request that would be sent (fileData elided)
  packet selection.json --dry-run

  # Use a remote rendering service and registry
  packet selection.json --endpoint https://pdf.example.com \
                        --registry-url https://registry.example.com

MANIFEST FORMAT:
  {
    "project":   { "projectName": "...", "productType": "structural-floor", ... },
    "documents": [ { "document": { "id": "1", "name": "TDS", "url": "https://...",
                                   "type": "tds" },
                     "selected": true, "order": 1 } ],
    "directory": [ ...optional list of documents for allAvailableDocuments... ]
  }

ENVIRONMENT VARIABLES:
  PACKET_SERVICE_URL      Rendering service base URL (default http://localhost:3001)
  PACKET_REGISTRY_URL     Document registry base URL for the category listing
  RUST_LOG                Override log filter
"#;

/// Assemble a submittal packet PDF from a manifest of selected documents.
#[derive(Parser, Debug)]
#[command(
    name = "packet",
    version,
    about = "Assemble a submittal packet PDF from selected documents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// JSON manifest with project details and the document selection.
    manifest: PathBuf,

    /// Write the packet to this file.
    #[arg(short, long, env = "PACKET_OUTPUT", conflicts_with_all = ["preview", "dry_run"])]
    output: Option<PathBuf>,

    /// Open the packet in the system viewer instead of saving it.
    #[arg(long, conflicts_with = "dry_run")]
    preview: bool,

    /// Print the request JSON without contacting the rendering service.
    #[arg(long)]
    dry_run: bool,

    /// Rendering service base URL.
    #[arg(long, env = "PACKET_SERVICE_URL", default_value = submittal_packet::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Document registry base URL used for the category listing.
    #[arg(long, env = "PACKET_REGISTRY_URL")]
    registry_url: Option<String>,

    /// Per-document download timeout in seconds.
    #[arg(long, env = "PACKET_FETCH_TIMEOUT", default_value_t = 60)]
    fetch_timeout: u64,

    /// Rendering request timeout in seconds.
    #[arg(long, env = "PACKET_RENDER_TIMEOUT", default_value_t = 120)]
    render_timeout: u64,

    /// Category directory lookup timeout in seconds.
    #[arg(long, env = "PACKET_DIRECTORY_TIMEOUT", default_value_t = 15)]
    directory_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "PACKET_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PACKET_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PACKET_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Load manifest ────────────────────────────────────────────────────
    let text = tokio::fs::read_to_string(&cli.manifest)
        .await
        .with_context(|| format!("Failed to read manifest {:?}", cli.manifest))?;
    let manifest: PacketManifest =
        serde_json::from_str(&text).with_context(|| format!("Invalid manifest {:?}", cli.manifest))?;

    // ── Build service ────────────────────────────────────────────────────
    let cli_progress = show_progress.then(CliProgressCallback::new);
    let progress = cli_progress.clone().map(|cb| cb as ProgressCallback);
    let bar = cli_progress.as_ref().map(|cb| &cb.bar);
    let config = build_config(&cli, progress)?;
    let mut service = PacketService::new(config).context("Failed to initialise HTTP client")?;
    if let Some(directory) = build_directory(&cli, &manifest, service.http_client()) {
        service = service.with_directory(directory);
    }

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        return match service
            .build_request(&manifest.documents, manifest.project.clone())
            .await
        {
            Ok(request) => {
                let json = serde_json::to_string_pretty(&elide_file_data(&request))
                    .context("Failed to serialise request")?;
                println!("{json}");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(report_failure(&e, bar)),
        };
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let artifact = match service
        .generate_packet(&manifest.documents, manifest.project.clone())
        .await
    {
        Ok(artifact) => artifact,
        Err(e) => return Ok(report_failure(&e, bar)),
    };

    // ── Deliver ──────────────────────────────────────────────────────────
    let (dir, filename) = match cli.output {
        Some(ref path) => (
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        ),
        None => (
            PathBuf::from("."),
            packet_filename(&canonicalize(
                manifest.project.clone(),
                chrono::Local::now().date_naive(),
            )),
        ),
    };
    let presenter = DesktopPresenter::new(dir).release_after(PREVIEW_HOLD);

    if cli.preview {
        if let Err(e) = presenter.preview(&artifact) {
            return Ok(report_failure(&e, None));
        }
        if !cli.quiet {
            eprintln!("{} opened packet preview", cyan("◆"));
        }
        // The viewer needs the file until it has loaded it.
        tokio::task::block_in_place(|| presenter.wait_for_release());
    } else {
        match presenter.download(&artifact, &filename) {
            Ok(path) => {
                if !cli.quiet {
                    eprintln!(
                        "{}  {}  →  {}",
                        green("✔"),
                        dim(&format!("{} bytes", artifact.len())),
                        bold(&path.display().to_string())
                    );
                }
            }
            Err(e) => return Ok(report_failure(&e, None)),
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `PacketConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PacketConfig> {
    let mut builder = PacketConfig::builder()
        .endpoint(cli.endpoint.clone())
        .fetch_timeout_secs(cli.fetch_timeout)
        .render_timeout_secs(cli.render_timeout)
        .directory_timeout_secs(cli.directory_timeout);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

/// Manifest directory wins over a registry URL; neither means no listing.
fn build_directory(
    cli: &Cli,
    manifest: &PacketManifest,
    http: &reqwest::Client,
) -> Option<Arc<dyn DocumentDirectory>> {
    if let Some(ref documents) = manifest.directory {
        return Some(Arc::new(StaticDirectory::new(documents.clone())));
    }
    cli.registry_url.as_ref().map(|url| {
        Arc::new(HttpDirectory::new(http.clone(), url.clone()))
            as Arc<dyn DocumentDirectory>
    })
}

/// Replace each `fileData` with its length so dry-run output stays readable.
fn elide_file_data(request: &PacketRequest) -> serde_json::Value {
    let mut value = serde_json::to_value(request).unwrap_or_default();
    if let Some(docs) = value.get_mut("documents").and_then(|d| d.as_array_mut()) {
        for doc in docs {
            if let Some(data) = doc.get_mut("fileData") {
                let len = data.as_str().map(str::len).unwrap_or(0);
                *data = serde_json::Value::String(format!("<{len} bytes base64>"));
            }
        }
    }
    value
}

fn report_failure(e: &PacketError, bar: Option<&ProgressBar>) -> ExitCode {
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    eprintln!("{} {}", red("✘"), bold(&e.user_message()));
    tracing::debug!("{e:?}");
    ExitCode::FAILURE
}
