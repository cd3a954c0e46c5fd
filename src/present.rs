//! Artifact delivery: show a rendered packet or save it under a filename.
//!
//! The pipeline only ever produces a [`PacketArtifact`]; what happens next is
//! platform-specific and lives behind [`ArtifactPresenter`].
//! [`DesktopPresenter`] implements it for a local machine:
//!
//! * **preview** writes the packet to a transient `.pdf` temp file, opens it
//!   in the system viewer and, if that fails, in the web browser. The temp
//!   file is removed after a bounded delay so viewers have time to load it,
//!   or as soon as the presenter is dropped, whichever comes first.
//!   [`DesktopPresenter::wait_for_release`] blocks until every pending
//!   removal has run.
//! * **download** writes the packet into a directory under a `.pdf`-suffixed
//!   name, via a temp file persisted in place so readers never see a partial
//!   file.

use crate::error::PacketError;
use crate::model::{PacketArtifact, ProjectData};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;
use tempfile::TempPath;
use tracing::{debug, info, warn};

/// Platform capability that hands a rendered packet to the user.
pub trait ArtifactPresenter: Send + Sync {
    /// Display the packet.
    fn preview(&self, artifact: &PacketArtifact) -> Result<(), PacketError>;

    /// Save the packet as `filename` (extension added when missing) and
    /// return where it was written.
    fn download(&self, artifact: &PacketArtifact, filename: &str) -> Result<PathBuf, PacketError>;
}

/// Something that can show a file to the user.
pub trait Viewer: Send + Sync {
    /// Open `path` in a new viewing context (a separate viewer window).
    fn open_new(&self, path: &Path) -> io::Result<()>;

    /// Fallback: open `path` in the current/default context.
    fn open_in_place(&self, path: &Path) -> io::Result<()>;
}

/// Uses the OS default PDF handler, falling back to the web browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemViewer;

impl Viewer for SystemViewer {
    fn open_new(&self, path: &Path) -> io::Result<()> {
        open::that_detached(path)
    }

    fn open_in_place(&self, path: &Path) -> io::Result<()> {
        webbrowser::open(&format!("file://{}", path.display()))
    }
}

/// Append `.pdf` unless `filename` already ends with it (any case).
///
/// Directory components are stripped; a blank name becomes
/// `submittal-packet.pdf`.
pub fn ensure_pdf_extension(filename: &str) -> String {
    let base = Path::new(filename.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .trim();
    if base.is_empty() {
        return "submittal-packet.pdf".to_string();
    }
    if base.to_ascii_lowercase().ends_with(".pdf") {
        base.to_string()
    } else {
        format!("{base}.pdf")
    }
}

/// Default download name for a project, e.g. `Harbor Point - Submittal Packet.pdf`.
pub fn packet_filename(project: &ProjectData) -> String {
    let safe: String = project
        .project_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    ensure_pdf_extension(&format!("{} - Submittal Packet", safe.trim()))
}

/// A preview file waiting to be removed.
struct PendingRelease {
    /// Dropping this wakes the release thread early.
    stop: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// [`ArtifactPresenter`] for a desktop session.
///
/// Dropping the presenter removes any preview files it still holds.
pub struct DesktopPresenter {
    viewer: Box<dyn Viewer>,
    download_dir: PathBuf,
    release_after: Duration,
    pending: Mutex<Vec<PendingRelease>>,
}

impl DesktopPresenter {
    /// Presenter using the system viewer, saving into `download_dir`.
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self::with_viewer(download_dir, Box::new(SystemViewer))
    }

    pub fn with_viewer(download_dir: impl Into<PathBuf>, viewer: Box<dyn Viewer>) -> Self {
        Self {
            viewer,
            download_dir: download_dir.into(),
            release_after: Duration::from_secs(60),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// How long a preview's temp file outlives the open call. Default: 60 s.
    pub fn release_after(mut self, delay: Duration) -> Self {
        self.release_after = delay;
        self
    }

    fn write_transient(&self, artifact: &PacketArtifact) -> io::Result<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix("submittal-packet-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(artifact.as_bytes())?;
        file.flush()?;
        Ok(file.into_temp_path())
    }

    /// Block until every preview file has been released, each after its
    /// full `release_after` delay.
    pub fn wait_for_release(&self) {
        for release in self.take_pending() {
            let _ = release.handle.join();
            drop(release.stop);
        }
    }

    /// Drop the temp file once `release_after` has elapsed, or earlier if
    /// the presenter goes away.
    fn release_later(&self, path: TempPath) {
        let delay = self.release_after;
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = std::thread::spawn(move || {
            let _ = stopped.recv_timeout(delay);
            debug!("Releasing preview file {}", path.display());
            drop(path);
        });
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PendingRelease { stop, handle });
    }

    fn take_pending(&self) -> Vec<PendingRelease> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Drop for DesktopPresenter {
    fn drop(&mut self) {
        for PendingRelease { stop, handle } in self.take_pending() {
            drop(stop);
            let _ = handle.join();
        }
    }
}

impl ArtifactPresenter for DesktopPresenter {
    fn preview(&self, artifact: &PacketArtifact) -> Result<(), PacketError> {
        let path = self
            .write_transient(artifact)
            .map_err(|e| PacketError::Presentation {
                reason: format!("could not stage preview file: {e}"),
            })?;

        match self.viewer.open_new(&path) {
            Ok(()) => {
                info!("Opened preview {}", path.display());
                self.release_later(path);
                Ok(())
            }
            Err(primary) => {
                warn!("Viewer refused preview ({}); falling back", primary);
                match self.viewer.open_in_place(&path) {
                    Ok(()) => {
                        info!("Opened preview {} in fallback viewer", path.display());
                        self.release_later(path);
                        Ok(())
                    }
                    Err(fallback) => Err(PacketError::Presentation {
                        reason: format!(
                            "viewer failed ({primary}) and fallback failed ({fallback})"
                        ),
                    }),
                }
            }
        }
    }

    fn download(&self, artifact: &PacketArtifact, filename: &str) -> Result<PathBuf, PacketError> {
        let target = self.download_dir.join(ensure_pdf_extension(filename));
        let write_failed = |source: io::Error| PacketError::OutputWriteFailed {
            path: target.clone(),
            source,
        };

        std::fs::create_dir_all(&self.download_dir).map_err(write_failed)?;
        let mut file = tempfile::Builder::new()
            .prefix(".packet-")
            .suffix(".tmp")
            .tempfile_in(&self.download_dir)
            .map_err(write_failed)?;
        file.write_all(artifact.as_bytes()).map_err(write_failed)?;
        file.flush().map_err(write_failed)?;
        file.persist(&target).map_err(|e| write_failed(e.error))?;

        info!("Saved packet to {}", target.display());
        Ok(target)
    }
}
