// Download collaborators - where exported files end up

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

/// Receives a finished file. Fire-and-forget: failures are logged, never
/// reported back to the exporter.
pub trait DownloadSink: Send + Sync {
    fn download(&self, filename: &str, mime_type: &str, content: &str);
}

/// Writes each download into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn download(&self, filename: &str, mime_type: &str, content: &str) {
        // Only the final path component is honoured.
        let Some(name) = Path::new(filename).file_name() else {
            warn!("Refusing download with no file name: {:?}", filename);
            return;
        };
        let path = self.dir.join(name);

        let result = fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, content));
        match result {
            Ok(()) => info!("Saved {} ({}, {} bytes)", path.display(), mime_type, content.len()),
            Err(e) => warn!("Failed to save {}: {}", path.display(), e),
        }
    }
}

/// A file captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

/// Keeps downloads in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    downloads: Mutex<Vec<Download>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl DownloadSink for RecordingSink {
    fn download(&self, filename: &str, mime_type: &str, content: &str) {
        if let Ok(mut downloads) = self.downloads.lock() {
            downloads.push(Download {
                filename: filename.to_string(),
                mime_type: mime_type.to_string(),
                content: content.to_string(),
            });
        }
    }
}
