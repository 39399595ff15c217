//! Polling directory watcher
//!
//! Stand-in for an external file-system notification capability: the watch
//! directory is scanned on a fixed interval (non-recursive) and paths not
//! seen before are pushed into the acquisition queue. Files already present
//! when the watcher starts are ignored, matching create-event semantics.

use ecg_core::{EcgError, EcgResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Watches one directory for newly created recordings
pub struct DirectoryWatcher {
    dir: PathBuf,
    extension: String,
    poll_interval: Duration,
    seen: HashSet<PathBuf>,
    primed: bool,
}

impl DirectoryWatcher {
    /// Create a watcher for `dir`, matching `extension` case-insensitively
    pub fn new(dir: PathBuf, extension: &str, poll_interval: Duration) -> Self {
        DirectoryWatcher {
            dir,
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
            poll_interval,
            seen: HashSet::new(),
            primed: false,
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    /// Scan once, returning paths that appeared since the previous scan
    ///
    /// The first scan only records what is already present.
    pub fn scan(&mut self) -> EcgResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| EcgError::ConfigError {
            message: format!("cannot read watch dir {}: {}", self.dir.display(), e),
        })?;

        let mut fresh = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !self.matches_extension(&path) {
                continue;
            }
            if self.seen.insert(path.clone()) && self.primed {
                fresh.push(path);
            }
        }

        self.primed = true;
        Ok(fresh)
    }

    /// Poll until the acquisition side hangs up
    pub async fn run(mut self, queue: mpsc::Sender<PathBuf>) {
        info!(
            dir = %self.dir.display(),
            extension = %self.extension,
            "watching for new recordings"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;

            let fresh = match self.scan() {
                Ok(fresh) => fresh,
                Err(e) => {
                    warn!(error = %e, "directory scan failed");
                    continue;
                }
            };

            for path in fresh {
                debug!(file = %path.display(), "new recording detected");
                if queue.send(path).await.is_err() {
                    info!("acquisition queue closed, watcher stopping");
                    return;
                }
            }
        }
    }
}
