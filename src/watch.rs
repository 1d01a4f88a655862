//! Debounced re-analysis host.
//!
//! Polls a file for modifications and re-runs the analysis once changes
//! have been quiet for the configured delay. Analysis itself stays
//! synchronous; only the host loop is async.

use std::collections::HashMap;
use std::hash::Hash;
use std::panic;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, warn};

use crate::analysis::{analyze, Diagnostic};
use crate::config::Config;
use crate::workspace::{read_source, FileReport, WorkspaceError, WorkspaceResult};

/// How often the watched file's modification time is checked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Coalesces bursts of requests per key into one run after a quiet period.
#[derive(Debug)]
pub struct Debouncer<K> {
    delay: Duration,
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadlines: HashMap::new(),
        }
    }

    /// Records a request, pushing back any pending deadline for `key`.
    pub fn request(&mut self, key: K, now: Instant) {
        self.deadlines.insert(key, now + self.delay);
    }

    /// Removes and returns the keys whose quiet period has elapsed.
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        let ready: Vec<K> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &ready {
            self.deadlines.remove(key);
        }
        ready
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    pub fn is_idle(&self) -> bool {
        self.deadlines.is_empty()
    }
}

/// Analyzes a document, treating a panic as "no diagnostics".
pub fn analyze_guarded(text: &str) -> (Vec<Diagnostic>, usize) {
    match panic::catch_unwind(|| {
        let analysis = analyze(text);
        (analysis.diagnostics, analysis.tree.node_count())
    }) {
        Ok(result) => result,
        Err(_) => {
            warn!("analysis panicked; clearing diagnostics");
            (Vec::new(), 0)
        }
    }
}

fn modified(path: &Path) -> WorkspaceResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| WorkspaceError::FileRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Watches `path` and calls `on_report` after each settled change.
///
/// The first report is produced one delay after start. Runs until an I/O
/// error occurs or the future is dropped.
pub async fn watch_file<F>(path: PathBuf, config: Config, mut on_report: F) -> WorkspaceResult<()>
where
    F: FnMut(&FileReport),
{
    let mut debouncer = Debouncer::new(Duration::from_millis(config.diagnostics.delay_ms));
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut last_modified: Option<SystemTime> = None;

    loop {
        ticker.tick().await;

        let stamp = modified(&path)?;
        if last_modified != Some(stamp) {
            debug!(path = %path.display(), "change detected");
            last_modified = Some(stamp);
            debouncer.request(path.clone(), Instant::now());
        }

        for due in debouncer.due(Instant::now()) {
            let text = read_source(&due)?;
            let (diagnostics, node_count) = if config.diagnostics.enable {
                analyze_guarded(&text)
            } else {
                (Vec::new(), 0)
            };
            on_report(&FileReport {
                path: due,
                diagnostics,
                node_count,
            });
        }
    }
}
