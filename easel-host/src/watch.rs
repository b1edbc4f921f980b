//! Filesystem watcher that drives live reloads.
//!
//! Two kinds of files feed a running scene: the program source and the
//! presentation theme. [`ReloadWatcher`] registers each under a
//! [`ReloadKind`] role and reports create/modify events so the embedder
//! can re-run `update` (source changed) or replay `render` with a fresh
//! theme (style changed).
//!
//! Watches are placed on each file's parent directory rather than the
//! file itself, so editors that save via rename-and-replace still fire.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use easel_core::error::{EaselError, Result};

/// The role a watched path plays in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadKind {
    /// The drawing program text. A change requires a full `update` pass.
    Source,
    /// The presentation theme. A change only requires replaying `render`.
    Style,
}

/// A change notification for a registered path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
    /// Which role the changed file was registered under.
    pub kind: ReloadKind,
    /// The path the filesystem reported.
    pub path: PathBuf,
}

/// Watches scene inputs and delivers [`ReloadEvent`]s over a channel.
///
/// The watcher itself never touches guest state. It only observes the
/// filesystem; the embedder decides what each event means.
///
/// # Example
///
/// ```no_run
/// use easel_host::watch::{ReloadKind, ReloadWatcher};
///
/// # fn main() -> easel_core::error::Result<()> {
/// let mut watcher = ReloadWatcher::new();
/// watcher.watch_source("scene.txt")?;
/// watcher.watch_style("theme.yaml")?;
///
/// loop {
///     let event = watcher.recv()?;
///     match event.kind {
///         ReloadKind::Source => { /* re-read, update, render */ }
///         ReloadKind::Style => { /* reload theme, render only */ }
///     }
/// }
/// # }
/// ```
pub struct ReloadWatcher {
    /// Created lazily on the first registration so an idle watcher
    /// costs nothing and setup errors carry the path being registered.
    watcher: Option<RecommendedWatcher>,
    /// Canonical path of each registered file, mapped to its role.
    roles: Arc<RwLock<HashMap<PathBuf, ReloadKind>>>,
    /// Parent directories already under watch.
    watched_dirs: HashSet<PathBuf>,
    tx: Sender<ReloadEvent>,
    rx: Receiver<ReloadEvent>,
}

impl ReloadWatcher {
    /// Create a watcher with no registered paths.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            watcher: None,
            roles: Arc::new(RwLock::new(HashMap::new())),
            watched_dirs: HashSet::new(),
            tx,
            rx,
        }
    }

    /// Register a program source file. Changes require a full `update`.
    ///
    /// Registering a path again replaces its role.
    pub fn watch_source(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.register(path.as_ref(), ReloadKind::Source)
    }

    /// Register a theme file. Changes only require replaying `render`.
    ///
    /// Registering a path again replaces its role.
    pub fn watch_style(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.register(path.as_ref(), ReloadKind::Style)
    }

    /// Block until the next reload event.
    pub fn recv(&self) -> Result<ReloadEvent> {
        self.rx.recv().map_err(|_| EaselError::WatchClosed)
    }

    /// Wait up to `timeout` for the next reload event.
    ///
    /// Returns `Ok(None)` when the timeout elapses without an event.
    /// Useful for coalescing the bursts editors produce on save.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<ReloadEvent>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(EaselError::WatchClosed),
        }
    }

    /// Take the next reload event without blocking, if one is queued.
    pub fn try_recv(&self) -> Option<ReloadEvent> {
        self.rx.try_recv().ok()
    }

    fn register(&mut self, path: &Path, kind: ReloadKind) -> Result<()> {
        let canonical = path.canonicalize().map_err(|e| EaselError::WatchSetup {
            path: path.to_path_buf(),
            cause: format!("Failed to resolve path: {}", e),
        })?;

        let dir = canonical
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| EaselError::WatchSetup {
                path: path.to_path_buf(),
                cause: "Path has no parent directory".to_string(),
            })?;

        self.roles.write().insert(canonical.clone(), kind);
        self.ensure_watching(&dir, path)?;

        tracing::info!(
            path = %canonical.display(),
            role = ?kind,
            "Watching for reloads"
        );
        Ok(())
    }

    /// Put `dir` under a non-recursive watch, creating the backend
    /// watcher on first use. `origin` is only used for error context.
    fn ensure_watching(&mut self, dir: &Path, origin: &Path) -> Result<()> {
        if self.watched_dirs.contains(dir) {
            return Ok(());
        }

        if self.watcher.is_none() {
            self.watcher = Some(self.spawn_watcher(origin)?);
        }

        // The watcher is present from here on.
        if let Some(watcher) = &mut self.watcher {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| EaselError::WatchSetup {
                    path: dir.to_path_buf(),
                    cause: format!("Failed to watch directory: {}", e),
                })?;
        }

        self.watched_dirs.insert(dir.to_path_buf());
        Ok(())
    }

    fn spawn_watcher(&self, origin: &Path) -> Result<RecommendedWatcher> {
        let roles = Arc::clone(&self.roles);
        let tx = self.tx.clone();

        RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    forward_event(event, &roles, &tx);
                }
            },
            Config::default(),
        )
        .map_err(|e| EaselError::WatchSetup {
            path: origin.to_path_buf(),
            cause: format!("Failed to create file watcher: {}", e),
        })
    }
}

impl Default for ReloadWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs on the notify backend thread. Filters events down to
/// create/modify on registered paths and forwards them.
fn forward_event(
    event: Event,
    roles: &RwLock<HashMap<PathBuf, ReloadKind>>,
    tx: &Sender<ReloadEvent>,
) {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return;
    }

    for path in event.paths {
        // Registered keys are canonical. Most backends report canonical
        // paths already; fall back to resolving when they do not.
        let kind = {
            let roles = roles.read();
            roles.get(&path).copied().or_else(|| {
                path.canonicalize()
                    .ok()
                    .and_then(|resolved| roles.get(&resolved).copied())
            })
        };

        if let Some(kind) = kind {
            tracing::debug!(path = %path.display(), role = ?kind, "Reload event detected");
            // A send can only fail during teardown.
            let _ = tx.send(ReloadEvent { kind, path });
        }
    }
}
