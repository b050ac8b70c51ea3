//! Development auto-reload.
//!
//! The supervisor runs the server as a child process (the same executable,
//! same arguments) and restarts it whenever a watched file changes. Watched
//! files are polled by modification time; the running executable is always
//! among them, so a rebuild restarts the server.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::ReloadError;
use crate::utils::shutdown_signal;

/// Environment marker set on worker processes.
pub const WORKER_ENV: &str = "DODREAM_RELOAD_WORKER";

/// How often watched paths are polled.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How long a worker may take to exit on shutdown before it is killed.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Whether this process was spawned by a reload supervisor.
pub fn is_worker() -> bool {
    std::env::var(WORKER_ENV).is_ok_and(|v| v == "1")
}

/// Modification times of every file under a set of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    mtimes: BTreeMap<PathBuf, SystemTime>,
}

impl Snapshot {
    /// Walk `paths` recursively. Paths that do not exist are skipped.
    pub fn take(paths: &[PathBuf]) -> Self {
        let mut mtimes = BTreeMap::new();
        for path in paths {
            collect(path, &mut mtimes);
        }
        Self { mtimes }
    }

    /// Number of files seen.
    pub fn len(&self) -> usize {
        self.mtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mtimes.is_empty()
    }

    /// Files added, removed or modified relative to `earlier`, sorted.
    pub fn changed_since(&self, earlier: &Snapshot) -> Vec<PathBuf> {
        let mut changed: Vec<PathBuf> = self
            .mtimes
            .iter()
            .filter(|(path, mtime)| earlier.mtimes.get(*path) != Some(*mtime))
            .map(|(path, _)| path.clone())
            .collect();

        changed.extend(
            earlier
                .mtimes
                .keys()
                .filter(|path| !self.mtimes.contains_key(*path))
                .cloned(),
        );
        changed.sort();
        changed
    }
}

fn collect(path: &Path, out: &mut BTreeMap<PathBuf, SystemTime>) {
    // Files can vanish between listing and stat; those are just skipped.
    let Ok(meta) = fs::symlink_metadata(path) else {
        return;
    };

    if meta.is_dir() {
        let Ok(entries) = fs::read_dir(path) else {
            return;
        };
        for entry in entries.flatten() {
            collect(&entry.path(), out);
        }
        return;
    }

    // Symlinks are followed for the timestamp but never recursed into.
    let modified = if meta.file_type().is_symlink() {
        fs::metadata(path).and_then(|m| m.modified())
    } else {
        meta.modified()
    };
    if let Ok(mtime) = modified {
        out.insert(path.to_path_buf(), mtime);
    }
}

/// Restarts a worker copy of this process when watched files change.
#[derive(Debug)]
pub struct Supervisor {
    exe: PathBuf,
    args: Vec<OsString>,
    watched: Vec<PathBuf>,
    interval: Duration,
    shutdown_grace: Duration,
}

impl Supervisor {
    /// Supervise the current executable with the current arguments, watching
    /// it plus `watch_dirs`.
    pub fn for_current_process(watch_dirs: &[PathBuf]) -> Result<Self, ReloadError> {
        let exe = std::env::current_exe().map_err(ReloadError::CurrentExe)?;
        let args = std::env::args_os().skip(1).collect();
        Ok(Self::new(exe, args, watch_dirs))
    }

    pub fn new(exe: PathBuf, args: Vec<OsString>, watch_dirs: &[PathBuf]) -> Self {
        let mut watched = Vec::with_capacity(watch_dirs.len() + 1);
        watched.push(exe.clone());
        watched.extend(watch_dirs.iter().cloned());

        Self {
            exe,
            args,
            watched,
            interval: POLL_INTERVAL,
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }

    /// Poll every `interval` instead of [`POLL_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Wait up to `grace` for the worker to exit on shutdown before killing it.
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Paths polled for changes.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    fn spawn_worker(&self) -> Result<Child, ReloadError> {
        let child = Command::new(&self.exe)
            .args(&self.args)
            .env(WORKER_ENV, "1")
            .kill_on_drop(true)
            .spawn()
            .map_err(ReloadError::Spawn)?;
        info!(pid = ?child.id(), "started worker");
        Ok(child)
    }

    /// Run until Ctrl-C / SIGTERM, restarting the worker on every change.
    ///
    /// Workers are stopped with SIGKILL. On shutdown the worker first gets
    /// the grace period to exit by itself, which it does when it shares the
    /// terminal's process group and received the same Ctrl-C. A SIGTERM sent
    /// to the supervisor alone is not forwarded, so in that case the worker
    /// skips its graceful shutdown.
    pub async fn run(self) -> Result<(), ReloadError> {
        self.run_until(shutdown_signal()).await
    }

    /// Run until `shutdown` resolves.
    ///
    /// A worker that exits on its own is not respawned until the next change.
    /// A failed respawn (the executable is typically missing mid-rebuild) is
    /// retried on every poll until it succeeds; only the first spawn is fatal.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ReloadError>
    where
        F: Future<Output = ()>,
    {
        info!(watched = ?self.watched, "reload supervisor started");

        let mut snapshot = Snapshot::take(&self.watched);
        let mut worker = Some(self.spawn_worker()?);
        let mut respawn_pending = false;
        let mut ticker = tokio::time::interval(self.interval);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    stop_worker(worker.take(), self.shutdown_grace).await?;
                    info!("reload supervisor stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if let Some(child) = worker.as_mut() {
                        let pid = child.id();
                        match child.try_wait() {
                            Ok(Some(status)) => {
                                warn!(%status, "worker exited, waiting for changes");
                                worker = None;
                            }
                            Ok(None) => {}
                            Err(source) => return Err(ReloadError::Stop { pid, source }),
                        }
                    }

                    let current = Snapshot::take(&self.watched);
                    let changed = current.changed_since(&snapshot);
                    if changed.is_empty() && !respawn_pending {
                        continue;
                    }

                    if !respawn_pending {
                        info!(changed = ?changed, "detected changes, restarting worker");
                    }
                    stop_worker(worker.take(), Duration::ZERO).await?;
                    match self.spawn_worker() {
                        Ok(child) => {
                            worker = Some(child);
                            snapshot = current;
                            respawn_pending = false;
                        }
                        Err(e) => {
                            warn!("{}, retrying on next poll", e);
                            respawn_pending = true;
                        }
                    }
                }
            }
        }
    }
}

/// Stop `worker`, giving it up to `grace` to exit before SIGKILL.
async fn stop_worker(worker: Option<Child>, grace: Duration) -> Result<(), ReloadError> {
    let Some(mut child) = worker else {
        return Ok(());
    };
    let pid = child.id();

    if let Some(status) = child
        .try_wait()
        .map_err(|source| ReloadError::Stop { pid, source })?
    {
        debug!(?pid, %status, "worker already exited");
        return Ok(());
    }

    if !grace.is_zero() {
        if let Ok(waited) = tokio::time::timeout(grace, child.wait()).await {
            let status = waited.map_err(|source| ReloadError::Stop { pid, source })?;
            debug!(?pid, %status, "worker exited within grace period");
            return Ok(());
        }
        debug!(?pid, "worker still running after grace period");
    }

    child
        .start_kill()
        .map_err(|source| ReloadError::Stop { pid, source })?;
    let status = child
        .wait()
        .await
        .map_err(|source| ReloadError::Stop { pid, source })?;
    debug!(?pid, %status, "worker stopped");
    Ok(())
}
