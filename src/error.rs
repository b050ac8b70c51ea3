//! Unified error types for the server process.

use thiserror::Error;

/// Unified error type for starting and running the server.
///
/// Request-level failures (unknown paths, wrong methods, malformed requests)
/// never reach this type; axum answers those itself.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// The reload supervisor failed.
    #[error("reload error: {0}")]
    Reload(#[from] ReloadError),

    /// Prometheus exporter could not be installed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reload supervisor errors.
#[derive(Error, Debug)]
pub enum ReloadError {
    /// Path of the running executable could not be resolved.
    #[error("cannot resolve current executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    /// Worker process failed to start.
    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// Worker process could not be stopped.
    #[error("failed to stop worker (pid {pid:?}): {source}")]
    Stop {
        /// Worker pid, if it was still known.
        pid: Option<u32>,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServerError>;
