//! Error types for fatal startup failures.
//!
//! Per-file I/O problems, stat races and failed reload notifications are
//! deliberately *not* represented here: they are logged at the site where
//! they occur and the affected operation is skipped. Only conditions the
//! process cannot run without surface as [`Error`].

use miette::Diagnostic;
use thiserror::Error as ThisError;

/// Fatal errors that abort the sidecar at startup.
#[derive(Debug, ThisError, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// Failed to construct the filesystem-notification watcher.
    ///
    /// Without a watcher the process has no change source and cannot
    /// function, so this terminates startup.
    #[error("failed to initialize file watcher: {message}")]
    #[diagnostic(
        code(confmirror::watch::init_failed),
        help("Check that the platform notification backend (inotify, FSEvents, ...) is available")
    )]
    WatchInit {
        /// Human-readable error message.
        message: String,
        /// The underlying notify error, if available.
        #[source]
        source: Option<notify::Error>,
    },

    /// Failed to install the SIGINT/SIGTERM handler.
    #[error("failed to install signal handler: {0}")]
    #[diagnostic(code(confmirror::signal::install_failed))]
    SignalHandler(#[source] ctrlc::Error),
}

impl Error {
    /// Create a new `WatchInit` error.
    pub fn watch_init(message: impl Into<String>, source: Option<notify::Error>) -> Self {
        Self::WatchInit {
            message: message.into(),
            source,
        }
    }
}
