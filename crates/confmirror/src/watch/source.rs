//! The change source: notify subscription plus event normalization.
//!
//! Raw `notify` events are not trusted to carry a usable modification
//! time across all backends, so the listener thread re-derives one by
//! statting the event's path. Paths that vanish between notification and
//! handling are logged and dropped; the subscription itself survives.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, bounded};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::Error;

/// Capacity of the raw notify-result channel fed by the OS callback.
const RAW_EVENT_BUFFER: usize = 128;

/// Capacity of the normalized timestamp channel read by the coordinator.
///
/// Must be at least one so a save landing while the coordinator is busy
/// running a pass is buffered rather than lost.
const CHANGE_BUFFER: usize = 64;

/// How long a blocked forward waits before re-checking the running flag.
///
/// Keeps the listener responsive to teardown even when the change channel
/// is full and nobody is draining it anymore.
const SEND_RETRY: Duration = Duration::from_millis(50);

/// A live filesystem-change subscription for one watched root.
///
/// Owns the `notify` watcher and the listener thread that turns raw
/// events into [`SystemTime`] values. Dropping it tears the subscription
/// down: the watcher is dropped first (closing the raw event channel) and
/// the listener thread is joined.
pub struct ChangeSource {
    /// Kept alive for the lifetime of the subscription.
    watcher: Option<RecommendedWatcher>,
    /// Listener thread handle, joined on drop.
    listener: Option<JoinHandle<()>>,
    /// Cleared on drop so a listener blocked forwarding a timestamp into a
    /// full, undrained change channel still terminates.
    running: Arc<AtomicBool>,
}

impl ChangeSource {
    /// Subscribe to changes under `path`, recursively.
    ///
    /// Returns the subscription handle and the receiving end of the
    /// normalized change channel: one modification timestamp per observed
    /// file touch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WatchInit`] if the platform notification watcher
    /// cannot be constructed or the listener thread cannot be spawned.
    /// Both are fatal: the process cannot function without a change source.
    ///
    /// A watch root that does not currently exist is *not* an error: it is
    /// logged and the subscription is still returned, tolerating roots
    /// that are mounted after startup.
    pub fn subscribe(path: &Path) -> Result<(Self, Receiver<SystemTime>), Error> {
        debug!(path = %path.display(), "creating watcher");

        let (raw_tx, raw_rx) = bounded::<notify::Result<Event>>(RAW_EVENT_BUFFER);
        let mut watcher = notify::recommended_watcher(move |result| {
            let _ = raw_tx.send(result);
        })
        .map_err(|e| Error::watch_init(format!("failed to create file watcher: {e}"), Some(e)))?;

        match watcher.watch(path, RecursiveMode::Recursive) {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => {
                info!(path = %path.display(), "watched path does not exist");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to watch path");
            }
        }

        let (change_tx, change_rx) = bounded::<SystemTime>(CHANGE_BUFFER);
        let running = Arc::new(AtomicBool::new(true));

        let listener_running = running.clone();
        let listener = thread::Builder::new()
            .name("confmirror-listener".to_string())
            .spawn(move || listener_loop(&raw_rx, &change_tx, &listener_running))
            .map_err(|e| {
                Error::watch_init(format!("failed to spawn listener thread: {e}"), None)
            })?;

        Ok((
            Self {
                watcher: Some(watcher),
                listener: Some(listener),
                running,
            },
            change_rx,
        ))
    }
}

impl Drop for ChangeSource {
    fn drop(&mut self) {
        // Clear the flag first so a forward blocked on a full change
        // channel gives up, then drop the watcher to close the raw event
        // sender and unblock the listener's recv.
        self.running.store(false, Ordering::Release);
        drop(self.watcher.take());
        if let Some(handle) = self.listener.take() {
            let _ = handle.join();
        }
    }
}

/// Drain raw watcher results, normalizing each event path to its mtime.
fn listener_loop(
    raw_rx: &Receiver<notify::Result<Event>>,
    change_tx: &Sender<SystemTime>,
    running: &AtomicBool,
) {
    while let Ok(result) = raw_rx.recv() {
        match result {
            Ok(event) => {
                for path in &event.paths {
                    debug!(path = %path.display(), "received an event");

                    let modified = match fs::metadata(path).and_then(|meta| meta.modified()) {
                        Ok(modified) => modified,
                        Err(e) => {
                            // Deleted between notification and handling.
                            error!(
                                path = %path.display(),
                                error = %e,
                                "could not get modified time, dropping event"
                            );
                            continue;
                        }
                    };

                    if !forward(change_tx, running, modified) {
                        // Coordinator went away or the subscription is
                        // being torn down; nothing left to feed.
                        return;
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "error from watcher");
            }
        }
    }
}

/// Send one timestamp, waiting in bounded slices so teardown is observed.
///
/// Returns `false` once the receiver is gone or the subscription stopped.
fn forward(change_tx: &Sender<SystemTime>, running: &AtomicBool, modified: SystemTime) -> bool {
    let mut pending = modified;

    loop {
        if !running.load(Ordering::Acquire) {
            return false;
        }

        match change_tx.send_timeout(pending, SEND_RETRY) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(value)) => pending = value,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

/// Whether a notify error means the watched path does not exist.
fn is_not_found(error: &notify::Error) -> bool {
    match &error.kind {
        notify::ErrorKind::PathNotFound => true,
        notify::ErrorKind::Io(io) => io.kind() == std::io::ErrorKind::NotFound,
        _ => false,
    }
}
