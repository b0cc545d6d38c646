//! The debounce coordinator: one loop, three event sources.
//!
//! The coordinator merges change timestamps, a single-shot quiet-period
//! timer and the shutdown signal into one `select!` loop, and it alone
//! decides when a reprocessing pass runs. Two timestamps carry all of its
//! state:
//!
//! - `last_change`: the most recent moment any watched file was touched
//! - `last_process`: the most recent moment a pass completed
//!
//! A timer firing triggers a pass if and only if `last_process` is older
//! than `last_change`. Comparing timestamps instead of keeping a dirty
//! flag means a stale firing is a harmless no-op, and a change landing
//! while a pass is in flight raises `last_change` again so a later firing
//! settles it.

use std::time::{Duration, SystemTime};

use crossbeam_channel::{Receiver, after, select};
use tracing::{debug, info, warn};

/// The debounce state machine driving reprocessing passes.
///
/// Constructed once at startup and consumed by [`Coordinator::run`],
/// which blocks until shutdown. All state is touched only inside the run
/// loop; nothing here is shared or locked.
#[derive(Debug)]
pub struct Coordinator {
    /// Delay after the most recent change before a pass may run.
    quiet_period: Duration,
    /// Most recent moment any watched file was touched.
    last_change: SystemTime,
    /// Most recent moment a reprocessing pass completed.
    last_process: SystemTime,
}

impl Coordinator {
    /// Create a coordinator with the given quiet period.
    ///
    /// `last_change` starts at the current time and `last_process` at the
    /// epoch, so the very first timer firing always performs one pass:
    /// the target directory is populated from process start even when the
    /// watched files never change.
    #[must_use]
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            last_change: SystemTime::now(),
            last_process: SystemTime::UNIX_EPOCH,
        }
    }

    /// Run the coordination loop until shutdown.
    ///
    /// `refresh_fn` is invoked once per due pass, synchronously, on this
    /// thread. It is expected to handle its own failures internally;
    /// `last_process` advances when it returns regardless of what
    /// happened inside, so a failing downstream does not cause a retry
    /// storm (a new change or a restart is required instead).
    ///
    /// The loop exits when anything arrives on `shutdown`, or when the
    /// change channel disconnects (the source was dropped).
    pub fn run<F>(mut self, changes: &Receiver<SystemTime>, shutdown: &Receiver<()>, mut refresh_fn: F)
    where
        F: FnMut(),
    {
        // Armed with zero delay so the first iteration runs the startup pass.
        let mut deadline = after(Duration::ZERO);

        loop {
            select! {
                recv(shutdown) -> _ => {
                    info!("received shutdown signal, stopping");
                    break;
                }

                recv(changes) -> msg => match msg {
                    Ok(changed_at) => {
                        self.last_change = changed_at;
                        // Reset, not queue: a fresh countdown supersedes any
                        // pending one, collapsing a burst into one firing.
                        deadline = after(self.quiet_period);
                    }
                    Err(_) => {
                        warn!("change source disconnected, stopping");
                        break;
                    }
                },

                recv(deadline) -> _ => {
                    if self.last_process < self.last_change {
                        refresh_fn();
                        self.last_process = SystemTime::now();
                    } else {
                        // Stale firing; nothing new since the last pass.
                        debug!("quiet period elapsed with nothing to process");
                    }
                }
            }
        }
    }
}
