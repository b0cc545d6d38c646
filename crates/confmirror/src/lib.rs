//! # confmirror
//!
//! A configuration-refresh sidecar for long-running services whose
//! configuration is mounted from an external source (a volume, a secret
//! store) and must be re-materialized whenever that source changes.
//!
//! `confmirror` watches a directory of configuration files, coalesces
//! bursts of filesystem changes into a single reprocessing pass, rewrites
//! environment-variable placeholders (`${VAR}` / `$VAR`) into concrete
//! values, copies the results to a target directory, and POSTs a reload
//! request to a downstream service (canonically Prometheus' `/-/reload`
//! endpoint).
//!
//! ## How a refresh happens
//!
//! ```text
//! ┌────────────┐     ┌──────────────┐     ┌─────────────────────────┐
//! │   notify   │────▶│ ChangeSource │────▶│       Coordinator       │
//! │  (events)  │     │ (stat→mtime) │     │ (debounce, select loop) │
//! └────────────┘     └──────────────┘     └─────────────────────────┘
//!                                                     │ on settle
//!                                                     ▼
//!                                        ┌──────────┐    ┌──────────────┐
//!                                        │ Pipeline │───▶│ReloadNotifier│
//!                                        │ (rewrite)│    │ (HTTP POST)  │
//!                                        └──────────┘    └──────────────┘
//! ```
//!
//! The [`watch::Coordinator`] is the only component with real concurrency
//! semantics: it merges change timestamps, a single-shot debounce timer
//! and the shutdown signal into one single-threaded decision loop, and it
//! is the sole owner of the two timestamps that decide whether a pass is
//! due. Everything downstream of it is plain sequential I/O.
//!
//! ## Debounce semantics
//!
//! Every filesystem change re-arms the quiet-period timer (a reset, not a
//! queue), so N rapid changes collapse into one pass that runs once the
//! directory has been quiet for the configured delay. A pass runs if and
//! only if the last recorded change is newer than the last completed
//! pass, which makes stale timer firings harmless no-ops and guarantees
//! that a change arriving *during* a pass is picked up by a later one.
//!
//! ## Failure policy
//!
//! Only two things are fatal: failing to construct the filesystem watcher
//! and failing to install the signal handler, both at startup. Everything
//! else (stat races on changed paths, unreadable files, unreachable
//! reload endpoints) is logged and skipped; a failed pass is not retried
//! until a new change arrives.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
pub use error::Error;

/// A Result type that displays errors with miette's fancy formatting.
///
/// Use this as your main function return type for pretty error output:
///
/// ```rust,ignore
/// fn main() -> confmirror::Result<()> {
///     let settings = Settings::parse();
///     Ok(())
/// }
/// ```
pub type Result<T> = miette::Result<T>;

mod settings;
pub use settings::Settings;

pub mod expand;

mod pipeline;
pub use pipeline::Pipeline;

mod notifier;
pub use notifier::ReloadNotifier;

pub mod watch;
pub use watch::{ChangeSource, Coordinator};
