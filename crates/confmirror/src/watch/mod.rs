//! Filesystem watching and the debounce coordination loop.
//!
//! This module is the concurrent core of the sidecar. It contains exactly
//! two cooperating tasks:
//!
//! - [`ChangeSource`] wraps the `notify` subscription and runs a
//!   listener thread that normalizes each raw filesystem event into the
//!   modification time of the touched path, forwarded over a bounded
//!   channel. The listener never touches coordinator state.
//! - [`Coordinator`] is the single-threaded decision loop that merges
//!   change timestamps, a single-shot debounce timer and the shutdown
//!   signal, and decides when a reprocessing pass is due. It is the sole
//!   owner and mutator of the `last change` / `last processed`
//!   timestamps, so no locks are involved anywhere.
//!
//! # Event flow
//!
//! ```text
//! notify callback ──▶ raw event channel ──▶ listener thread (stat)
//!                                                │  mtime
//!                                                ▼
//!                          change channel ──▶ Coordinator::run
//! ```
//!
//! The change channel buffers pending timestamps while the coordinator is
//! blocked inside a pass, so a burst of saves during processing is merged
//! into the timestamps and settled by a later timer firing rather than
//! lost.

mod coordinator;
mod source;

pub use coordinator::Coordinator;
pub use source::ChangeSource;
