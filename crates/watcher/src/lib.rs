//! Folder watching and upload dispatch.
//!
//! [`WatchDispatcher`] turns `notify` events for the watched folder into
//! [`WatchEvent`]s on an unbounded channel. [`run_dispatch`] is the single
//! consumer: it drops repeated events for the same path and runs the
//! [`Pipeline`] for one file at a time.

mod dedup;
mod dispatcher;
mod event;

pub use dedup::PathDeduplicator;
pub use dispatcher::{Pipeline, PipelineFuture, WatchDispatcher, WatchError, run_dispatch};
pub use event::{WatchEvent, WatchEventKind};
