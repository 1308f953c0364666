//! Kindred Engine - Orchestration layer for the genealogy graph
//!
//! Ties storage, kinship inference, match scanning, and the notification
//! boundary together behind [`TreeEngine`].

pub mod engine;
pub mod loader;
pub mod notify;
pub mod scan;

pub use engine::{AttachOutcome, TreeEngine};
pub use loader::load_closure;
pub use notify::{
    MemorySink, Notification, NotificationKind, NotificationSink, NotifyError, NotifyResult,
    NullSink,
};
pub use scan::{find_potential_matches, MatchScanConfig};
