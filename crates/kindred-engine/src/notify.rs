//! Notification sink boundary
//!
//! The engine reports matches to a sink and moves on; delivery mechanics
//! (persistence, push, email) live behind the trait. Sink failures are
//! logged, never propagated into the mutation that triggered them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kindred_core::{NodeId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Result type alias for notification delivery
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Delivery error: {0}")]
    Delivery(String),
}

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Match,
    General,
}

/// A notification handed to the sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Receiving user
    pub recipient: UserId,

    /// Category
    pub kind: NotificationKind,

    /// Human-readable message
    pub message: String,

    /// Node the notification is about, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_node: Option<NodeId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            kind,
            message: message.into(),
            related_node: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_related_node(mut self, node: NodeId) -> Self {
        self.related_node = Some(node);
        self
    }
}

/// Trait for notification sinks
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification
    async fn deliver(&self, notification: Notification) -> NotifyResult<()>;
}

/// Sink that drops every notification
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn deliver(&self, _notification: Notification) -> NotifyResult<()> {
        Ok(())
    }
}

/// Sink that records notifications in memory, for tests
#[derive(Default)]
pub struct MemorySink {
    delivered: RwLock<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .read()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn deliver(&self, notification: Notification) -> NotifyResult<()> {
        self.delivered
            .write()
            .map_err(|e| NotifyError::Delivery(format!("Lock error: {}", e)))?
            .push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_records() {
        let sink = MemorySink::new();
        let recipient = UserId::new();

        sink.deliver(Notification::new(
            recipient,
            NotificationKind::Match,
            "A potential match was found in your family tree!",
        ))
        .await
        .unwrap();

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].recipient, recipient);
        assert_eq!(delivered[0].kind, NotificationKind::Match);
    }
}
