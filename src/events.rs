//! Out-of-band signals emitted while handling a message.
//!
//! The visual status indicator and the error-reporting channel of the host
//! are both realized as events on an unbounded channel; sending never blocks,
//! so the message handler stays synchronous.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::message::Message;

/// Fill color of the visual status indicator.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFill {
    Red,
    Green,
}

/// Shape of the visual status indicator.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusShape {
    Dot,
    Ring,
}

/// One visual status update: `{fill, shape, text}`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NodeStatus {
    pub fill: StatusFill,
    pub shape: StatusShape,
    pub text: String,
}

impl NodeStatus {
    pub fn ok(text: impl Into<String>) -> Self {
        NodeStatus {
            fill: StatusFill::Green,
            shape: StatusShape::Dot,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        NodeStatus {
            fill: StatusFill::Red,
            shape: StatusShape::Dot,
            text: text.into(),
        }
    }
}

/// Node events delivered out of band.
#[derive(Clone, Debug, Serialize)]
pub enum NodeEvent {
    /// The visual status indicator changed.
    StatusChanged {
        node_id: String,
        status: NodeStatus,
        timestamp: DateTime<Utc>,
    },

    /// An exception was caught during parse/compile/evaluate. Carries a copy
    /// of the offending message for host-level correlation.
    ErrorReported {
        node_id: String,
        error: String,
        msg: Message,
        timestamp: DateTime<Utc>,
    },
}

pub type EventSender = mpsc::UnboundedSender<NodeEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<NodeEvent>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_channel() {
        let (sender, mut receiver) = create_event_channel();

        sender
            .send(NodeEvent::StatusChanged {
                node_id: "node1".to_string(),
                status: NodeStatus::ok("success (msg)"),
                timestamp: Utc::now(),
            })
            .unwrap();

        let event = receiver.recv().await.unwrap();
        match event {
            NodeEvent::StatusChanged { node_id, status, .. } => {
                assert_eq!(node_id, "node1");
                assert_eq!(status.fill, StatusFill::Green);
                assert_eq!(status.shape, StatusShape::Dot);
            }
            _ => panic!("Unexpected event type"),
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        let status = NodeStatus::error("invalid JSON");
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"fill": "red", "shape": "dot", "text": "invalid JSON"})
        );
    }
}
