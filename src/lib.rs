//! # jsonata-node — Expression-Evaluation Flow Node
//!
//! `jsonata-node` is a single flow-based automation node: it lifts a
//! JSON-encoded string off an inbound message, evaluates a query expression
//! against it, and writes the result plus status metadata back onto the
//! message before passing it on.
//!
//! - **Injected engine**: expression parsing and evaluation live behind the
//!   [`ExpressionEngine`] trait. A host wires in its JSONata engine; the
//!   crate bundles [`PointerEngine`] (RFC 6901 JSON Pointer) so it runs
//!   standalone, and [`FakeExpressionEngine`] for tests.
//! - **Message in, message out**: [`JsonataNode::handle`] is synchronous and
//!   infallible; the message is always forwarded, annotated with
//!   `jsonataResult`, `jsonataStatus`, and `jsonataByMsg`.
//! - **Out-of-band signals**: visual status updates and caught exceptions are
//!   delivered as [`NodeEvent`]s on an unbounded channel.
//! - **Query precedence**: a query carried on the message wins over the one
//!   configured on the node instance.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use jsonata_node::{create_event_channel, JsonataNode, Message, PointerEngine};
//!
//! let (events, _event_rx) = create_event_channel();
//! let node = JsonataNode::from_value(
//!     "jsonata1",
//!     &json!({"jsonatauser": "/device/name"}),
//!     Arc::new(PointerEngine::new()),
//!     events,
//! )
//! .unwrap();
//!
//! let msg = Message::from_object(json!({
//!     "payload": r#"{"device": {"name": "sensor-7"}}"#,
//! }))
//! .unwrap();
//!
//! let out = node.handle(msg);
//! assert_eq!(out.get("jsonataResult"), Some(&json!("sensor-7")));
//! assert_eq!(out.get("jsonataStatus"), Some(&json!("Success")));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod message;
pub mod node;

pub use crate::config::JsonataNodeConfig;
pub use crate::engine::{
    CompiledExpression, ExpressionEngine, ExpressionError, FakeExpressionEngine, PointerEngine,
};
pub use crate::error::{NodeError, NodeResult};
pub use crate::events::{
    create_event_channel, EventReceiver, EventSender, NodeEvent, NodeStatus, StatusFill,
    StatusShape,
};
pub use crate::message::Message;
pub use crate::node::{
    create_message_channel, EvaluationOutcome, JsonataNode, MessageReceiver, MessageSender,
    QuerySource, BY_MSG_FIELD, STATUS_FIELD,
};
