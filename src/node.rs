//! The expression-evaluation node.
//!
//! Per message: read the configured input field (a JSON string), resolve the
//! query (message-supplied wins over configured), delegate parse + evaluate
//! to the injected engine, reflect the outcome into the result/status fields,
//! and return the message. The node holds no cross-message state and the
//! message is always forwarded, whatever branch was taken.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::config::JsonataNodeConfig;
use crate::engine::ExpressionEngine;
use crate::error::{NodeError, NodeResult};
use crate::events::{EventSender, NodeEvent, NodeStatus};
use crate::message::Message;

/// Output field receiving the human-readable status string.
pub const STATUS_FIELD: &str = "jsonataStatus";
/// Output field recording query provenance (`true` = message-supplied).
pub const BY_MSG_FIELD: &str = "jsonataByMsg";

/// Where the resolved query came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySource {
    /// Carried on the message.
    Msg,
    /// Configured on the node instance.
    Opts,
}

impl QuerySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuerySource::Msg => "msg",
            QuerySource::Opts => "opts",
        }
    }

    pub fn is_msg(&self) -> bool {
        matches!(self, QuerySource::Msg)
    }
}

impl fmt::Display for QuerySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one invocation, computed fresh per message.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// The query produced a defined, non-null value.
    Success { value: Value, source: QuerySource },
    /// The query evaluated cleanly but produced nothing.
    NoResult { source: QuerySource },
    /// No query resolvable from the message or the configuration.
    QueryMissing,
    /// The input field held something other than a string.
    InputInvalidType { found: Value },
    /// The input field was absent or empty.
    InputMissing,
}

pub type MessageSender = mpsc::UnboundedSender<Message>;
pub type MessageReceiver = mpsc::UnboundedReceiver<Message>;

pub fn create_message_channel() -> (MessageSender, MessageReceiver) {
    mpsc::unbounded_channel()
}

/// The node. Construct once, then [`handle`](JsonataNode::handle) each
/// inbound message.
pub struct JsonataNode {
    node_id: String,
    config: JsonataNodeConfig,
    engine: Arc<dyn ExpressionEngine>,
    events: EventSender,
}

impl JsonataNode {
    pub fn new(
        node_id: impl Into<String>,
        config: JsonataNodeConfig,
        engine: Arc<dyn ExpressionEngine>,
        events: EventSender,
    ) -> Self {
        JsonataNode {
            node_id: node_id.into(),
            config: config.normalized(),
            engine,
            events,
        }
    }

    /// Construct from a raw config block, as deserialized from a flow
    /// definition.
    pub fn from_value(
        node_id: impl Into<String>,
        config: &Value,
        engine: Arc<dyn ExpressionEngine>,
        events: EventSender,
    ) -> Result<Self, NodeError> {
        Ok(Self::new(
            node_id,
            JsonataNodeConfig::from_value(config)?,
            engine,
            events,
        ))
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn config(&self) -> &JsonataNodeConfig {
        &self.config
    }

    /// Handle one inbound message: annotate it with the evaluation result
    /// and status, then return it. Never fails; exceptions raised during
    /// parse/compile/evaluate are reported through the event channel and the
    /// message is returned without a status.
    pub fn handle(&self, mut msg: Message) -> Message {
        msg.remove(&self.config.result_field);
        msg.remove(STATUS_FIELD);

        match self.evaluate(&msg) {
            Ok(outcome) => self.apply(&mut msg, outcome),
            Err(error) => {
                tracing::warn!(node_id = %self.node_id, %error, "expression evaluation raised");
                self.emit(NodeEvent::ErrorReported {
                    node_id: self.node_id.clone(),
                    error: error.to_string(),
                    msg: msg.clone(),
                    timestamp: Utc::now(),
                });
            }
        }
        msg
    }

    /// Pump messages inbox → [`handle`](JsonataNode::handle) → outbox until
    /// either side closes.
    pub async fn run(&self, mut inbox: MessageReceiver, outbox: MessageSender) {
        while let Some(msg) = inbox.recv().await {
            if outbox.send(self.handle(msg)).is_err() {
                tracing::debug!(node_id = %self.node_id, "downstream receiver dropped, stopping");
                break;
            }
        }
    }

    /// Message-supplied query wins over the configured one.
    fn resolve_query(&self, msg: &Message) -> (Option<String>, QuerySource) {
        match msg.get(&self.config.query_field).and_then(Value::as_str) {
            Some(query) if !query.is_empty() => (Some(query.to_string()), QuerySource::Msg),
            _ => match &self.config.user_query {
                Some(user_query) => (Some(user_query.clone()), QuerySource::Opts),
                None => (None, QuerySource::Msg),
            },
        }
    }

    /// Compute the outcome for a message without mutating it.
    /// [`handle`](JsonataNode::handle) is this plus reflection of the outcome
    /// into the message and the event channel.
    pub fn evaluate(&self, msg: &Message) -> NodeResult<EvaluationOutcome> {
        let (query, source) = self.resolve_query(msg);

        let json_source = match msg.get(&self.config.property) {
            None => return Ok(EvaluationOutcome::InputMissing),
            Some(Value::String(s)) if s.is_empty() => return Ok(EvaluationOutcome::InputMissing),
            Some(Value::String(s)) => s,
            Some(other) => {
                return Ok(EvaluationOutcome::InputInvalidType {
                    found: other.clone(),
                })
            }
        };

        let Some(query) = query else {
            return Ok(EvaluationOutcome::QueryMissing);
        };

        let parsed: Value = serde_json::from_str(json_source)?;
        let compiled = self.engine.prepare(&query).map_err(NodeError::Compile)?;
        let result = compiled.evaluate(&parsed).map_err(NodeError::Evaluate)?;

        Ok(match result {
            Some(value) if !value.is_null() => EvaluationOutcome::Success { value, source },
            _ => EvaluationOutcome::NoResult { source },
        })
    }

    fn apply(&self, msg: &mut Message, outcome: EvaluationOutcome) {
        let (status_text, indicator) = match outcome {
            EvaluationOutcome::Success { value, source } => {
                msg.set(&self.config.result_field, value);
                msg.set(BY_MSG_FIELD, Value::Bool(source.is_msg()));
                (
                    "Success".to_string(),
                    NodeStatus::ok(format!("success ({})", source)),
                )
            }
            EvaluationOutcome::NoResult { source } => {
                let text = format!("no JSONata result ({})", source);
                (text.clone(), NodeStatus::error(text))
            }
            EvaluationOutcome::QueryMissing => (
                "No JSONata provided".to_string(),
                NodeStatus::error("JSONata missing"),
            ),
            EvaluationOutcome::InputInvalidType { found } => (
                format!("Invalid JSON string ({})", found),
                NodeStatus::error("invalid JSON"),
            ),
            EvaluationOutcome::InputMissing => (
                format!("No JSON string provided ({})", self.config.property),
                NodeStatus::error("JSON missing"),
            ),
        };

        msg.set(STATUS_FIELD, Value::String(status_text));
        self.emit(NodeEvent::StatusChanged {
            node_id: self.node_id.clone(),
            status: indicator,
            timestamp: Utc::now(),
        });
    }

    fn emit(&self, event: NodeEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!(node_id = %self.node_id, "event receiver dropped");
        }
    }
}
