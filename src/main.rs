use std::sync::Arc;

use serde_json::json;

use jsonata_node::{
    create_event_channel, create_message_channel, JsonataNode, Message, NodeEvent, PointerEngine,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== jsonata-node demo ===\n");

    let (events, mut event_rx) = create_event_channel();
    let node = JsonataNode::from_value(
        "jsonata1",
        &json!({
            // fallback query when the message carries none
            "jsonatauser": "/device/firmware/version",
        }),
        Arc::new(PointerEngine::new()),
        events,
    )
    .expect("node config");

    let (inbox_tx, inbox_rx) = create_message_channel();
    let (outbox_tx, mut outbox_rx) = create_message_channel();

    let samples = vec![
        // query carried on the message wins
        json!({
            "payload": r#"{"device": {"name": "sensor-7", "firmware": {"version": "2.4.1"}}}"#,
            "jsonata": "/device/name",
        }),
        // falls back to the configured query
        json!({
            "payload": r#"{"device": {"firmware": {"version": "2.4.1"}}}"#,
        }),
        // path matches nothing: soft failure, message still flows
        json!({
            "payload": r#"{"device": {}}"#,
            "jsonata": "/device/serial",
        }),
        // not JSON at all: exception reported, message still flows
        json!({
            "payload": "not json",
            "jsonata": "/device/name",
        }),
    ];

    for sample in samples {
        let msg = Message::from_object(sample).expect("sample message");
        inbox_tx.send(msg).expect("inbox open");
    }
    drop(inbox_tx);

    node.run(inbox_rx, outbox_tx).await;
    drop(node); // closes the event channel so the drain below terminates

    println!("--- forwarded messages ---");
    while let Some(msg) = outbox_rx.recv().await {
        println!("{}", serde_json::to_string_pretty(&msg).expect("serialize"));
    }

    println!("\n--- node events ---");
    while let Some(event) = event_rx.recv().await {
        match event {
            NodeEvent::StatusChanged { status, .. } => {
                println!("status: [{:?}/{:?}] {}", status.fill, status.shape, status.text);
            }
            NodeEvent::ErrorReported { error, .. } => {
                println!("error: {}", error);
            }
        }
    }
}
