use std::time::Instant;
use serde_json::{json, Value};

/// An outbound game message. The payload is opaque to the session core.
#[derive(Debug, Clone, PartialEq)]
pub struct GameMessage {
    pub payload: Value,
}

impl GameMessage {
    pub fn new(payload: Value) -> Self {
        GameMessage { payload }
    }

    /// Player input message, e.g. `player_action("move", json!({"x": 0.5}))`
    pub fn player_action(action: &str, data: Value) -> Self {
        GameMessage {
            payload: json!({ "action": action, "data": data }),
        }
    }
}

impl From<Value> for GameMessage {
    fn from(payload: Value) -> Self {
        GameMessage::new(payload)
    }
}

/// A message waiting in the outbound queue.
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    /// Enqueue order
    pub seq: u64,
    pub message: GameMessage,
    pub enqueued_at: Instant,
}
