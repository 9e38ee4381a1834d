// src/services/chat_hub.rs
// DOCUMENTATION: Single-room chat relay shared by all websocket sessions
// PURPOSE: Fan out every valid chat message to every connected client

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Capacity of the broadcast buffer; slower receivers skip what they missed
pub const CHAT_CHANNEL_CAPACITY: usize = 256;

/// Frame exchanged with clients in both directions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub message: String,
}

/// Parse an inbound frame; None when it is not `{"message": "<text>"}`
pub fn parse_frame(text: &str) -> Option<ChatMessage> {
    serde_json::from_str::<ChatMessage>(text).ok()
}

/// Shared room
#[derive(Clone)]
pub struct ChatHub {
    tx: broadcast::Sender<String>,
}

impl ChatHub {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHAT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Serialize and broadcast to every subscriber; returns how many received it
    pub fn publish(&self, message: &ChatMessage) -> usize {
        match serde_json::to_string(message) {
            Ok(json) => self.tx.send(json).unwrap_or(0),
            Err(e) => {
                log::error!("Failed to serialize chat message: {}", e);
                0
            }
        }
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}
