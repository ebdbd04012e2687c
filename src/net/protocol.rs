//! Wire messages
//!
//! One JSON object per message, tagged by `"type"`:
//!
//! ```json
//! {"type":"updatePoint","id":1,"systemId":2,"position":[0,0],"velocity":[0,0],"acceleration":[0,0]}
//! {"type":"newPlayer","id":1,"skin":3}
//! ```
//!
//! Unknown types decode to [`Message::Unknown`] so newer peers can add
//! message kinds without breaking older ones.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// Full kinematic state of one entity, sent when its owner changes acceleration
    #[serde(rename_all = "camelCase")]
    UpdatePoint {
        id: u32,
        /// Process that produced the update
        system_id: u32,
        position: [f32; 2],
        velocity: [f32; 2],
        acceleration: [f32; 2],
    },
    /// Announces a player and its skin
    NewPlayer { id: u32, skin: u32 },
    #[serde(other)]
    Unknown,
}

impl Message {
    pub fn update_point(id: u32, system_id: u32, position: Vec2, velocity: Vec2, acceleration: Vec2) -> Self {
        Message::UpdatePoint {
            id,
            system_id,
            position: position.to_array(),
            velocity: velocity.to_array(),
            acceleration: acceleration.to_array(),
        }
    }

    pub fn new_player(id: u32, skin: u32) -> Self {
        Message::NewPlayer { id, skin }
    }

    /// Parse one message
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_update_point(&self) -> bool {
        matches!(self, Message::UpdatePoint { .. })
    }
}
