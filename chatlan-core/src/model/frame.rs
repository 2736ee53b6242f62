use crate::error::FrameError;
use crate::model::ChatMessage;
use serde::{Deserialize, Serialize};

const CHAT_TYPE: &str = "chat";

/// One text frame on a peer data channel.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Frame {
    Chat(ChatMessage),
    /// A well-formed frame whose `type` this build does not know. Ignored.
    Unknown(String),
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Serialize)]
struct OutgoingFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: &'a ChatMessage,
}

impl Frame {
    pub fn encode_chat(message: &ChatMessage) -> Result<String, FrameError> {
        let frame = OutgoingFrame {
            kind: CHAT_TYPE,
            payload: message,
        };
        Ok(serde_json::to_string(&frame)?)
    }

    pub fn decode(text: &str) -> Result<Self, FrameError> {
        let raw: RawFrame = serde_json::from_str(text)?;
        if raw.kind != CHAT_TYPE {
            return Ok(Frame::Unknown(raw.kind));
        }
        Ok(Frame::Chat(serde_json::from_value(raw.payload)?))
    }
}
