use crate::model::PeerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which half of the offer/answer exchange an envelope carries.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SignalKind {
    Offer,
    Answer,
}

impl SignalKind {
    pub fn tag(self) -> u8 {
        match self {
            SignalKind::Offer => 0,
            SignalKind::Answer => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(SignalKind::Offer),
            1 => Some(SignalKind::Answer),
            _ => None,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Offer => f.write_str("offer"),
            SignalKind::Answer => f.write_str("answer"),
        }
    }
}

/// What one side hands to the other out of band.
///
/// `description` is already compressed (see [`crate::codec::sdp`]); the
/// envelope codec never touches its contents.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SignalEnvelope {
    pub kind: SignalKind,
    pub description: String,
    pub display_name: String,
    /// Set by the Host on an offer, echoed back by the Guest on its answer.
    pub link_id: Option<PeerId>,
}

impl SignalEnvelope {
    pub fn offer(description: String, display_name: String, link_id: PeerId) -> Self {
        Self {
            kind: SignalKind::Offer,
            description,
            display_name,
            link_id: Some(link_id),
        }
    }

    pub fn answer(description: String, display_name: String, link_id: Option<PeerId>) -> Self {
        Self {
            kind: SignalKind::Answer,
            description,
            display_name,
            link_id,
        }
    }
}
