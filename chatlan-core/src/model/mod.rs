mod envelope;
mod frame;
mod message;
mod peer;
mod profile;
mod role;
mod session_code;

pub use envelope::{SignalEnvelope, SignalKind};
pub use frame::Frame;
pub use message::{ChatMessage, MessageLog};
pub use peer::{PeerId, PeerStatus};
pub use profile::{Language, UserProfile};
pub use role::Role;
pub use session_code::SessionCode;
