//! Async half of ChatLan: the peer-connection engine seam, per-peer handshakes,
//! the peer registry with its star relay, and the `Session` actor tying them
//! together.

pub mod error;
pub mod handshake;
pub mod registry;
pub mod session;
pub mod suggest;
pub mod transport;

pub use error::{EngineError, HandshakeError, SessionError};
pub use session::{
    ChannelOutput, IgnoreReason, LocalIdentity, Session, SessionConfig, SessionEvent,
    SessionHandle, SessionOutput, SessionSnapshot, SignalOutcome,
};
pub use transport::{RtcEngine, TransportConfig};
