pub use chatlan_core::{ChatMessage, PeerId, Role, SignalEnvelope, SignalKind};

pub mod model {
    pub use chatlan_core::model::*;
}

pub mod codec {
    pub use chatlan_core::codec::*;
}

pub mod store {
    pub use chatlan_core::store::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use chatlan_session::*;
}
