mod peer_registry;
mod relay;

pub use peer_registry::*;
pub use relay::*;
