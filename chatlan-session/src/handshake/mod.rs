mod driver;
mod handshake;
mod handshake_state;

pub use driver::*;
pub use handshake::*;
pub use handshake_state::*;
