mod local_identity;
mod session;
mod session_command;
mod session_config;
mod session_handle;
mod session_output;

pub use local_identity::*;
pub use session::*;
pub use session_command::*;
pub use session_config::*;
pub use session_handle::*;
pub use session_output::*;
