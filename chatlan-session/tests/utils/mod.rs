pub mod recording_link;
pub mod session_helpers;

pub use fake_engine::*;
pub use recording_link::*;
pub use rtc_helpers::*;
pub use session_helpers::*;
